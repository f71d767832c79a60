//! Triangle connectivity derived from a [`PolyMesh`].
//!
//! The structure is an arena: triangles are stored as vertex index triples and
//! each vertex keeps index lists of its incident faces and adjacent vertices.
//! There are no back-pointers, so the whole structure is plain owned data.
//!
//! Building connectivity is the point where the input mesh is validated.
//! Every cell must be a triangle with three distinct, in-range vertex ids.

use nalgebra::Point3;

use super::index::{FaceId, MeshIndex, VertexId};
use super::poly::PolyMesh;
use crate::error::{MeshError, Result};

/// Vertex/face adjacency of a triangle mesh.
#[derive(Debug, Clone)]
pub struct TriangleConnectivity<I: MeshIndex = u32> {
    positions: Vec<Point3<f64>>,
    faces: Vec<[VertexId<I>; 3]>,
    vertex_faces: Vec<Vec<FaceId<I>>>,
    vertex_neighbors: Vec<Vec<VertexId<I>>>,
}

impl<I: MeshIndex> TriangleConnectivity<I> {
    /// Build connectivity from a polygon mesh.
    ///
    /// # Errors
    ///
    /// - [`MeshError::NonTriangularFace`] if a cell does not have three vertices
    /// - [`MeshError::InvalidVertexIndex`] if a cell references a missing point
    /// - [`MeshError::DegenerateFace`] if a cell repeats a vertex
    /// - [`MeshError::InvalidParameter`] if the mesh has more vertices or faces
    ///   than the index type `I` can address
    ///
    /// # Example
    ///
    /// ```
    /// use fastmarch::mesh::{PolyMesh, TriangleConnectivity, VertexId};
    /// use nalgebra::Point3;
    ///
    /// let mesh = PolyMesh::from_triangles(
    ///     vec![
    ///         Point3::new(0.0, 0.0, 0.0),
    ///         Point3::new(1.0, 0.0, 0.0),
    ///         Point3::new(0.5, 1.0, 0.0),
    ///     ],
    ///     &[[0, 1, 2]],
    /// );
    /// let conn: TriangleConnectivity = TriangleConnectivity::build(&mesh).unwrap();
    /// assert_eq!(conn.vertex_neighbors(VertexId::new(0)).len(), 2);
    /// ```
    pub fn build(mesh: &PolyMesh) -> Result<Self> {
        let n = mesh.num_points();

        let limit = I::MAX.to_usize();
        if n > limit {
            return Err(MeshError::invalid_param(
                "vertex_count",
                n,
                "exceeds the range of the index type",
            ));
        }
        if mesh.num_polys() > limit {
            return Err(MeshError::invalid_param(
                "face_count",
                mesh.num_polys(),
                "exceeds the range of the index type",
            ));
        }

        let mut faces = Vec::with_capacity(mesh.num_polys());
        for (fi, cell) in mesh.polys().iter().enumerate() {
            if cell.len() != 3 {
                return Err(MeshError::NonTriangularFace {
                    face: fi,
                    vertices: cell.len(),
                });
            }
            for &vi in cell {
                if vi >= n {
                    return Err(MeshError::InvalidVertexIndex { face: fi, vertex: vi });
                }
            }
            if cell[0] == cell[1] || cell[1] == cell[2] || cell[0] == cell[2] {
                return Err(MeshError::DegenerateFace { face: fi });
            }
            faces.push([
                VertexId::new(cell[0]),
                VertexId::new(cell[1]),
                VertexId::new(cell[2]),
            ]);
        }

        let mut vertex_faces: Vec<Vec<FaceId<I>>> = vec![Vec::new(); n];
        let mut vertex_neighbors: Vec<Vec<VertexId<I>>> = vec![Vec::new(); n];

        for (fi, tri) in faces.iter().enumerate() {
            let fid = FaceId::new(fi);
            for k in 0..3 {
                let v = tri[k];
                vertex_faces[v.index()].push(fid);
                vertex_neighbors[v.index()].push(tri[(k + 1) % 3]);
                vertex_neighbors[v.index()].push(tri[(k + 2) % 3]);
            }
        }

        // Sorted neighbor lists keep traversal order independent of face order.
        for neighbors in &mut vertex_neighbors {
            neighbors.sort_unstable();
            neighbors.dedup();
        }

        Ok(Self {
            positions: mesh.points().to_vec(),
            faces,
            vertex_faces,
            vertex_neighbors,
        })
    }

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    /// Get the number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Iterate over all vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        (0..self.positions.len()).map(VertexId::new)
    }

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        (0..self.faces.len()).map(FaceId::new)
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId<I>) -> &Point3<f64> {
        &self.positions[v.index()]
    }

    /// Get the three vertices of a face.
    #[inline]
    pub fn face_triangle(&self, f: FaceId<I>) -> [VertexId<I>; 3] {
        self.faces[f.index()]
    }

    /// Get the positions of the three vertices of a face.
    pub fn face_positions(&self, f: FaceId<I>) -> [Point3<f64>; 3] {
        let [v0, v1, v2] = self.face_triangle(f);
        [*self.position(v0), *self.position(v1), *self.position(v2)]
    }

    /// Faces incident to a vertex.
    #[inline]
    pub fn vertex_faces(&self, v: VertexId<I>) -> &[FaceId<I>] {
        &self.vertex_faces[v.index()]
    }

    /// Vertices sharing an edge with a vertex, in ascending id order.
    #[inline]
    pub fn vertex_neighbors(&self, v: VertexId<I>) -> &[VertexId<I>] {
        &self.vertex_neighbors[v.index()]
    }

    /// The two vertices of `f` other than `v`, in face winding order.
    ///
    /// Returns `None` if `v` is not a corner of `f`.
    pub fn opposite_vertices(&self, f: FaceId<I>, v: VertexId<I>) -> Option<(VertexId<I>, VertexId<I>)> {
        let tri = self.face_triangle(f);
        let k = tri.iter().position(|&c| c == v)?;
        Some((tri[(k + 1) % 3], tri[(k + 2) % 3]))
    }

    /// Euclidean distance between two vertices.
    #[inline]
    pub fn edge_length(&self, a: VertexId<I>, b: VertexId<I>) -> f64 {
        (self.position(b) - self.position(a)).norm()
    }

    /// Area of a face.
    pub fn face_area(&self, f: FaceId<I>) -> f64 {
        let [p0, p1, p2] = self.face_positions(f);
        0.5 * (p1 - p0).cross(&(p2 - p0)).norm()
    }

    /// Mean length over all unique edges, or 0 for a mesh without edges.
    pub fn average_edge_length(&self) -> f64 {
        let mut total = 0.0;
        let mut count = 0usize;
        for v in self.vertex_ids() {
            for &w in self.vertex_neighbors(v) {
                if v < w {
                    total += self.edge_length(v, w);
                    count += 1;
                }
            }
        }
        if count == 0 {
            0.0
        } else {
            total / count as f64
        }
    }

    /// Check whether a vertex lies on an open boundary.
    ///
    /// A vertex is on the boundary when one of its edges is used by a single
    /// face. Isolated vertices count as boundary.
    pub fn is_boundary_vertex(&self, v: VertexId<I>) -> bool {
        let faces = self.vertex_faces(v);
        if faces.is_empty() {
            return true;
        }
        self.vertex_neighbors(v).iter().any(|&w| {
            faces
                .iter()
                .filter(|&&f| self.face_triangle(f).contains(&w))
                .count()
                == 1
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_triangles() -> PolyMesh {
        // Two triangles sharing edge 0-1
        PolyMesh::from_triangles(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.5, 1.0, 0.0),
                Point3::new(0.5, -1.0, 0.0),
            ],
            &[[0, 1, 2], [1, 0, 3]],
        )
    }

    #[test]
    fn test_two_triangles() {
        let conn: TriangleConnectivity = TriangleConnectivity::build(&two_triangles()).unwrap();

        assert_eq!(conn.num_vertices(), 4);
        assert_eq!(conn.num_faces(), 2);

        let n0: Vec<usize> = conn
            .vertex_neighbors(VertexId::new(0))
            .iter()
            .map(|v| v.index())
            .collect();
        assert_eq!(n0, vec![1, 2, 3]);
        assert_eq!(conn.vertex_faces(VertexId::new(0)).len(), 2);
        assert_eq!(conn.vertex_faces(VertexId::new(2)).len(), 1);
    }

    #[test]
    fn test_index_type_overflow() {
        // u16 reserves its top value, so 65535 points do not fit.
        let points = (0..u16::MAX as usize)
            .map(|i| Point3::new(i as f64, 0.0, 0.0))
            .collect();
        let mesh = PolyMesh::from_polygons(points, vec![vec![0, 1, 2]]);

        let err = TriangleConnectivity::<u16>::build(&mesh).unwrap_err();
        assert!(matches!(err, MeshError::InvalidParameter { name: "vertex_count", .. }));

        let conn: TriangleConnectivity<u32> = TriangleConnectivity::build(&mesh).unwrap();
        assert_eq!(conn.num_vertices(), 65535);
    }

    #[test]
    fn test_opposite_vertices() {
        let conn: TriangleConnectivity = TriangleConnectivity::build(&two_triangles()).unwrap();
        let (a, b) = conn
            .opposite_vertices(FaceId::new(0), VertexId::new(1))
            .unwrap();
        assert_eq!((a.index(), b.index()), (2, 0));
        assert!(conn
            .opposite_vertices(FaceId::new(0), VertexId::new(3))
            .is_none());
    }

    #[test]
    fn test_non_triangular_face() {
        let mesh = PolyMesh::from_polygons(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![vec![0, 1, 2, 3]],
        );
        let err = TriangleConnectivity::<u32>::build(&mesh).unwrap_err();
        assert!(matches!(err, MeshError::NonTriangularFace { face: 0, vertices: 4 }));
        assert!(err.is_invalid_mesh());
    }

    #[test]
    fn test_invalid_vertex_index() {
        let mesh = PolyMesh::from_triangles(vec![Point3::new(0.0, 0.0, 0.0)], &[[0, 1, 2]]);
        let err = TriangleConnectivity::<u32>::build(&mesh).unwrap_err();
        assert!(matches!(err, MeshError::InvalidVertexIndex { face: 0, vertex: 1 }));
    }

    #[test]
    fn test_degenerate_face() {
        let mesh = PolyMesh::from_triangles(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.5, 1.0, 0.0),
            ],
            &[[0, 0, 2]],
        );
        let err = TriangleConnectivity::<u32>::build(&mesh).unwrap_err();
        assert!(matches!(err, MeshError::DegenerateFace { face: 0 }));
    }

    #[test]
    fn test_geometry() {
        let conn: TriangleConnectivity = TriangleConnectivity::build(&two_triangles()).unwrap();
        assert!((conn.face_area(FaceId::new(0)) - 0.5).abs() < 1e-12);
        assert!((conn.edge_length(VertexId::new(0), VertexId::new(1)) - 1.0).abs() < 1e-12);
        assert!(conn.average_edge_length() > 1.0);
    }

    #[test]
    fn test_boundary_vertices() {
        let conn: TriangleConnectivity = TriangleConnectivity::build(&two_triangles()).unwrap();
        for v in conn.vertex_ids() {
            assert!(conn.is_boundary_vertex(v));
        }
    }

    #[test]
    fn test_small_index_type() {
        let conn: TriangleConnectivity<u16> = TriangleConnectivity::build(&two_triangles()).unwrap();
        assert_eq!(conn.num_faces(), 2);
    }
}
