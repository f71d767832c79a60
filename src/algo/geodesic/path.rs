//! Shortest surface paths between two vertices.

use crate::error::{MeshError, Result};
use crate::mesh::{MeshIndex, PolyMesh, TriangleConnectivity, VertexId};

use super::dijkstra::dijkstra;
use super::fast_marching::{FastMarching, FastMarchingOptions, MarchOutcome};
use super::front::VertexState;
use super::policy::StopReason;

/// Method used to find a geodesic path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeodesicMethod {
    /// Shortest path along mesh edges.
    Dijkstra,
    /// Fast-marching distance field followed by steepest descent over vertices.
    #[default]
    FastMarching,
}

/// A vertex path from a begin vertex to an end vertex.
#[derive(Debug, Clone)]
pub struct GeodesicPath<I: MeshIndex = u32> {
    vertices: Vec<VertexId<I>>,
    length: f64,
}

impl<I: MeshIndex> GeodesicPath<I> {
    fn new(vertices: Vec<VertexId<I>>, conn: &TriangleConnectivity<I>) -> Self {
        let length = vertices
            .windows(2)
            .map(|w| conn.edge_length(w[0], w[1]))
            .sum();
        Self { vertices, length }
    }

    /// Path vertices, begin first.
    #[inline]
    pub fn vertices(&self) -> &[VertexId<I>] {
        &self.vertices
    }

    /// Length of the polyline through the path vertices.
    #[inline]
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Number of vertices on the path.
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Find a path along the surface from `begin` to `end`.
///
/// Both methods propagate from `end` and stop as soon as `begin` is reached,
/// so the cost is proportional to the region between the two vertices.
///
/// # Errors
///
/// - invalid mesh errors from building connectivity
/// - [`MeshError::SeedOutOfRange`] if either vertex is out of range
/// - [`MeshError::Unreachable`] if no path connects the two vertices
///
/// # Example
///
/// ```
/// use fastmarch::algo::geodesic::{geodesic_path, GeodesicMethod};
/// use fastmarch::mesh::{PolyMesh, VertexId};
/// use nalgebra::Point3;
///
/// let mesh = PolyMesh::from_triangles(
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(1.0, 1.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///     ],
///     &[[0, 1, 2], [0, 2, 3]],
/// );
///
/// let path = geodesic_path::<u32>(&mesh, VertexId::new(0), VertexId::new(2), GeodesicMethod::Dijkstra)
///     .unwrap();
/// assert_eq!(path.vertices(), &[VertexId::new(0), VertexId::new(2)]);
/// ```
pub fn geodesic_path<I: MeshIndex>(
    mesh: &PolyMesh,
    begin: VertexId<I>,
    end: VertexId<I>,
    method: GeodesicMethod,
) -> Result<GeodesicPath<I>> {
    let n = mesh.num_points();
    for v in [begin, end] {
        if v.index() >= n {
            return Err(MeshError::SeedOutOfRange {
                seed: v.index(),
                vertex_count: n,
            });
        }
    }

    match method {
        GeodesicMethod::Dijkstra => dijkstra_path(mesh, begin, end),
        GeodesicMethod::FastMarching => fast_marching_path(mesh, begin, end),
    }
}

fn dijkstra_path<I: MeshIndex>(
    mesh: &PolyMesh,
    begin: VertexId<I>,
    end: VertexId<I>,
) -> Result<GeodesicPath<I>> {
    let conn = TriangleConnectivity::build(mesh)?;
    let result = dijkstra(&conn, &[end], Some(begin));

    let vertices = result.path_from(begin).ok_or(MeshError::Unreachable {
        from: begin.index(),
        to: end.index(),
    })?;

    Ok(GeodesicPath::new(vertices, &conn))
}

fn fast_marching_path<I: MeshIndex>(
    mesh: &PolyMesh,
    begin: VertexId<I>,
    end: VertexId<I>,
) -> Result<GeodesicPath<I>> {
    let unreachable = MeshError::Unreachable {
        from: begin.index(),
        to: end.index(),
    };

    let mut engine: FastMarching<I> = FastMarching::new();
    engine.configure(
        mesh,
        &[end],
        FastMarchingOptions::default().with_destinations([begin.index()]),
    )?;
    if begin == end {
        let conn = engine.connectivity().ok_or(MeshError::NotConfigured)?;
        return Ok(GeodesicPath::new(vec![begin], conn));
    }

    let outcome = engine.compute()?;
    let conn = engine.connectivity().ok_or(MeshError::NotConfigured)?;

    match outcome {
        MarchOutcome::Stopped(StopReason::DestinationReached { .. }) => {}
        _ => return Err(unreachable),
    }

    let mut vertices = vec![begin];
    let mut current = begin;
    while current != end {
        let here = engine.tentative_distance(current);
        let next = conn
            .vertex_neighbors(current)
            .iter()
            .copied()
            .filter(|&w| engine.state(w) == VertexState::Known)
            .map(|w| (engine.tentative_distance(w), w))
            .filter(|&(d, _)| d < here)
            .min_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

        match next {
            Some((_, w)) => {
                vertices.push(w);
                current = w;
            }
            None => return Err(unreachable),
        }
    }

    Ok(GeodesicPath::new(vertices, conn))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn create_grid_mesh(n: usize) -> PolyMesh {
        let mut vertices = Vec::new();
        let mut faces = Vec::new();

        for j in 0..=n {
            for i in 0..=n {
                vertices.push(Point3::new(i as f64, j as f64, 0.0));
            }
        }

        for j in 0..n {
            for i in 0..n {
                let v00 = j * (n + 1) + i;
                let v10 = j * (n + 1) + i + 1;
                let v01 = (j + 1) * (n + 1) + i;
                let v11 = (j + 1) * (n + 1) + i + 1;

                faces.push([v00, v10, v11]);
                faces.push([v00, v11, v01]);
            }
        }

        PolyMesh::from_triangles(vertices, &faces)
    }

    fn check_connected(mesh: &PolyMesh, path: &GeodesicPath) {
        let conn: TriangleConnectivity = TriangleConnectivity::build(mesh).unwrap();
        for w in path.vertices().windows(2) {
            assert!(conn.vertex_neighbors(w[0]).contains(&w[1]));
        }
    }

    #[test]
    fn test_dijkstra_path_follows_diagonal() {
        let mesh = create_grid_mesh(3);
        let path = geodesic_path::<u32>(&mesh, VertexId::new(0), VertexId::new(15), GeodesicMethod::Dijkstra)
            .unwrap();

        let ids: Vec<usize> = path.vertices().iter().map(|v| v.index()).collect();
        assert_eq!(ids, vec![0, 5, 10, 15]);
        assert!((path.length() - 3.0 * 2.0_f64.sqrt()).abs() < 1e-10);
    }

    #[test]
    fn test_fast_marching_path_endpoints() {
        let mesh = create_grid_mesh(4);
        let path = geodesic_path::<u32>(
            &mesh,
            VertexId::new(2),
            VertexId::new(22),
            GeodesicMethod::FastMarching,
        )
        .unwrap();

        assert_eq!(path.vertices().first(), Some(&VertexId::new(2)));
        assert_eq!(path.vertices().last(), Some(&VertexId::new(22)));
        check_connected(&mesh, &path);
        // Straight up the column x = 2.
        assert!((path.length() - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_fast_marching_path_distances_decrease() {
        let mesh = create_grid_mesh(5);
        let begin = VertexId::new(3);
        let end = VertexId::new(32);
        let path = geodesic_path::<u32>(&mesh, begin, end, GeodesicMethod::FastMarching).unwrap();

        let mut engine: FastMarching = FastMarching::new();
        engine
            .configure(&mesh, &[end], FastMarchingOptions::default())
            .unwrap();
        engine.compute().unwrap();

        for w in path.vertices().windows(2) {
            assert!(engine.tentative_distance(w[1]) < engine.tentative_distance(w[0]));
        }
        check_connected(&mesh, &path);
    }

    #[test]
    fn test_same_vertex() {
        let mesh = create_grid_mesh(2);
        for method in [GeodesicMethod::Dijkstra, GeodesicMethod::FastMarching] {
            let path = geodesic_path::<u32>(&mesh, VertexId::new(4), VertexId::new(4), method).unwrap();
            assert_eq!(path.vertices(), &[VertexId::new(4)]);
            assert_eq!(path.length(), 0.0);
        }
    }

    #[test]
    fn test_unreachable() {
        let mesh = PolyMesh::from_triangles(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(5.0, 0.0, 0.0),
                Point3::new(6.0, 0.0, 0.0),
                Point3::new(5.0, 1.0, 0.0),
            ],
            &[[0, 1, 2], [3, 4, 5]],
        );

        for method in [GeodesicMethod::Dijkstra, GeodesicMethod::FastMarching] {
            let err = geodesic_path::<u32>(&mesh, VertexId::new(0), VertexId::new(4), method)
                .unwrap_err();
            assert!(matches!(err, MeshError::Unreachable { from: 0, to: 4 }));
        }
    }

    #[test]
    fn test_out_of_range() {
        let mesh = create_grid_mesh(1);
        let err = geodesic_path::<u32>(&mesh, VertexId::new(0), VertexId::new(9), GeodesicMethod::Dijkstra)
            .unwrap_err();
        assert!(err.is_invalid_seed());
    }
}
