//! Polygonal surface input.
//!
//! [`PolyMesh`] is the mesh callers hand to the geodesic engine: a list of
//! points plus a list of cells of arbitrary arity, as found in mesh files.
//! Nothing is validated here; triangle-only requirements are enforced when
//! connectivity is built from it.
//!
//! Every mesh carries a unique id and a modification stamp taken from a
//! process-wide monotonic clock. Consumers that cache data derived from a
//! mesh compare these against the stamp of their own last build.

use std::sync::atomic::{AtomicU64, Ordering};

use nalgebra::Point3;

use super::index::{MeshIndex, VertexId};

static CLOCK: AtomicU64 = AtomicU64::new(1);

/// Draw the next value of the global modification clock.
///
/// Values are strictly increasing across all threads.
pub fn next_stamp() -> u64 {
    CLOCK.fetch_add(1, Ordering::Relaxed)
}

/// A polygonal surface: points and polygon cells.
///
/// Cloning copies the geometry under a new id, so a clone and its original
/// never share cached connectivity.
#[derive(Debug)]
pub struct PolyMesh {
    points: Vec<Point3<f64>>,
    polys: Vec<Vec<usize>>,
    id: u64,
    mtime: u64,
}

impl Clone for PolyMesh {
    fn clone(&self) -> Self {
        Self::from_polygons(self.points.clone(), self.polys.clone())
    }
}

impl Default for PolyMesh {
    fn default() -> Self {
        Self::new()
    }
}

impl PolyMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        let id = next_stamp();
        Self {
            points: Vec::new(),
            polys: Vec::new(),
            id,
            mtime: id,
        }
    }

    /// Create a mesh from points and polygon cells.
    pub fn from_polygons(points: Vec<Point3<f64>>, polys: Vec<Vec<usize>>) -> Self {
        let mut mesh = Self::new();
        mesh.points = points;
        mesh.polys = polys;
        mesh.modified();
        mesh
    }

    /// Create a mesh from points and triangles.
    ///
    /// ```
    /// use fastmarch::mesh::PolyMesh;
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
    /// assert_eq!(mesh.num_points(), 3);
    /// assert_eq!(mesh.num_polys(), 1);
    /// ```
    pub fn from_triangles(points: Vec<Point3<f64>>, triangles: &[[usize; 3]]) -> Self {
        let polys = triangles.iter().map(|t| t.to_vec()).collect();
        Self::from_polygons(points, polys)
    }

    /// Unique identity of this mesh instance.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Stamp of the last modification.
    #[inline]
    pub fn mtime(&self) -> u64 {
        self.mtime
    }

    /// Mark the mesh as modified.
    pub fn modified(&mut self) {
        self.mtime = next_stamp();
    }

    /// Number of points.
    #[inline]
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// Number of polygon cells.
    #[inline]
    pub fn num_polys(&self) -> usize {
        self.polys.len()
    }

    /// All point positions.
    #[inline]
    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    /// All polygon cells.
    #[inline]
    pub fn polys(&self) -> &[Vec<usize>] {
        &self.polys
    }

    /// Position of a vertex.
    #[inline]
    pub fn position<I: MeshIndex>(&self, v: VertexId<I>) -> &Point3<f64> {
        &self.points[v.index()]
    }

    /// Append a point and return its id.
    pub fn add_point(&mut self, p: Point3<f64>) -> VertexId {
        let id = VertexId::new(self.points.len());
        self.points.push(p);
        self.modified();
        id
    }

    /// Append a polygon cell.
    pub fn add_polygon(&mut self, cell: Vec<usize>) {
        self.polys.push(cell);
        self.modified();
    }

    /// Move a vertex.
    pub fn set_position<I: MeshIndex>(&mut self, v: VertexId<I>, p: Point3<f64>) {
        self.points[v.index()] = p;
        self.modified();
    }

    /// Compute the axis-aligned bounding box.
    ///
    /// Returns `None` for a mesh without points.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.points.first()?;
        let mut min = *first;
        let mut max = *first;
        for p in &self.points[1..] {
            min = min.inf(p);
            max = max.sup(p);
        }
        Some((min, max))
    }

    /// Find the vertex nearest to a query position.
    ///
    /// Ties resolve to the smallest vertex id. Returns `None` for a mesh
    /// without points.
    pub fn closest_point(&self, query: &Point3<f64>) -> Option<VertexId> {
        let mut best: Option<(usize, f64)> = None;
        for (i, p) in self.points.iter().enumerate() {
            let d2 = (p - query).norm_squared();
            match best {
                Some((_, bd)) if d2 >= bd => {}
                _ => best = Some((i, d2)),
            }
        }
        best.map(|(i, _)| VertexId::new(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> PolyMesh {
        PolyMesh::from_triangles(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.5, 1.0, 0.0),
            ],
            &[[0, 1, 2]],
        )
    }

    #[test]
    fn test_stamps_increase_on_modification() {
        let mut mesh = unit_triangle();
        let before = mesh.mtime();
        mesh.set_position(VertexId::<u32>::new(0), Point3::new(0.0, 0.0, 1.0));
        assert!(mesh.mtime() > before);

        let before = mesh.mtime();
        mesh.add_polygon(vec![0, 2, 1]);
        assert!(mesh.mtime() > before);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = unit_triangle();
        let b = unit_triangle();
        assert_ne!(a.id(), b.id());

        let c = a.clone();
        assert_ne!(c.id(), a.id());
        assert_eq!(c.points(), a.points());
        assert_eq!(c.polys(), a.polys());
    }

    #[test]
    fn test_bounding_box() {
        let mesh = unit_triangle();
        let (min, max) = mesh.bounding_box().unwrap();
        assert_eq!(min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(max, Point3::new(1.0, 1.0, 0.0));

        assert!(PolyMesh::new().bounding_box().is_none());
    }

    #[test]
    fn test_closest_point() {
        let mesh = unit_triangle();
        let v = mesh.closest_point(&Point3::new(0.9, 0.1, 0.3)).unwrap();
        assert_eq!(v.index(), 1);
        assert!(PolyMesh::new().closest_point(&Point3::origin()).is_none());
    }
}
