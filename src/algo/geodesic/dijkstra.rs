//! Shortest distances along mesh edges.
//!
//! Runs the same Far/Trial/Known front as [`FastMarching`](super::FastMarching)
//! but relaxes single edges instead of triangles. Edge-graph distances never
//! underestimate surface distance, so they bound fast marching from above.

use crate::mesh::{MeshIndex, TriangleConnectivity, VertexId};

use super::front::{Front, VertexState};

/// Edge-graph distances from a set of sources, with the parent of each
/// reached vertex on its shortest edge path.
#[derive(Debug, Clone)]
pub struct EdgeDistances<I: MeshIndex = u32> {
    distances: Vec<f64>,
    parents: Vec<Option<VertexId<I>>>,
    settled: usize,
}

impl<I: MeshIndex> EdgeDistances<I> {
    /// Distance to a vertex; infinite if it was not reached.
    #[inline]
    pub fn distance(&self, v: VertexId<I>) -> f64 {
        self.distances[v.index()]
    }

    /// All distances, indexed by vertex.
    #[inline]
    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    /// Check if a vertex was reached.
    #[inline]
    pub fn is_reachable(&self, v: VertexId<I>) -> bool {
        self.distances[v.index()].is_finite()
    }

    /// Number of vertices finalized before the run ended.
    #[inline]
    pub fn settled(&self) -> usize {
        self.settled
    }

    /// Walk parents from `v` back to the source that reached it.
    ///
    /// The path starts at `v` and ends at a source. `None` if `v` was not
    /// reached.
    pub fn path_from(&self, v: VertexId<I>) -> Option<Vec<VertexId<I>>> {
        if !self.is_reachable(v) {
            return None;
        }

        let mut path = vec![v];
        let mut current = v;
        while let Some(parent) = self.parents[current.index()] {
            path.push(parent);
            current = parent;
        }
        Some(path)
    }
}

/// Compute edge-graph distances from `sources`.
///
/// With `target` set, the run ends as soon as the target is finalized; other
/// vertices may then hold tentative distances. Out-of-range sources are
/// ignored.
///
/// # Example
///
/// ```
/// use fastmarch::algo::geodesic::dijkstra;
/// use fastmarch::mesh::{PolyMesh, TriangleConnectivity, VertexId};
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
/// let conn: TriangleConnectivity = TriangleConnectivity::build(&mesh).unwrap();
///
/// let result = dijkstra(&conn, &[VertexId::new(1)], None);
/// // Vertex 3 is two unit edges away; there is no 1-3 edge.
/// assert_eq!(result.distance(VertexId::new(3)), 2.0);
/// ```
pub fn dijkstra<I: MeshIndex>(
    conn: &TriangleConnectivity<I>,
    sources: &[VertexId<I>],
    target: Option<VertexId<I>>,
) -> EdgeDistances<I> {
    let n = conn.num_vertices();
    let mut states = vec![VertexState::Far; n];
    let mut distances = vec![f64::INFINITY; n];
    let mut parents = vec![None; n];
    let mut front = Front::with_capacity(n);
    let mut settled = 0;

    for s in sources.iter().filter(|s| s.index() < n) {
        states[s.index()] = VertexState::Trial;
        distances[s.index()] = 0.0;
        front.push(s.index(), 0.0);
    }

    while let Some((u, du)) = front.pop(&states, &distances) {
        states[u] = VertexState::Known;
        settled += 1;

        let uid = VertexId::<I>::new(u);
        if target == Some(uid) {
            break;
        }

        for &w in conn.vertex_neighbors(uid) {
            let wi = w.index();
            if states[wi] == VertexState::Known {
                continue;
            }
            let candidate = du + conn.edge_length(uid, w);
            if candidate < distances[wi] {
                distances[wi] = candidate;
                parents[wi] = Some(uid);
                states[wi] = VertexState::Trial;
                front.push(wi, candidate);
            }
        }
    }

    log::debug!("dijkstra settled {} of {} vertices", settled, n);

    EdgeDistances {
        distances,
        parents,
        settled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::geodesic::{FastMarching, FastMarchingOptions};
    use crate::mesh::PolyMesh;
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

    fn build(mesh: &PolyMesh) -> TriangleConnectivity {
        TriangleConnectivity::build(mesh).unwrap()
    }

    #[test]
    fn test_grid_edge_distances() {
        let conn = build(&create_grid_mesh(2));
        let result = dijkstra(&conn, &[VertexId::new(0)], None);

        let sqrt2 = 2.0_f64.sqrt();
        // (1, 0) by one axis edge, (2, 1) by a diagonal then an axis edge.
        assert_eq!(result.distance(VertexId::new(1)), 1.0);
        assert!((result.distance(VertexId::new(5)) - (1.0 + sqrt2)).abs() < 1e-12);
        assert!((result.distance(VertexId::new(8)) - 2.0 * sqrt2).abs() < 1e-12);
        assert_eq!(result.settled(), 9);
    }

    #[test]
    fn test_path_from_walks_to_source() {
        let conn = build(&create_grid_mesh(3));
        let result = dijkstra(&conn, &[VertexId::new(0)], None);

        let path = result.path_from(VertexId::new(15)).unwrap();
        let ids: Vec<usize> = path.iter().map(|v| v.index()).collect();
        assert_eq!(ids, vec![15, 10, 5, 0]);
        assert_eq!(result.path_from(VertexId::new(0)), Some(vec![VertexId::new(0)]));
    }

    #[test]
    fn test_target_ends_run_early() {
        let conn = build(&create_grid_mesh(4));
        let full = dijkstra(&conn, &[VertexId::new(0)], None);
        let early = dijkstra(&conn, &[VertexId::new(0)], Some(VertexId::new(6)));

        assert_eq!(early.distance(VertexId::new(6)), full.distance(VertexId::new(6)));
        assert!(early.settled() < full.settled());
        // The far corner is never relaxed.
        assert!(!early.is_reachable(VertexId::new(24)));
    }

    #[test]
    fn test_nearest_source_wins() {
        let conn = build(&create_grid_mesh(4));
        let result = dijkstra(&conn, &[VertexId::new(0), VertexId::new(4)], None);

        assert_eq!(result.distance(VertexId::new(4)), 0.0);
        assert_eq!(result.distance(VertexId::new(3)), 1.0);
        assert_eq!(result.path_from(VertexId::new(3)).unwrap().last(), Some(&VertexId::new(4)));
    }

    #[test]
    fn test_disconnected_component() {
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
        let result = dijkstra(&build(&mesh), &[VertexId::new(0)], None);

        assert_eq!(result.settled(), 3);
        assert!(!result.is_reachable(VertexId::new(4)));
        assert_eq!(result.path_from(VertexId::new(4)), None);
    }

    #[test]
    fn test_upper_bound_for_fast_marching() {
        let mesh = create_grid_mesh(4);
        let graph = dijkstra(&build(&mesh), &[VertexId::new(0)], None);

        let mut engine: FastMarching = FastMarching::new();
        engine
            .configure(&mesh, &[VertexId::new(0)], FastMarchingOptions::default())
            .unwrap();
        engine.compute().unwrap();
        let field = engine.distance_field();

        for (v, &d) in graph.distances().iter().enumerate() {
            assert!(field.values()[v] <= d + 1e-9, "{}: {} > {}", v, field.values()[v], d);
        }
        // Off-diagonal vertices are strictly closer than along edges.
        assert!(field.values()[7] < graph.distance(VertexId::new(7)));
    }
}
