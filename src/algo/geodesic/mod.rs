//! Geodesic distance computation on triangle meshes.
//!
//! # Available Algorithms
//!
//! - [`FastMarching`]: front propagation with the triangle update, approximating
//!   true surface distance. Supports stop criteria, exclusion and weights.
//! - [`dijkstra`]: shortest paths along mesh edges (exact on the edge graph).
//! - [`geodesic_path`]: vertex path between two vertices using either method.
//!
//! # Example
//!
//! ```
//! use fastmarch::algo::geodesic::{FastMarching, FastMarchingOptions};
//! use fastmarch::mesh::{PolyMesh, VertexId};
//! use nalgebra::Point3;
//!
//! let mesh = PolyMesh::from_triangles(
//!     vec![
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(1.0, 1.0, 0.0),
//!         Point3::new(0.0, 1.0, 0.0),
//!     ],
//!     &[[0, 1, 2], [0, 2, 3]],
//! );
//!
//! let mut engine: FastMarching = FastMarching::new();
//! let options = FastMarchingOptions::default().with_distance_stop(1.2);
//! engine.configure(&mesh, &[VertexId::new(0)], options).unwrap();
//! engine.compute().unwrap();
//!
//! let field = engine.distance_field();
//! // The opposite corner lies beyond the threshold.
//! assert_eq!(field.values()[2], -1.0);
//! assert_eq!(field.statistics().visited, 3);
//! ```

mod dijkstra;
mod fast_marching;
mod front;
mod path;
mod policy;
mod update;

pub use dijkstra::{dijkstra, EdgeDistances};
pub use fast_marching::{
    ConfigWarning, FastMarching, FastMarchingOptions, MarchOutcome,
    DEFAULT_FIELD_NAME, DEFAULT_ITERATION_EVENT_RESOLUTION,
};
pub use front::VertexState;
pub use path::{geodesic_path, GeodesicMethod, GeodesicPath};
pub use policy::{
    DestinationStop, DistanceStop, ExclusionFilter, InsertionFilter, PropagationWeight,
    StopCriterion, StopReason, UniformWeight, VertexWeights,
};

use crate::mesh::{MeshIndex, VertexId};

/// Summary of a fast-marching run.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MarchStatistics {
    /// Largest finalized distance (0 if nothing was finalized).
    pub max_distance: f64,
    /// Number of finalized vertices, seeds included.
    pub visited: usize,
}

/// Per-vertex distances produced by fast marching.
///
/// Vertices that were never finalized hold the not-visited value.
#[derive(Debug, Clone)]
pub struct DistanceField {
    name: String,
    values: Vec<f64>,
    not_visited_value: f64,
    statistics: MarchStatistics,
}

impl DistanceField {
    pub(crate) fn new(
        name: String,
        values: Vec<f64>,
        not_visited_value: f64,
        statistics: MarchStatistics,
    ) -> Self {
        Self {
            name,
            values,
            not_visited_value,
            statistics,
        }
    }

    /// Field name, used as the attribute name when saving.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// One value per vertex.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Take ownership of the values.
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// Value of a single vertex.
    #[inline]
    pub fn value<I: MeshIndex>(&self, v: VertexId<I>) -> f64 {
        self.values[v.index()]
    }

    /// The sentinel written for unvisited vertices.
    #[inline]
    pub fn not_visited_value(&self) -> f64 {
        self.not_visited_value
    }

    /// Maximum distance and visited count.
    #[inline]
    pub fn statistics(&self) -> MarchStatistics {
        self.statistics
    }

    /// Number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_field_accessors() {
        let stats = MarchStatistics {
            max_distance: 2.0,
            visited: 2,
        };
        let field = DistanceField::new("d".to_string(), vec![0.0, 2.0, -1.0], -1.0, stats);

        assert_eq!(field.name(), "d");
        assert_eq!(field.len(), 3);
        assert_eq!(field.value(VertexId::<u32>::new(1)), 2.0);
        assert_eq!(field.not_visited_value(), -1.0);
        assert_eq!(field.statistics(), stats);
        assert_eq!(field.into_values(), vec![0.0, 2.0, -1.0]);
    }
}
