//! # fastmarch
//!
//! Geodesic distance fields on triangle meshes by fast marching.
//!
//! Starting from a set of seed vertices, a front is propagated over the
//! surface and each vertex is assigned its distance along the surface. The
//! march can be limited by a distance threshold or a set of destination
//! vertices, kept out of excluded regions, and slowed by per-vertex weights.
//!
//! ## Features
//!
//! - **Fast marching** with the two-neighbor triangle update, reusable engine
//!   with a connectivity cache
//! - **Dijkstra** edge-graph distances and **geodesic paths** between vertices
//! - **Selection** of vertices and faces within a radius of a point set
//! - **File formats**: PLY and STL input, PLY and CSV distance field output
//! - **Flexible indexing**: 16-bit, 32-bit and 64-bit vertex ids
//!
//! ## Quick Start
//!
//! ```no_run
//! use fastmarch::prelude::*;
//!
//! let mesh = fastmarch::io::load("model.ply").unwrap();
//!
//! let mut engine: FastMarching = FastMarching::new();
//! let options = FastMarchingOptions::default().with_distance_stop(25.0);
//! engine.configure(&mesh, &[VertexId::new(0)], options).unwrap();
//! engine.compute().unwrap();
//!
//! let field = engine.distance_field();
//! println!("visited {} vertices", field.statistics().visited);
//! fastmarch::io::save_distance_field(&mesh, &field, "distance.ply").unwrap();
//! ```
//!
//! ## Building Meshes Programmatically
//!
//! ```
//! use fastmarch::prelude::*;
//! use nalgebra::Point3;
//!
//! let mesh = PolyMesh::from_triangles(
//!     vec![
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(1.0, 1.0, 0.0),
//!         Point3::new(0.0, 1.0, 0.0),
//!         Point3::new(0.5, 0.5, 0.0),
//!     ],
//!     &[[0, 1, 4], [1, 2, 4], [2, 3, 4], [3, 0, 4]],
//! );
//!
//! let mut engine: FastMarching = FastMarching::new();
//! engine
//!     .configure(&mesh, &[VertexId::new(4)], FastMarchingOptions::default())
//!     .unwrap();
//! assert_eq!(engine.compute().unwrap(), MarchOutcome::Completed);
//!
//! let corner = engine.distance_field().value(VertexId::<u32>::new(0));
//! assert!((corner - 0.5_f64.sqrt()).abs() < 1e-12);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod io;
pub mod mesh;

pub use nalgebra;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use fastmarch::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::geodesic::{
        DistanceField, FastMarching, FastMarchingOptions, MarchOutcome, MarchStatistics,
        StopReason, VertexState,
    };
    pub use crate::algo::{Cancellation, Progress};
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{FaceId, MeshIndex, PolyMesh, TriangleConnectivity, VertexId};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use nalgebra::Point3;

    #[test]
    fn test_prelude_round_trip() {
        let mesh = PolyMesh::from_triangles(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            &[[0, 1, 2]],
        );

        // The same geometry in a fresh mesh gives the same field.
        let rebuilt = PolyMesh::from_polygons(mesh.points().to_vec(), mesh.polys().to_vec());

        let mut engine: FastMarching = FastMarching::new();
        engine
            .configure(&mesh, &[VertexId::new(0)], FastMarchingOptions::default())
            .unwrap();
        engine.compute().unwrap();
        let first = engine.distance_field().into_values();

        engine
            .configure(&rebuilt, &[VertexId::new(0)], FastMarchingOptions::default())
            .unwrap();
        engine.compute().unwrap();
        assert_eq!(engine.distance_field().into_values(), first);
        assert_eq!(engine.connectivity_builds(), 2);
    }
}
