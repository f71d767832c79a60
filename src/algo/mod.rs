//! Mesh processing algorithms.
//!
//! - **Geodesics**: fast marching, Dijkstra, geodesic paths
//! - **Selection**: vertices and faces within a radius of a point set
//! - **Progress**: callbacks and cancellation shared by long-running algorithms

pub mod geodesic;
pub mod progress;
pub mod select;

pub use progress::{Cancellation, Progress};
