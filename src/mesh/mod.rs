//! Core mesh data structures.
//!
//! # Overview
//!
//! Two types describe a surface:
//!
//! - [`PolyMesh`] is the input: points plus polygon cells of any arity, with a
//!   modification stamp so derived data can be cached.
//! - [`TriangleConnectivity`] is derived from a `PolyMesh` and validated on
//!   construction. It stores vertex/face adjacency as index lists and is what
//!   the geodesic algorithms traverse.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a vertex
//! - [`FaceId`] - Identifies a face
//!
//! These indices are generic over the underlying integer type ([`MeshIndex`] trait),
//! allowing you to choose `u16`, `u32`, or `u64` based on mesh size.
//!
//! # Construction
//!
//! ```
//! use fastmarch::mesh::{PolyMesh, TriangleConnectivity};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let mesh = PolyMesh::from_triangles(vertices, &[[0, 1, 2]]);
//!
//! let conn: TriangleConnectivity = TriangleConnectivity::build(&mesh).unwrap();
//! assert_eq!(conn.num_faces(), 1);
//! ```

mod connectivity;
mod index;
mod poly;

pub use connectivity::TriangleConnectivity;
pub use index::{FaceId, MeshIndex, VertexId};
pub use poly::{next_stamp, PolyMesh};
