//! Error types for fastmarch.
//!
//! This module defines all error types used throughout the library.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur during mesh and geodesic operations.
#[derive(Error, Debug)]
pub enum MeshError {
    /// The mesh has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A face does not have exactly three vertices.
    #[error("face {face} has {vertices} vertices; only triangle meshes are supported")]
    NonTriangularFace {
        /// The face index.
        face: usize,
        /// Number of vertices in the offending face.
        vertices: usize,
    },

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face has duplicate vertex indices (degenerate triangle).
    #[error("face {face} is degenerate (has duplicate vertices)")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// No seed vertices were supplied.
    #[error("at least one seed vertex is required")]
    EmptySeeds,

    /// A seed does not name a mesh vertex.
    #[error("seed vertex {seed} is out of range (mesh has {vertex_count} vertices)")]
    SeedOutOfRange {
        /// The offending seed id.
        seed: usize,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// `compute` was called before a successful `configure`.
    #[error("geodesic engine is not configured")]
    NotConfigured,

    /// No surface path connects the two vertices.
    #[error("vertex {to} is not reachable from vertex {from}")]
    Unreachable {
        /// Path start.
        from: usize,
        /// Path end.
        to: usize,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading mesh from file.
    #[error("failed to load mesh from {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Error saving mesh to file.
    #[error("failed to save mesh to {path}: {message}")]
    SaveError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// True for errors raised while validating mesh topology.
    pub fn is_invalid_mesh(&self) -> bool {
        matches!(
            self,
            MeshError::EmptyMesh
                | MeshError::NonTriangularFace { .. }
                | MeshError::InvalidVertexIndex { .. }
                | MeshError::DegenerateFace { .. }
        )
    }

    /// True for errors raised while validating the seed list.
    pub fn is_invalid_seed(&self) -> bool {
        matches!(self, MeshError::EmptySeeds | MeshError::SeedOutOfRange { .. })
    }
}
