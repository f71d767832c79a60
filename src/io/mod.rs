//! Mesh file I/O.
//!
//! # Supported Formats
//!
//! | Format | Extension | Load | Save mesh | Save distance field |
//! |--------|-----------|------|-----------|---------------------|
//! | PLY | `.ply` | ✓ | ✓ | ✓ (float vertex property) |
//! | STL | `.stl` | ✓ | ✓ | ✗ |
//! | CSV | `.csv` | ✗ | ✗ | ✓ (`vertex,<name>` rows) |
//!
//! # Usage
//!
//! ```no_run
//! use fastmarch::algo::geodesic::{FastMarching, FastMarchingOptions};
//! use fastmarch::io::{load, save_distance_field};
//! use fastmarch::mesh::VertexId;
//!
//! let mesh = load("model.ply").unwrap();
//!
//! let mut engine: FastMarching = FastMarching::new();
//! engine
//!     .configure(&mesh, &[VertexId::new(0)], FastMarchingOptions::default())
//!     .unwrap();
//! engine.compute().unwrap();
//!
//! save_distance_field(&mesh, &engine.distance_field(), "distance.ply").unwrap();
//! ```

pub mod csv;
pub mod ply;
pub mod stl;

use std::path::Path;

use crate::algo::geodesic::DistanceField;
use crate::error::{MeshError, Result};
use crate::mesh::PolyMesh;

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// PLY (Stanford polygon) format.
    Ply,
    /// STL (stereolithography) format.
    Stl,
    /// Comma-separated per-vertex values.
    Csv,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "ply" => Some(Format::Ply),
            "stl" => Some(Format::Stl),
            "csv" => Some(Format::Csv),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }
}

fn detect(path: &Path) -> Result<Format> {
    Format::from_path(path).ok_or_else(|| MeshError::UnsupportedFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })
}

/// Load a mesh from a file with automatic format detection.
///
/// # Example
///
/// ```no_run
/// let mesh = fastmarch::io::load("model.stl").unwrap();
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<PolyMesh> {
    let path = path.as_ref();
    let mesh = match detect(path)? {
        Format::Ply => ply::load(path)?,
        Format::Stl => stl::load(path)?,
        Format::Csv => {
            return Err(MeshError::UnsupportedFormat {
                extension: "csv".to_string(),
            })
        }
    };

    log::debug!(
        "loaded {}: {} points, {} polygons",
        path.display(),
        mesh.num_points(),
        mesh.num_polys()
    );
    Ok(mesh)
}

/// Save a mesh with automatic format detection.
pub fn save<P: AsRef<Path>>(mesh: &PolyMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    match detect(path)? {
        Format::Ply => ply::save(mesh, path),
        Format::Stl => stl::save(mesh, path),
        Format::Csv => Err(MeshError::SaveError {
            path: path.to_path_buf(),
            message: "CSV stores per-vertex values, not meshes".to_string(),
        }),
    }
}

/// Save a distance field, either as a PLY mesh carrying the field as a vertex
/// property or as CSV rows.
///
/// # Errors
///
/// [`MeshError::SaveError`] for STL, which cannot carry per-vertex values.
pub fn save_distance_field<P: AsRef<Path>>(
    mesh: &PolyMesh,
    field: &DistanceField,
    path: P,
) -> Result<()> {
    let path = path.as_ref();
    match detect(path)? {
        Format::Ply => ply::save_with_scalars(mesh, field.name(), field.values(), path),
        Format::Csv => csv::save_values(field.name(), field.values(), path),
        Format::Stl => Err(MeshError::SaveError {
            path: path.to_path_buf(),
            message: "STL cannot store per-vertex values".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(Format::from_path("a/b/model.PLY"), Some(Format::Ply));
        assert_eq!(Format::from_path("model.stl"), Some(Format::Stl));
        assert_eq!(Format::from_path("field.csv"), Some(Format::Csv));
        assert_eq!(Format::from_path("model.obj"), None);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load("model.obj").unwrap_err();
        assert!(matches!(err, MeshError::UnsupportedFormat { extension } if extension == "obj"));

        let err = load("noext").unwrap_err();
        assert!(matches!(err, MeshError::UnsupportedFormat { extension } if extension == "(none)"));
    }
}
