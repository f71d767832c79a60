//! STL (stereolithography) format support.
//!
//! Both binary and ASCII files are read. STL stores independent triangles;
//! `stl_io` merges coincident corners into shared vertices, which is what
//! gives the mesh its connectivity.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use nalgebra::{Point3, Vector3};

use crate::error::{MeshError, Result};
use crate::mesh::PolyMesh;

/// Load a mesh from an STL file.
///
/// Triangles that collapse onto a repeated vertex are dropped.
///
/// # Example
///
/// ```no_run
/// use fastmarch::io::stl;
///
/// let mesh = stl::load("model.stl").unwrap();
/// println!("{} points", mesh.num_points());
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<PolyMesh> {
    let path = path.as_ref();
    let mut file = File::open(path)?;

    let stl = stl_io::read_stl(&mut file).map_err(|e| MeshError::LoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let points: Vec<Point3<f64>> = stl
        .vertices
        .iter()
        .map(|v| Point3::new(v[0] as f64, v[1] as f64, v[2] as f64))
        .collect();

    let mut faces: Vec<[usize; 3]> = Vec::with_capacity(stl.faces.len());
    for tri in &stl.faces {
        let [i0, i1, i2] = tri.vertices;
        if i0 != i1 && i1 != i2 && i0 != i2 {
            faces.push([i0, i1, i2]);
        }
    }

    let dropped = stl.faces.len() - faces.len();
    if dropped > 0 {
        log::debug!("dropped {} degenerate triangles from {}", dropped, path.display());
    }

    if faces.is_empty() {
        return Err(MeshError::LoadError {
            path: path.to_path_buf(),
            message: "STL file contains no valid triangles".to_string(),
        });
    }

    Ok(PolyMesh::from_triangles(points, &faces))
}

/// Save a mesh to a binary STL file.
///
/// Polygons with more than three corners are fan-triangulated; cells with
/// fewer are skipped.
///
/// # Example
///
/// ```no_run
/// use fastmarch::io::stl;
/// use fastmarch::mesh::PolyMesh;
///
/// let mesh = PolyMesh::new();
/// stl::save(&mesh, "output.stl").unwrap();
/// ```
pub fn save<P: AsRef<Path>>(mesh: &PolyMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let points = mesh.points();
    let mut triangles: Vec<stl_io::Triangle> = Vec::with_capacity(mesh.num_polys());

    for cell in mesh.polys() {
        if cell.len() < 3 {
            continue;
        }
        for k in 1..cell.len() - 1 {
            let (Some(p0), Some(p1), Some(p2)) = (
                points.get(cell[0]),
                points.get(cell[k]),
                points.get(cell[k + 1]),
            ) else {
                return Err(MeshError::SaveError {
                    path: path.to_path_buf(),
                    message: "cell references a missing point".to_string(),
                });
            };

            let n = (p1 - p0)
                .cross(&(p2 - p0))
                .try_normalize(f64::EPSILON)
                .unwrap_or_else(Vector3::zeros);

            triangles.push(stl_io::Triangle {
                normal: stl_io::Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: [
                    stl_io::Vertex::new([p0.x as f32, p0.y as f32, p0.z as f32]),
                    stl_io::Vertex::new([p1.x as f32, p1.y as f32, p1.z as f32]),
                    stl_io::Vertex::new([p2.x as f32, p2.y as f32, p2.z as f32]),
                ],
            });
        }
    }

    stl_io::write_stl(&mut writer, triangles.iter()).map_err(|e| MeshError::SaveError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("fastmarch_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_roundtrip_shares_vertices() {
        let mesh = PolyMesh::from_triangles(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            &[[0, 1, 2], [0, 2, 3]],
        );
        let path = temp_path("square.stl");
        save(&mesh, &path).unwrap();

        let loaded = load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.num_points(), 4);
        assert_eq!(loaded.num_polys(), 2);
    }

    #[test]
    fn test_missing_file() {
        let err = load(temp_path("missing.stl")).unwrap_err();
        assert!(matches!(err, MeshError::Io(_)));
    }
}
