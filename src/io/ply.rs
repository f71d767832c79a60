//! PLY (Stanford polygon) format support.
//!
//! Faces are loaded exactly as stored, whatever their arity; the geodesic
//! engine reports non-triangular faces when it builds connectivity. Saving
//! writes ASCII PLY, optionally with one float scalar per vertex.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};

use crate::error::{MeshError, Result};
use crate::mesh::PolyMesh;

/// Load a mesh from a PLY file.
///
/// # Example
///
/// ```no_run
/// use fastmarch::io::ply;
///
/// let mesh = ply::load("model.ply").unwrap();
/// println!("{} polygons", mesh.num_polys());
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<PolyMesh> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let load_error = |message: &str| MeshError::LoadError {
        path: path.to_path_buf(),
        message: message.to_string(),
    };

    let parser = Parser::<DefaultElement>::new();
    let ply = parser
        .read_ply(&mut reader)
        .map_err(|e| load_error(&e.to_string()))?;

    let vertex_element = ply
        .payload
        .get("vertex")
        .ok_or_else(|| load_error("PLY file has no vertex element"))?;

    let mut points: Vec<Point3<f64>> = Vec::with_capacity(vertex_element.len());
    for vertex in vertex_element {
        let x = get_float_property(vertex, "x").ok_or_else(|| load_error("vertex missing x coordinate"))?;
        let y = get_float_property(vertex, "y").ok_or_else(|| load_error("vertex missing y coordinate"))?;
        let z = get_float_property(vertex, "z").ok_or_else(|| load_error("vertex missing z coordinate"))?;
        points.push(Point3::new(x, y, z));
    }

    let face_element = ply
        .payload
        .get("face")
        .ok_or_else(|| load_error("PLY file has no face element"))?;

    let mut polys: Vec<Vec<usize>> = Vec::with_capacity(face_element.len());
    for face in face_element {
        let indices = get_list_property(face, "vertex_indices")
            .or_else(|| get_list_property(face, "vertex_index"))
            .ok_or_else(|| load_error("face missing vertex_indices property"))?;
        polys.push(indices);
    }

    if polys.is_empty() {
        return Err(load_error("PLY file contains no faces"));
    }

    Ok(PolyMesh::from_polygons(points, polys))
}

fn get_float_property(element: &DefaultElement, name: &str) -> Option<f64> {
    match element.get(name)? {
        Property::Float(v) => Some(*v as f64),
        Property::Double(v) => Some(*v),
        Property::Int(v) => Some(*v as f64),
        Property::UInt(v) => Some(*v as f64),
        Property::Short(v) => Some(*v as f64),
        Property::UShort(v) => Some(*v as f64),
        Property::Char(v) => Some(*v as f64),
        Property::UChar(v) => Some(*v as f64),
        _ => None,
    }
}

fn get_list_property(element: &DefaultElement, name: &str) -> Option<Vec<usize>> {
    match element.get(name)? {
        Property::ListInt(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUInt(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListShort(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUShort(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListChar(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUChar(v) => Some(v.iter().map(|&x| x as usize).collect()),
        _ => None,
    }
}

/// Save a mesh to an ASCII PLY file.
///
/// # Example
///
/// ```no_run
/// use fastmarch::io::ply;
/// use fastmarch::mesh::PolyMesh;
///
/// let mesh = PolyMesh::new();
/// ply::save(&mesh, "output.ply").unwrap();
/// ```
pub fn save<P: AsRef<Path>>(mesh: &PolyMesh, path: P) -> Result<()> {
    write(mesh, None, path.as_ref())
}

/// Save a mesh with a per-vertex float property.
///
/// The property is written as `property float <name>` after the coordinates.
///
/// # Errors
///
/// [`MeshError::InvalidParameter`] if `values` does not have one entry per
/// point or `name` is not a valid PLY property name.
pub fn save_with_scalars<P: AsRef<Path>>(
    mesh: &PolyMesh,
    name: &str,
    values: &[f64],
    path: P,
) -> Result<()> {
    if values.len() != mesh.num_points() {
        return Err(MeshError::invalid_param(
            "values",
            values.len(),
            "must have one value per point",
        ));
    }
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(MeshError::invalid_param(
            "name",
            name,
            "must be a non-empty name without whitespace",
        ));
    }
    write(mesh, Some((name, values)), path.as_ref())
}

fn write(mesh: &PolyMesh, scalars: Option<(&str, &[f64])>, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "ply")?;
    writeln!(writer, "format ascii 1.0")?;
    writeln!(writer, "comment Generated by fastmarch")?;
    writeln!(writer, "element vertex {}", mesh.num_points())?;
    writeln!(writer, "property float x")?;
    writeln!(writer, "property float y")?;
    writeln!(writer, "property float z")?;
    if let Some((name, _)) = scalars {
        writeln!(writer, "property float {}", name)?;
    }
    writeln!(writer, "element face {}", mesh.num_polys())?;
    writeln!(writer, "property list uchar int vertex_indices")?;
    writeln!(writer, "end_header")?;

    for (i, p) in mesh.points().iter().enumerate() {
        match scalars {
            Some((_, values)) => writeln!(writer, "{} {} {} {}", p.x, p.y, p.z, values[i])?,
            None => writeln!(writer, "{} {} {}", p.x, p.y, p.z)?,
        }
    }

    for cell in mesh.polys() {
        write!(writer, "{}", cell.len())?;
        for v in cell {
            write!(writer, " {}", v)?;
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("fastmarch_{}_{}", std::process::id(), name))
    }

    fn quad_and_triangle() -> PolyMesh {
        PolyMesh::from_polygons(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(2.0, 0.5, 0.0),
            ],
            vec![vec![0, 1, 2, 3], vec![1, 4, 2]],
        )
    }

    #[test]
    fn test_polygons_are_kept() {
        let path = temp_path("polys.ply");
        save(&quad_and_triangle(), &path).unwrap();
        let loaded = load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.num_points(), 5);
        assert_eq!(loaded.polys(), &[vec![0, 1, 2, 3], vec![1, 4, 2]]);
    }

    #[test]
    fn test_scalar_property_is_written() {
        let mesh = quad_and_triangle();
        let path = temp_path("scalars.ply");
        save_with_scalars(&mesh, "GeodesicDistance", &[0.0, 1.0, 1.5, 1.0, -1.0], &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let loaded = load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(text.contains("property float GeodesicDistance"));
        assert!(text.lines().any(|l| l == "2 0.5 0 -1"));
        assert_eq!(loaded.num_points(), 5);
    }

    #[test]
    fn test_scalar_length_mismatch() {
        let err = save_with_scalars(&quad_and_triangle(), "d", &[0.0], temp_path("bad.ply")).unwrap_err();
        assert!(matches!(err, MeshError::InvalidParameter { name: "values", .. }));
    }
}
