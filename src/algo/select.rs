//! Vertex and face selection around a set of points.
//!
//! A vertex is selected when it lies within a radius of any input point,
//! measured either as straight-line distance or as geodesic distance over
//! the surface from the mesh vertices closest to the points.

use nalgebra::Point3;

use crate::algo::geodesic::{FastMarching, FastMarchingOptions};
use crate::error::{MeshError, Result};
use crate::mesh::{PolyMesh, VertexId};

/// Lower bound of the accepted geodesic distance, so that the not-visited
/// value (negative) is rejected while seeds at 0 are kept.
const GEODESIC_TOLERANCE: f64 = 1e-5;

/// How distance to the input points is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMethod {
    /// Straight-line distance.
    #[default]
    SphereRadius,
    /// Distance over the surface.
    GeodesicDistance,
}

/// Options for [`select_by_points`].
#[derive(Debug, Clone)]
pub struct SelectOptions {
    /// Selection radius.
    pub radius: f64,

    /// Distance measure.
    pub method: SelectionMethod,
}

impl Default for SelectOptions {
    fn default() -> Self {
        Self {
            radius: 5.0,
            method: SelectionMethod::SphereRadius,
        }
    }
}

impl SelectOptions {
    /// Set the selection radius.
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Set the distance measure.
    pub fn with_method(mut self, method: SelectionMethod) -> Self {
        self.method = method;
        self
    }
}

/// Result of a selection.
#[derive(Debug, Clone)]
pub struct Selection {
    mask: Vec<u8>,
    faces: Vec<usize>,
}

impl Selection {
    fn from_mask(mesh: &PolyMesh, mask: Vec<u8>) -> Self {
        let faces = mesh
            .polys()
            .iter()
            .enumerate()
            .filter(|(_, cell)| !cell.is_empty() && cell.iter().all(|&v| mask.get(v) == Some(&1)))
            .map(|(f, _)| f)
            .collect();
        Self { mask, faces }
    }

    /// Per-vertex flag: 1 if selected, 0 otherwise.
    #[inline]
    pub fn mask(&self) -> &[u8] {
        &self.mask
    }

    /// Check whether a vertex is selected.
    #[inline]
    pub fn is_selected(&self, v: VertexId) -> bool {
        self.mask.get(v.index()) == Some(&1)
    }

    /// Selected vertex ids in ascending order.
    pub fn vertices(&self) -> Vec<VertexId> {
        self.mask
            .iter()
            .enumerate()
            .filter(|(_, &m)| m == 1)
            .map(|(i, _)| VertexId::new(i))
            .collect()
    }

    /// Number of selected vertices.
    pub fn num_selected(&self) -> usize {
        self.mask.iter().filter(|&&m| m == 1).count()
    }

    /// Indices of faces whose vertices are all selected.
    #[inline]
    pub fn faces(&self) -> &[usize] {
        &self.faces
    }

    /// Build a mesh of the selected faces, keeping only the points they use.
    pub fn extract(&self, mesh: &PolyMesh) -> PolyMesh {
        let mut remap = vec![usize::MAX; mesh.num_points()];
        let mut points = Vec::new();
        let mut polys = Vec::with_capacity(self.faces.len());

        for &f in &self.faces {
            let cell = mesh.polys()[f]
                .iter()
                .map(|&v| {
                    if remap[v] == usize::MAX {
                        remap[v] = points.len();
                        points.push(mesh.points()[v]);
                    }
                    remap[v]
                })
                .collect();
            polys.push(cell);
        }

        PolyMesh::from_polygons(points, polys)
    }
}

/// Select mesh vertices and faces near a set of points.
///
/// # Errors
///
/// - [`MeshError::EmptyMesh`] if the mesh has no points
/// - [`MeshError::EmptySeeds`] if `points` is empty
/// - [`MeshError::InvalidParameter`] if the radius is not a positive number
/// - invalid mesh errors when the geodesic method builds connectivity
///
/// # Example
///
/// ```
/// use fastmarch::algo::select::{select_by_points, SelectOptions, SelectionMethod};
/// use fastmarch::mesh::PolyMesh;
/// use nalgebra::Point3;
///
/// let mesh = PolyMesh::from_triangles(
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///         Point3::new(3.0, 3.0, 0.0),
///     ],
///     &[[0, 1, 2], [1, 3, 2]],
/// );
///
/// let options = SelectOptions::default()
///     .with_radius(1.5)
///     .with_method(SelectionMethod::GeodesicDistance);
/// let selection = select_by_points(&mesh, &[Point3::new(0.1, 0.1, 0.0)], &options).unwrap();
/// assert_eq!(selection.mask(), &[1, 1, 1, 0]);
/// assert_eq!(selection.faces(), &[0]);
/// ```
pub fn select_by_points(
    mesh: &PolyMesh,
    points: &[Point3<f64>],
    options: &SelectOptions,
) -> Result<Selection> {
    if mesh.num_points() == 0 {
        return Err(MeshError::EmptyMesh);
    }
    if points.is_empty() {
        return Err(MeshError::EmptySeeds);
    }
    if !(options.radius.is_finite() && options.radius > 0.0) {
        return Err(MeshError::invalid_param(
            "radius",
            options.radius,
            "must be a positive number",
        ));
    }

    let mask = match options.method {
        SelectionMethod::SphereRadius => sphere_mask(mesh, points, options.radius),
        SelectionMethod::GeodesicDistance => geodesic_mask(mesh, points, options.radius)?,
    };

    let selection = Selection::from_mask(mesh, mask);
    log::debug!(
        "selected {} vertices and {} faces",
        selection.num_selected(),
        selection.faces().len()
    );
    Ok(selection)
}

fn sphere_mask(mesh: &PolyMesh, points: &[Point3<f64>], radius: f64) -> Vec<u8> {
    let r2 = radius * radius;
    mesh.points()
        .iter()
        .map(|p| {
            let inside = points.iter().any(|q| (p - q).norm_squared() <= r2);
            u8::from(inside)
        })
        .collect()
}

fn geodesic_mask(mesh: &PolyMesh, points: &[Point3<f64>], radius: f64) -> Result<Vec<u8>> {
    let seeds: Vec<VertexId> = points
        .iter()
        .filter_map(|p| mesh.closest_point(p))
        .collect();

    let mut engine: FastMarching = FastMarching::new();
    engine.configure(
        mesh,
        &seeds,
        FastMarchingOptions::default().with_distance_stop(radius),
    )?;
    engine.compute()?;

    let field = engine.distance_field();
    Ok(field
        .values()
        .iter()
        .map(|&d| u8::from(d < radius && d > -GEODESIC_TOLERANCE))
        .collect())
}
