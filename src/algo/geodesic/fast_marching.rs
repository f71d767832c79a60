//! Fast-marching geodesic distance on triangle meshes.
//!
//! [`FastMarching`] propagates a front from one or more seed vertices across
//! the mesh, finalizing vertices in non-decreasing distance order. Tentative
//! distances are updated with the triangle formula in [`super::update`], so
//! results approximate true surface distance rather than edge-graph distance.
//!
//! The engine is stateful: it caches the triangle connectivity of the last
//! configured mesh and rebuilds it only when the mesh changes.
//!
//! # Example
//!
//! ```
//! use fastmarch::algo::geodesic::{FastMarching, FastMarchingOptions, MarchOutcome};
//! use fastmarch::mesh::{PolyMesh, VertexId};
//! use nalgebra::Point3;
//!
//! let mesh = PolyMesh::from_triangles(
//!     vec![
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(0.0, 1.0, 0.0),
//!     ],
//!     &[[0, 1, 2]],
//! );
//!
//! let mut engine: FastMarching = FastMarching::new();
//! engine
//!     .configure(&mesh, &[VertexId::new(0)], FastMarchingOptions::default())
//!     .unwrap();
//! assert_eq!(engine.compute().unwrap(), MarchOutcome::Completed);
//!
//! let field = engine.distance_field();
//! assert!((field.values()[1] - 1.0).abs() < 1e-12);
//! assert_eq!(field.statistics().visited, 3);
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::algo::progress::{Cancellation, Progress};
use crate::error::{MeshError, Result};
use crate::mesh::{MeshIndex, PolyMesh, TriangleConnectivity, VertexId};

use super::front::{Front, VertexState};
use super::policy::{
    DestinationStop, DistanceStop, ExclusionFilter, InsertionFilter, MarchPolicy,
    PropagationWeight, StopCriterion, StopReason, UniformWeight, VertexWeights,
};
use super::update::{single_neighbor, two_neighbor};
use super::{DistanceField, MarchStatistics};

/// Default number of finalized vertices between progress events.
pub const DEFAULT_ITERATION_EVENT_RESOLUTION: usize = 100;

/// Default name of the generated distance field.
pub const DEFAULT_FIELD_NAME: &str = "GeodesicDistance";

/// Options for a fast-marching run.
#[derive(Clone)]
pub struct FastMarchingOptions {
    /// Stop when the next vertex to finalize is at least this far away.
    /// Only positive values are active.
    pub distance_stop: Option<f64>,

    /// Stop when one of these vertices comes up for finalization.
    pub destinations: Option<Vec<usize>>,

    /// Vertices that never enter the front.
    pub exclusion: Option<Vec<usize>>,

    /// Per-vertex propagation weights. Ignored (with a warning) if the length
    /// does not match the vertex count.
    pub weights: Option<Vec<f64>>,

    /// Value reported for vertices that were never finalized.
    pub not_visited_value: f64,

    /// Name given to the generated distance field.
    pub field_name: String,

    /// Additional stop criteria, evaluated after the built-in ones.
    pub stop_criteria: Vec<Arc<dyn StopCriterion>>,

    /// Additional insertion filters, evaluated after the exclusion set.
    pub insertion_filters: Vec<Arc<dyn InsertionFilter>>,
}

impl Default for FastMarchingOptions {
    fn default() -> Self {
        Self {
            distance_stop: None,
            destinations: None,
            exclusion: None,
            weights: None,
            not_visited_value: -1.0,
            field_name: DEFAULT_FIELD_NAME.to_string(),
            stop_criteria: Vec::new(),
            insertion_filters: Vec::new(),
        }
    }
}

impl fmt::Debug for FastMarchingOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FastMarchingOptions")
            .field("distance_stop", &self.distance_stop)
            .field("destinations", &self.destinations)
            .field("exclusion", &self.exclusion)
            .field("weights", &self.weights.as_ref().map(Vec::len))
            .field("not_visited_value", &self.not_visited_value)
            .field("field_name", &self.field_name)
            .field("stop_criteria", &self.stop_criteria.len())
            .field("insertion_filters", &self.insertion_filters.len())
            .finish()
    }
}

impl FastMarchingOptions {
    /// Stop once the front reaches `distance`.
    pub fn with_distance_stop(mut self, distance: f64) -> Self {
        self.distance_stop = Some(distance);
        self
    }

    /// Stop once any of `vertices` is about to be finalized.
    pub fn with_destinations<T: IntoIterator<Item = usize>>(mut self, vertices: T) -> Self {
        self.destinations = Some(vertices.into_iter().collect());
        self
    }

    /// Keep `vertices` out of the front.
    pub fn with_exclusion<T: IntoIterator<Item = usize>>(mut self, vertices: T) -> Self {
        self.exclusion = Some(vertices.into_iter().collect());
        self
    }

    /// Set per-vertex propagation weights.
    pub fn with_weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Set the value reported for unvisited vertices.
    pub fn with_not_visited_value(mut self, value: f64) -> Self {
        self.not_visited_value = value;
        self
    }

    /// Set the distance field name.
    pub fn with_field_name<S: Into<String>>(mut self, name: S) -> Self {
        self.field_name = name.into();
        self
    }

    /// Register an additional stop criterion.
    pub fn with_stop_criterion<S: StopCriterion + 'static>(mut self, criterion: S) -> Self {
        self.stop_criteria.push(Arc::new(criterion));
        self
    }

    /// Register an additional insertion filter.
    pub fn with_insertion_filter<F: InsertionFilter + 'static>(mut self, filter: F) -> Self {
        self.insertion_filters.push(Arc::new(filter));
        self
    }
}

/// Non-fatal configuration problems.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigWarning {
    /// The weight array length differs from the vertex count; uniform weight 1 is used.
    WeightLengthMismatch {
        /// Vertex count of the mesh.
        expected: usize,
        /// Length of the supplied array.
        actual: usize,
    },
    /// A weight is zero, negative or not finite; distances will be unreliable.
    NonPositiveWeight {
        /// First offending vertex.
        vertex: usize,
        /// Its weight.
        weight: f64,
    },
    /// A distance threshold that is not positive is ignored.
    InactiveDistanceStop {
        /// The supplied threshold.
        value: f64,
    },
    /// Some destination or exclusion ids do not name mesh vertices and never match.
    IdsOutOfRange {
        /// Which list the ids came from.
        list: &'static str,
        /// How many ids were out of range.
        count: usize,
    },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::WeightLengthMismatch { expected, actual } => write!(
                f,
                "propagation weights have {} entries but the mesh has {} vertices; using uniform weight",
                actual, expected
            ),
            ConfigWarning::NonPositiveWeight { vertex, weight } => write!(
                f,
                "propagation weight {} at vertex {} is not positive",
                weight, vertex
            ),
            ConfigWarning::InactiveDistanceStop { value } => {
                write!(f, "distance stop {} is not positive and is ignored", value)
            }
            ConfigWarning::IdsOutOfRange { list, count } => {
                write!(f, "{} {} ids are out of range and are ignored", count, list)
            }
        }
    }
}

/// How a call to [`FastMarching::compute`] ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarchOutcome {
    /// Every reachable, admitted vertex was finalized.
    Completed,
    /// A stop criterion fired before the front was exhausted.
    Stopped(StopReason),
    /// The cancellation check asked the march to end.
    Cancelled,
}

#[derive(Debug, Clone, Copy)]
struct CacheKey {
    mesh_id: u64,
    built_at: u64,
}

/// Fast-marching geodesic distance engine.
///
/// Call [`configure`](Self::configure) with a mesh, seeds and options, then
/// [`compute`](Self::compute). The engine may be reconfigured and recomputed
/// any number of times; connectivity is reused while the mesh is unchanged.
pub struct FastMarching<I: MeshIndex = u32> {
    connectivity: Option<TriangleConnectivity<I>>,
    cache: Option<CacheKey>,
    connectivity_builds: usize,

    seeds: Vec<VertexId<I>>,
    policy: Option<MarchPolicy>,
    not_visited_value: f64,
    field_name: String,

    states: Vec<VertexState>,
    distances: Vec<f64>,
    order: Vec<VertexId<I>>,
    front: Front,

    iteration_index: usize,
    event_resolution: usize,
    progress: Progress,
    cancellation: Cancellation,
}

impl<I: MeshIndex> Default for FastMarching<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> fmt::Debug for FastMarching<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FastMarching")
            .field("configured", &self.policy.is_some())
            .field("vertices", &self.states.len())
            .field("seeds", &self.seeds)
            .field("iteration_index", &self.iteration_index)
            .field("event_resolution", &self.event_resolution)
            .finish_non_exhaustive()
    }
}

impl<I: MeshIndex> FastMarching<I> {
    /// Create an unconfigured engine.
    pub fn new() -> Self {
        Self {
            connectivity: None,
            cache: None,
            connectivity_builds: 0,
            seeds: Vec::new(),
            policy: None,
            not_visited_value: -1.0,
            field_name: DEFAULT_FIELD_NAME.to_string(),
            states: Vec::new(),
            distances: Vec::new(),
            order: Vec::new(),
            front: Front::default(),
            iteration_index: 0,
            event_resolution: DEFAULT_ITERATION_EVENT_RESOLUTION,
            progress: Progress::none(),
            cancellation: Cancellation::never(),
        }
    }

    /// Set the progress callback fired every [`iteration_event_resolution`](Self::iteration_event_resolution)
    /// finalized vertices.
    pub fn set_progress(&mut self, progress: Progress) {
        self.progress = progress;
    }

    /// Set the cancellation check polled once per candidate vertex.
    pub fn set_cancellation(&mut self, cancellation: Cancellation) {
        self.cancellation = cancellation;
    }

    /// Set how many finalized vertices separate progress events (at least 1).
    pub fn set_iteration_event_resolution(&mut self, resolution: usize) {
        self.event_resolution = resolution.max(1);
    }

    /// Number of finalized vertices between progress events.
    pub fn iteration_event_resolution(&self) -> usize {
        self.event_resolution
    }

    /// Total number of vertices finalized by this engine across all runs.
    pub fn iteration_index(&self) -> usize {
        self.iteration_index
    }

    /// Whether the engine holds a valid configuration.
    pub fn is_configured(&self) -> bool {
        self.policy.is_some()
    }

    /// How many times connectivity has been built.
    pub fn connectivity_builds(&self) -> usize {
        self.connectivity_builds
    }

    /// The cached connectivity, if any.
    pub fn connectivity(&self) -> Option<&TriangleConnectivity<I>> {
        self.connectivity.as_ref()
    }

    /// Configure a run.
    ///
    /// Rebuilds connectivity when `mesh` differs from the cached one or was
    /// modified since the last build, validates the seeds and installs the
    /// propagation policies. Non-fatal problems are returned and logged.
    ///
    /// # Errors
    ///
    /// - invalid mesh errors ([`MeshError::is_invalid_mesh`]) from building connectivity
    /// - [`MeshError::EmptySeeds`] or [`MeshError::SeedOutOfRange`]
    ///
    /// On error the engine is left unconfigured.
    pub fn configure(
        &mut self,
        mesh: &PolyMesh,
        seeds: &[VertexId<I>],
        options: FastMarchingOptions,
    ) -> Result<Vec<ConfigWarning>> {
        self.policy = None;
        self.seeds.clear();
        self.states.clear();
        self.distances.clear();
        self.order.clear();

        let n = self.ensure_connectivity(mesh)?;

        if seeds.is_empty() {
            return Err(MeshError::EmptySeeds);
        }
        if let Some(bad) = seeds.iter().find(|s| s.index() >= n) {
            return Err(MeshError::SeedOutOfRange {
                seed: bad.index(),
                vertex_count: n,
            });
        }

        let (policy, warnings) = build_policy(&options, n);
        for warning in &warnings {
            log::warn!("{}", warning);
        }

        let mut seen = HashSet::with_capacity(seeds.len());
        self.seeds = seeds.iter().copied().filter(|s| seen.insert(*s)).collect();
        self.policy = Some(policy);
        self.not_visited_value = options.not_visited_value;
        self.field_name = options.field_name;
        self.states = vec![VertexState::Far; n];
        self.distances = vec![f64::INFINITY; n];
        self.front = Front::with_capacity(n);

        Ok(warnings)
    }

    /// Build connectivity unless the cached one is current. Returns the vertex count.
    fn ensure_connectivity(&mut self, mesh: &PolyMesh) -> Result<usize> {
        let current = match (&self.connectivity, self.cache) {
            (Some(conn), Some(key)) => {
                key.mesh_id == mesh.id()
                    && key.built_at >= mesh.mtime()
                    && conn.num_vertices() == mesh.num_points()
            }
            _ => false,
        };

        if !current {
            self.connectivity = None;
            self.cache = None;

            let conn = TriangleConnectivity::build(mesh)?;
            log::debug!(
                "built connectivity: {} vertices, {} faces",
                conn.num_vertices(),
                conn.num_faces()
            );
            self.connectivity = Some(conn);
            self.cache = Some(CacheKey {
                mesh_id: mesh.id(),
                built_at: crate::mesh::next_stamp(),
            });
            self.connectivity_builds += 1;
        }

        Ok(mesh.num_points())
    }

    /// Run the march.
    ///
    /// Per-vertex state is reset first, so repeated calls give identical
    /// results. Reaching a stop criterion or being cancelled is a normal
    /// outcome; the distances finalized so far remain readable.
    ///
    /// # Errors
    ///
    /// [`MeshError::NotConfigured`] if no successful `configure` preceded the call.
    pub fn compute(&mut self) -> Result<MarchOutcome> {
        let (conn, policy) = match (&self.connectivity, &self.policy) {
            (Some(conn), Some(policy)) => (conn, policy),
            _ => return Err(MeshError::NotConfigured),
        };

        let n = conn.num_vertices();
        let mut run = March {
            conn,
            policy,
            states: &mut self.states,
            distances: &mut self.distances,
            order: &mut self.order,
            front: &mut self.front,
        };
        run.reset(n);

        for &seed in &self.seeds {
            run.seed(seed.index());
        }
        for &seed in &self.seeds {
            run.propagate_from(seed.index());
        }

        let outcome = loop {
            let Some((v, d)) = run.pop() else {
                break MarchOutcome::Completed;
            };

            if self.cancellation.is_cancelled() {
                break MarchOutcome::Cancelled;
            }
            if let Some(reason) = run.policy.stop_reason(v, d) {
                break MarchOutcome::Stopped(reason);
            }

            run.finalize(v);
            self.iteration_index += 1;
            if self.iteration_index % self.event_resolution == 0 {
                self.progress
                    .report(self.iteration_index, n, "fast marching");
            }

            run.propagate_from(v);
        };

        log::debug!(
            "fast marching finished: {:?}, {} of {} vertices finalized, {} queued entries left",
            outcome,
            self.order.len(),
            n,
            self.front.len()
        );

        Ok(outcome)
    }

    /// Extract the distance field and its statistics.
    ///
    /// Known vertices report their distance; all others report the
    /// configured not-visited value. Statistics are recomputed on each call.
    pub fn distance_field(&self) -> DistanceField {
        let mut values = Vec::with_capacity(self.states.len());
        let mut statistics = MarchStatistics::default();

        for (state, &d) in self.states.iter().zip(&self.distances) {
            if *state == VertexState::Known {
                statistics.visited += 1;
                statistics.max_distance = statistics.max_distance.max(d);
                values.push(d);
            } else {
                values.push(self.not_visited_value);
            }
        }

        DistanceField::new(
            self.field_name.clone(),
            values,
            self.not_visited_value,
            statistics,
        )
    }

    /// Maximum distance and number of visited vertices.
    pub fn statistics(&self) -> MarchStatistics {
        self.distance_field().statistics()
    }

    /// Propagation state of a vertex.
    ///
    /// # Panics
    /// Panics if the engine is unconfigured or `v` is out of range.
    pub fn state(&self, v: VertexId<I>) -> VertexState {
        self.states[v.index()]
    }

    /// Current distance estimate of a vertex (`+inf` if never reached).
    ///
    /// # Panics
    /// Panics if the engine is unconfigured or `v` is out of range.
    pub fn tentative_distance(&self, v: VertexId<I>) -> f64 {
        self.distances[v.index()]
    }

    /// Vertices in the order they were finalized, seeds first.
    pub fn finalization_order(&self) -> &[VertexId<I>] {
        &self.order
    }

    /// The deduplicated seeds of the current configuration.
    pub fn seeds(&self) -> &[VertexId<I>] {
        &self.seeds
    }
}

/// Translate options into policies, collecting warnings.
fn build_policy(options: &FastMarchingOptions, n: usize) -> (MarchPolicy, Vec<ConfigWarning>) {
    let mut warnings = Vec::new();
    let mut stops: Vec<Arc<dyn StopCriterion>> = Vec::new();
    let mut filters: Vec<Arc<dyn InsertionFilter>> = Vec::new();

    let check_range = |ids: &[usize], list: &'static str, warnings: &mut Vec<ConfigWarning>| {
        let count = ids.iter().filter(|&&id| id >= n).count();
        if count > 0 {
            warnings.push(ConfigWarning::IdsOutOfRange { list, count });
        }
    };

    match options.distance_stop {
        Some(d) if d > 0.0 => stops.push(Arc::new(DistanceStop::new(d))),
        Some(d) => warnings.push(ConfigWarning::InactiveDistanceStop { value: d }),
        None => {}
    }

    if let Some(ids) = options.destinations.as_deref().filter(|ids| !ids.is_empty()) {
        check_range(ids, "destination", &mut warnings);
        stops.push(Arc::new(DestinationStop::new(ids.iter().copied())));
    }

    if let Some(ids) = options.exclusion.as_deref().filter(|ids| !ids.is_empty()) {
        check_range(ids, "exclusion", &mut warnings);
        filters.push(Arc::new(ExclusionFilter::new(ids.iter().copied())));
    }

    stops.extend(options.stop_criteria.iter().cloned());
    filters.extend(options.insertion_filters.iter().cloned());

    let weight: Box<dyn PropagationWeight> = match &options.weights {
        Some(w) if w.len() == n => {
            if let Some((vertex, &weight)) = w
                .iter()
                .enumerate()
                .find(|&(_, &x)| !(x.is_finite() && x > 0.0))
            {
                warnings.push(ConfigWarning::NonPositiveWeight { vertex, weight });
            }
            Box::new(VertexWeights::new(w.clone()))
        }
        Some(w) => {
            warnings.push(ConfigWarning::WeightLengthMismatch {
                expected: n,
                actual: w.len(),
            });
            Box::new(UniformWeight)
        }
        None => Box::new(UniformWeight),
    };

    (MarchPolicy { stops, filters, weight }, warnings)
}

/// Borrowed view of the engine state for one run.
struct March<'a, I: MeshIndex> {
    conn: &'a TriangleConnectivity<I>,
    policy: &'a MarchPolicy,
    states: &'a mut Vec<VertexState>,
    distances: &'a mut Vec<f64>,
    order: &'a mut Vec<VertexId<I>>,
    front: &'a mut Front,
}

impl<'a, I: MeshIndex> March<'a, I> {
    fn reset(&mut self, n: usize) {
        self.states.clear();
        self.states.resize(n, VertexState::Far);
        self.distances.clear();
        self.distances.resize(n, f64::INFINITY);
        self.order.clear();
        self.front.clear();
    }

    fn pop(&mut self) -> Option<(usize, f64)> {
        self.front.pop(self.states.as_slice(), self.distances.as_slice())
    }

    fn seed(&mut self, v: usize) {
        self.distances[v] = 0.0;
        self.finalize(v);
    }

    fn finalize(&mut self, v: usize) {
        self.states[v] = VertexState::Known;
        self.order.push(VertexId::new(v));
    }

    /// Update every non-known neighbor of the just-finalized vertex `v`
    /// through each triangle incident to `v`.
    fn propagate_from(&mut self, v: usize) {
        let conn = self.conn;
        let vid = VertexId::<I>::new(v);
        let floor = self.distances[v];

        for &f in conn.vertex_faces(vid) {
            let Some((p, q)) = conn.opposite_vertices(f, vid) else {
                continue;
            };
            self.update(p, vid, q, floor);
            self.update(q, vid, p, floor);
        }
    }

    /// Recompute the distance of `c` from triangle (`c`, `known`, `other`).
    fn update(&mut self, c: VertexId<I>, known: VertexId<I>, other: VertexId<I>, floor: f64) {
        let ci = c.index();
        if self.states[ci] == VertexState::Known {
            return;
        }

        let weight = self.policy.weight(ci);
        let pc = self.conn.position(c);
        let pk = self.conn.position(known);
        let tk = self.distances[known.index()];

        let estimate = if self.states[other.index()] == VertexState::Known {
            let po = self.conn.position(other);
            two_neighbor(pc, pk, tk, po, self.distances[other.index()], weight)
        } else {
            single_neighbor(pc, pk, tk, weight)
        };
        // Keeps finalization order monotone under rounding
        let estimate = estimate.max(floor);

        if estimate >= self.distances[ci] {
            return;
        }

        if self.states[ci] == VertexState::Far {
            if !self.policy.admits(ci, estimate) {
                return;
            }
            self.states[ci] = VertexState::Trial;
        }

        self.distances[ci] = estimate;
        self.front.push(ci, estimate);
    }
}
