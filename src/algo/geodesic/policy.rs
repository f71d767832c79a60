//! Propagation policies for fast marching.
//!
//! The marching loop consults three strategies:
//!
//! - a [`StopCriterion`] before a candidate vertex is finalized,
//! - an [`InsertionFilter`] before a vertex enters the front,
//! - a [`PropagationWeight`] when a vertex's tentative distance is updated.
//!
//! The built-in implementations cover the distance threshold, destination
//! set, exclusion set and per-vertex weights. Callers can add their own stop
//! criteria and insertion filters through
//! [`FastMarchingOptions`](super::FastMarchingOptions).

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Why a march ended before the front was exhausted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StopReason {
    /// The next candidate reached the distance threshold.
    DistanceReached {
        /// The configured threshold.
        threshold: f64,
        /// Tentative distance of the rejected candidate.
        distance: f64,
    },
    /// A destination vertex came up for finalization.
    DestinationReached {
        /// The destination vertex.
        vertex: usize,
    },
    /// A caller-supplied criterion fired.
    Custom {
        /// The candidate vertex that triggered the stop.
        vertex: usize,
    },
}

/// Decides whether marching ends before a candidate is finalized.
pub trait StopCriterion: Send + Sync {
    /// Inspect the candidate about to become known.
    ///
    /// Returning `Some` stops the march; the candidate stays in the front.
    fn check(&self, vertex: usize, distance: f64) -> Option<StopReason>;
}

/// Decides whether a vertex may enter the front.
pub trait InsertionFilter: Send + Sync {
    /// Return `false` to keep the vertex out of the front.
    fn accept(&self, vertex: usize, distance: f64) -> bool;
}

/// Per-vertex multiplier on local traversal cost.
pub trait PropagationWeight: Send + Sync {
    /// Weight at a vertex. Must be positive for the march to be meaningful.
    fn weight(&self, vertex: usize) -> f64;
}

/// Stop once the front reaches a distance.
#[derive(Debug, Clone, Copy)]
pub struct DistanceStop {
    threshold: f64,
}

impl DistanceStop {
    /// Create a threshold stop.
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl StopCriterion for DistanceStop {
    fn check(&self, _vertex: usize, distance: f64) -> Option<StopReason> {
        (distance >= self.threshold).then_some(StopReason::DistanceReached {
            threshold: self.threshold,
            distance,
        })
    }
}

/// Stop once any vertex of a set comes up for finalization.
#[derive(Debug, Clone)]
pub struct DestinationStop {
    targets: HashSet<usize>,
}

impl DestinationStop {
    /// Create a destination stop.
    pub fn new<T: IntoIterator<Item = usize>>(targets: T) -> Self {
        Self {
            targets: targets.into_iter().collect(),
        }
    }
}

impl StopCriterion for DestinationStop {
    fn check(&self, vertex: usize, _distance: f64) -> Option<StopReason> {
        self.targets
            .contains(&vertex)
            .then_some(StopReason::DestinationReached { vertex })
    }
}

/// Keep a set of vertices out of the front.
#[derive(Debug, Clone)]
pub struct ExclusionFilter {
    excluded: HashSet<usize>,
}

impl ExclusionFilter {
    /// Create an exclusion filter.
    pub fn new<T: IntoIterator<Item = usize>>(excluded: T) -> Self {
        Self {
            excluded: excluded.into_iter().collect(),
        }
    }
}

impl InsertionFilter for ExclusionFilter {
    fn accept(&self, vertex: usize, _distance: f64) -> bool {
        !self.excluded.contains(&vertex)
    }
}

/// Weight 1 everywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformWeight;

impl PropagationWeight for UniformWeight {
    #[inline]
    fn weight(&self, _vertex: usize) -> f64 {
        1.0
    }
}

/// Weights read from a dense per-vertex array.
#[derive(Debug, Clone)]
pub struct VertexWeights {
    weights: Vec<f64>,
}

impl VertexWeights {
    /// Wrap a weight array.
    pub fn new(weights: Vec<f64>) -> Self {
        Self { weights }
    }
}

impl PropagationWeight for VertexWeights {
    #[inline]
    fn weight(&self, vertex: usize) -> f64 {
        self.weights[vertex]
    }
}

/// The policies in effect for one configured march.
pub(crate) struct MarchPolicy {
    pub(crate) stops: Vec<Arc<dyn StopCriterion>>,
    pub(crate) filters: Vec<Arc<dyn InsertionFilter>>,
    pub(crate) weight: Box<dyn PropagationWeight>,
}

impl MarchPolicy {
    /// First stop reason reported by the registered criteria, in order.
    pub(crate) fn stop_reason(&self, vertex: usize, distance: f64) -> Option<StopReason> {
        self.stops.iter().find_map(|s| s.check(vertex, distance))
    }

    /// Whether every filter admits the vertex.
    pub(crate) fn admits(&self, vertex: usize, distance: f64) -> bool {
        self.filters.iter().all(|f| f.accept(vertex, distance))
    }

    #[inline]
    pub(crate) fn weight(&self, vertex: usize) -> f64 {
        self.weight.weight(vertex)
    }
}

impl fmt::Debug for MarchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarchPolicy")
            .field("stops", &self.stops.len())
            .field("filters", &self.filters.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_stop() {
        let stop = DistanceStop::new(2.0);
        assert!(stop.check(0, 1.99).is_none());
        assert!(matches!(
            stop.check(0, 2.0),
            Some(StopReason::DistanceReached { threshold, .. }) if threshold == 2.0
        ));
    }

    #[test]
    fn test_destination_stop() {
        let stop = DestinationStop::new([4, 9]);
        assert!(stop.check(3, 0.0).is_none());
        assert_eq!(
            stop.check(9, 5.0),
            Some(StopReason::DestinationReached { vertex: 9 })
        );
    }

    #[test]
    fn test_policy_order() {
        let policy = MarchPolicy {
            stops: vec![Arc::new(DistanceStop::new(1.0)), Arc::new(DestinationStop::new([2]))],
            filters: vec![Arc::new(ExclusionFilter::new([5]))],
            weight: Box::new(UniformWeight),
        };

        // Both criteria fire; the threshold is listed first and wins.
        assert!(matches!(
            policy.stop_reason(2, 3.0),
            Some(StopReason::DistanceReached { .. })
        ));
        assert_eq!(
            policy.stop_reason(2, 0.5),
            Some(StopReason::DestinationReached { vertex: 2 })
        );

        assert!(!policy.admits(5, 0.0));
        assert!(policy.admits(4, 0.0));
        assert_eq!(policy.weight(7), 1.0);
    }

    #[test]
    fn test_vertex_weights() {
        let w = VertexWeights::new(vec![1.0, 2.5]);
        assert_eq!(w.weight(1), 2.5);
    }
}
