//! The marching front: per-vertex state and a min-ordered priority queue.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Propagation state of a vertex during a march.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VertexState {
    /// Not reached yet.
    #[default]
    Far,
    /// In the front with a tentative distance.
    Trial,
    /// Finalized; its distance never changes again.
    Known,
}

/// Entry in the front's priority queue.
#[derive(Debug, Clone, Copy)]
struct FrontEntry {
    vertex: usize,
    distance: f64,
}

impl PartialEq for FrontEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontEntry {}

impl PartialOrd for FrontEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap behavior; equal distances pop the smaller id first.
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

/// Min-priority queue of trial vertices with lazy deletion.
///
/// Decreasing a key pushes a fresh entry; outdated entries are discarded
/// when they surface.
#[derive(Debug, Default)]
pub(crate) struct Front {
    heap: BinaryHeap<FrontEntry>,
}

impl Front {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.heap.clear();
    }

    pub(crate) fn push(&mut self, vertex: usize, distance: f64) {
        self.heap.push(FrontEntry { vertex, distance });
    }

    /// Pop the trial vertex with the smallest tentative distance.
    pub(crate) fn pop(&mut self, states: &[VertexState], distances: &[f64]) -> Option<(usize, f64)> {
        while let Some(entry) = self.heap.pop() {
            // Skip finalized vertices and entries superseded by a smaller key
            if states[entry.vertex] != VertexState::Trial || entry.distance > distances[entry.vertex] {
                continue;
            }
            return Some((entry.vertex, entry.distance));
        }
        None
    }

    /// Number of queued entries, stale ones included.
    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pops_in_distance_order() {
        let states = vec![VertexState::Trial; 3];
        let distances = vec![2.0, 0.5, 1.0];
        let mut front = Front::default();
        for (v, &d) in distances.iter().enumerate() {
            front.push(v, d);
        }

        assert_eq!(front.pop(&states, &distances), Some((1, 0.5)));
        assert_eq!(front.pop(&states, &distances), Some((2, 1.0)));
        assert_eq!(front.pop(&states, &distances), Some((0, 2.0)));
        assert_eq!(front.pop(&states, &distances), None);
    }

    #[test]
    fn test_ties_break_by_vertex_id() {
        let states = vec![VertexState::Trial; 4];
        let distances = vec![1.0; 4];
        let mut front = Front::default();
        for v in [3, 0, 2, 1] {
            front.push(v, 1.0);
        }

        let order: Vec<usize> = std::iter::from_fn(|| front.pop(&states, &distances))
            .map(|(v, _)| v)
            .collect();
        assert_eq!(order, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_skips_stale_entries() {
        let mut states = vec![VertexState::Trial; 2];
        let mut distances = vec![3.0, 5.0];
        let mut front = Front::with_capacity(4);
        front.push(0, 3.0);
        front.push(1, 5.0);

        // Vertex 1 improves; its old entry becomes stale.
        distances[1] = 1.0;
        front.push(1, 1.0);
        assert_eq!(front.len(), 3);

        assert_eq!(front.pop(&states, &distances), Some((1, 1.0)));
        states[1] = VertexState::Known;
        assert_eq!(front.pop(&states, &distances), Some((0, 3.0)));
        states[0] = VertexState::Known;
        assert_eq!(front.pop(&states, &distances), None);
    }
}
