use std::cmp::Ordering;

/// Heap entry for a search vertex
#[derive(Copy, Clone, Debug, PartialEq)]
pub(super) struct State {
    pub(super) cost: f64,
    pub(super) vertex: usize,
}

impl Eq for State {}

// Min-heap by cost, then by vertex id, so equal costs pop in a stable order
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
