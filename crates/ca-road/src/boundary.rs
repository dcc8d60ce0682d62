//! Per-tick ghost inputs: the nearest neighbor vehicle on each lane.
//!
//! The rule evaluator never reaches into neighbor state.  Instead, the step
//! protocol's boundary exchange distills each neighbor into one position per
//! lane and hands the result to every `update_gaps` call as a plain value.

use ca_core::LaneId;

/// The ghost positions a worker holds for the current tick.
///
/// `first[lane]` is the *upstream* neighbor's tail-most (highest-position)
/// vehicle — the blocker for backward lookups that run past `road_start`.
/// `last[lane]` is the *downstream* neighbor's head-most (lowest-position)
/// vehicle — the blocker for forward lookups that run past `road_end`.
/// `None` means "empty as far as anyone knows" (the `−1` wire sentinel), and
/// chains of empty workers propagate their neighbor's value so these are
/// road-global answers, not merely adjacent-worker ones.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct NeighborView {
    pub first: [Option<u32>; 2],
    pub last: [Option<u32>; 2],
}

impl NeighborView {
    /// A view with no neighbors on either side (single-worker runs, tests).
    pub const EMPTY: NeighborView = NeighborView {
        first: [None, None],
        last: [None, None],
    };

    /// Upstream tail-most vehicle position on `lane`.
    #[inline]
    pub fn first(&self, lane: LaneId) -> Option<u32> {
        self.first[lane.index()]
    }

    /// Downstream head-most vehicle position on `lane`.
    #[inline]
    pub fn last(&self, lane: LaneId) -> Option<u32> {
        self.last[lane.index()]
    }
}
