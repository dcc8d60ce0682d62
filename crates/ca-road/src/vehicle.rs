//! The vehicle: kinematic state plus the local cellular-automaton rules.

use ca_core::{LaneId, SimConfig, VehicleId, WorkerRng};

use crate::{NeighborView, Road};

/// One vehicle and its behavioral parameters.
///
/// The three `gap_*` fields are derived inputs to the current tick's rules:
/// they are recomputed by [`update_gaps`][Vehicle::update_gaps] before each
/// decision sweep and carry no meaning across ticks.
#[derive(Clone, Debug, PartialEq)]
pub struct Vehicle {
    /// Stable identity, allocated by worker 0 at spawn.
    pub id: VehicleId,
    /// The lane this vehicle currently drives on.
    pub lane: LaneId,
    /// Global cell index.
    pub position: u32,
    /// Current speed in cells per tick, always `<= max_speed`.
    pub speed: u32,
    pub max_speed: u32,
    /// Forward gap lookup cap on the own lane.
    pub look_forward: u32,
    /// Forward gap lookup cap on the opposite lane.
    pub look_other_forward: u32,
    /// Backward lookup cap on the opposite lane; also the safety distance a
    /// switch must leave behind.
    pub look_other_backward: u32,
    pub prob_slow_down: f64,
    pub prob_change: f64,
    /// Ticks since this vehicle entered the road, carried across hand-offs.
    pub time_on_road: u32,

    // Derived per tick, not carried across ticks.
    pub gap_forward: u32,
    pub gap_other_forward: u32,
    pub gap_other_backward: u32,
}

impl Vehicle {
    /// A fresh vehicle entering the road, with behavioral parameters drawn
    /// from the configuration.
    pub fn new(id: VehicleId, lane: LaneId, position: u32, speed: u32, config: &SimConfig) -> Self {
        Self {
            id,
            lane,
            position,
            speed: speed.min(config.max_speed),
            max_speed: config.max_speed,
            look_forward: config.look_forward,
            look_other_forward: config.look_other_forward,
            look_other_backward: config.look_other_backward,
            prob_slow_down: config.prob_slow_down,
            prob_change: config.prob_change,
            time_on_road: 0,
            gap_forward: 0,
            gap_other_forward: 0,
            gap_other_backward: 0,
        }
    }

    /// The speed this vehicle would like to reach this tick.
    #[inline]
    fn desired_step(&self) -> u32 {
        (self.speed + 1).min(self.max_speed)
    }

    // ── Rule 1: gap computation ───────────────────────────────────────────

    /// Recompute `gap_forward`, `gap_other_forward`, and `gap_other_backward`
    /// against the partition's cell map and the tick's ghost positions.
    pub fn update_gaps(&mut self, road: &Road, ghosts: &NeighborView) {
        self.gap_forward = gap_ahead(
            road,
            self.lane,
            self.position,
            self.look_forward,
            ghosts.last(self.lane),
        );
        let other = self.lane.other();
        self.gap_other_forward = gap_ahead(
            road,
            other,
            self.position,
            self.look_other_forward,
            ghosts.last(other),
        );
        self.gap_other_backward = gap_behind(
            road,
            other,
            self.position,
            self.look_other_backward,
            ghosts.first(other),
        );
    }

    // ── Rule 2: lane switch decision ──────────────────────────────────────

    /// Decide whether to move to the other lane this tick.
    ///
    /// The switch is advantageous when the own-lane gap blocks the desired
    /// speed step, the other lane offers strictly more room ahead, and the
    /// safety distance behind on the other lane is clear; an advantageous
    /// switch is then taken with probability `prob_change`.  The target cell
    /// must be free — the actual cell-map claim happens in
    /// [`Partition::switch_lane`][crate::Partition::switch_lane], which
    /// re-checks it.
    pub fn wants_lane_switch(&self, road: &Road, rng: &mut WorkerRng) -> bool {
        if road.cell_occupied(self.lane.other(), self.position) {
            return false;
        }
        if self.gap_forward >= self.desired_step() {
            return false;
        }
        if self.gap_other_forward <= self.gap_forward {
            return false;
        }
        if self.gap_other_backward < self.look_other_backward {
            return false;
        }
        rng.gen_bool(self.prob_change)
    }

    // ── Rule 3: Nagel–Schreckenberg move ──────────────────────────────────

    /// Apply the accelerate / brake / randomize / advance sequence.
    ///
    /// Updates `speed` and `position`, increments `time_on_road`, and returns
    /// the new position.  Classifying the new position (still inside the
    /// partition, past `road_end`, or off the global road) is the partition
    /// owner's job — this rule knows nothing about worker boundaries.
    pub fn advance(&mut self, rng: &mut WorkerRng) -> u32 {
        self.speed = (self.speed + 1).min(self.max_speed);
        self.speed = self.speed.min(self.gap_forward);
        if rng.gen_bool(self.prob_slow_down) {
            self.speed = self.speed.saturating_sub(1);
        }
        self.position += self.speed;
        self.time_on_road += 1;
        self.position
    }

    /// Travel time in physical seconds, the sample recorded when this
    /// vehicle leaves the road.
    #[inline]
    pub fn travel_time(&self, step_size: f64) -> f64 {
        self.time_on_road as f64 * step_size
    }
}

// ── Gap helpers ───────────────────────────────────────────────────────────────

/// Empty cells ahead of `pos` on `lane` before the nearest blocker, capped at
/// `cap`.
///
/// Blocker discovery order: the partition's own cells first; then, if the
/// lookup window runs past the segment's downstream edge, the ghost position
/// (`None` ghost = empty out to the cap).
fn gap_ahead(road: &Road, lane: LaneId, pos: u32, cap: u32, ghost: Option<u32>) -> u32 {
    if let Some(blocker) = road.lane(lane).scan_forward(pos, cap) {
        return blocker - pos - 1;
    }
    if pos + cap > road.end() {
        if let Some(g) = ghost {
            return g.saturating_sub(pos + 1).min(cap);
        }
    }
    cap
}

/// Empty cells behind `pos` on `lane` before the nearest blocker, capped at
/// `cap`.  Symmetric with [`gap_ahead`], consulting the upstream ghost when
/// the window runs past the segment's upstream edge.
fn gap_behind(road: &Road, lane: LaneId, pos: u32, cap: u32, ghost: Option<u32>) -> u32 {
    if let Some(blocker) = road.lane(lane).scan_backward(pos, cap) {
        return pos - blocker - 1;
    }
    if pos < road.start() + cap {
        if let Some(g) = ghost {
            return pos.saturating_sub(g + 1).min(cap);
        }
    }
    cap
}
