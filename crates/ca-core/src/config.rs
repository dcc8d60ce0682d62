//! The simulation configuration record.
//!
//! Loaded from disk by the launcher on worker 0, validated, then broadcast
//! verbatim to every rank before the first tick.  Read-only thereafter.

use crate::{CaError, CaResult, Tick};

/// Top-level simulation configuration.
///
/// All distance-like options are in road cells, all time-like options in
/// ticks.  `step_size` converts a tick count into physical seconds when
/// travel times are reported.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Number of lanes.  The model is fixed at 2; any other value fails
    /// validation.
    pub num_lanes: u32,

    /// Global road length in cells.  Cells are indexed `0..length`.
    pub length: u32,

    /// Speed cap applied to every spawned vehicle, in cells per tick.
    pub max_speed: u32,

    /// Forward gap lookup cap on the vehicle's own lane, in cells.
    pub look_forward: u32,

    /// Forward gap lookup cap on the opposite lane, in cells.
    pub look_other_forward: u32,

    /// Backward gap lookup cap on the opposite lane, in cells.  Doubles as
    /// the safety distance a lane switch must leave behind.
    pub look_other_backward: u32,

    /// Probability of the random deceleration in the move rule.
    pub prob_slow_down: f64,

    /// Probability that an advantageous lane switch is actually taken.
    pub prob_change: f64,

    /// Total ticks to simulate.
    pub max_time: u64,

    /// Physical seconds represented by one tick.
    pub step_size: f64,

    /// Ticks at the start of the run whose vehicle finishes are excluded
    /// from the travel-time statistic.
    pub warmup_time: u64,

    /// Master RNG seed.  Each worker derives its own stream from this and
    /// its rank.
    pub seed: u64,
}

impl SimConfig {
    /// The tick at which the simulation ends (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.max_time)
    }

    /// Check the option ranges the rest of the system relies on.
    ///
    /// Called on worker 0 before the broadcast so a bad file aborts the run
    /// before any worker starts ticking.
    pub fn validate(&self) -> CaResult<()> {
        if self.num_lanes != 2 {
            return Err(CaError::Config(format!(
                "num_lanes must be 2, got {}",
                self.num_lanes
            )));
        }
        if self.length == 0 {
            return Err(CaError::Config("length must be positive".into()));
        }
        if self.max_speed == 0 {
            return Err(CaError::Config("max_speed must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.prob_slow_down) {
            return Err(CaError::Config(format!(
                "prob_slow_down must be in [0, 1], got {}",
                self.prob_slow_down
            )));
        }
        if !(0.0..=1.0).contains(&self.prob_change) {
            return Err(CaError::Config(format!(
                "prob_change must be in [0, 1], got {}",
                self.prob_change
            )));
        }
        if self.step_size <= 0.0 {
            return Err(CaError::Config(format!(
                "step_size must be positive, got {}",
                self.step_size
            )));
        }
        Ok(())
    }
}

impl Default for SimConfig {
    /// A small but valid configuration, sized for unit tests.
    fn default() -> Self {
        Self {
            num_lanes: 2,
            length: 100,
            max_speed: 5,
            look_forward: 8,
            look_other_forward: 8,
            look_other_backward: 5,
            prob_slow_down: 0.2,
            prob_change: 0.5,
            max_time: 100,
            step_size: 1.0,
            warmup_time: 0,
            seed: 42,
        }
    }
}
