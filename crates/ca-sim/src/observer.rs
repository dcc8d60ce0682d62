//! Simulation observer hooks for progress reporting and data collection.

use std::fmt;

use ca_core::{LaneId, Tick, VehicleId};
use ca_stats::Statistic;

/// Per-tick counters reported through [`SimObserver::on_tick_end`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Vehicles owned by this worker at the end of the tick.
    pub owned: usize,
    /// Vehicles admitted at the inflow this tick (worker 0 only).
    pub spawned: usize,
    /// Hand-off vehicles sent downstream this tick (multi-hop resends count).
    pub sent: usize,
    /// Hand-off vehicles received from upstream this tick.
    pub received: usize,
    /// Vehicles that left the global road on this worker this tick.
    pub finished: usize,
}

/// Why a defensive path dropped something without failing the tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiscardReason {
    /// A received message had the wrong kind for this protocol point.
    UnexpectedMessage {
        want: &'static str,
        got: &'static str,
    },
    /// A hand-off arrived with a lane index outside {0, 1}.
    BadLaneIndex(u8),
    /// A hand-off record failed to decode.
    MalformedPayload(String),
    /// A spawn or hand-off placement hit an occupied cell.
    CellOccupied { lane: LaneId, position: u32 },
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscardReason::UnexpectedMessage { want, got } => {
                write!(f, "expected {want}, got {got}")
            }
            DiscardReason::BadLaneIndex(i) => write!(f, "lane index {i} out of range"),
            DiscardReason::MalformedPayload(e) => write!(f, "malformed payload: {e}"),
            DiscardReason::CellOccupied { lane, position } => {
                write!(f, "cell ({lane}, {position}) occupied")
            }
        }
    }
}

/// Callbacks invoked by [`Worker::run`][crate::Worker::run] at key points in
/// the tick loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example — progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl SimObserver for ProgressPrinter {
///     fn on_tick_end(&mut self, tick: Tick, stats: &TickStats) {
///         if tick.0 % self.interval == 0 {
///             println!("{tick}: {} vehicles owned", stats.owned);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before the boundary exchange.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called at the end of each tick, just before the closing barrier.
    fn on_tick_end(&mut self, _tick: Tick, _stats: &TickStats) {}

    /// Called when worker 0 admits a new vehicle at the inflow.
    fn on_vehicle_spawned(&mut self, _id: VehicleId, _lane: LaneId, _tick: Tick) {}

    /// Called when a vehicle drives off the end of the global road.
    ///
    /// Fires on every exit, including those excluded from the statistic by
    /// the warm-up filter or by exiting on a non-aggregator worker.
    fn on_vehicle_finished(&mut self, _id: VehicleId, _travel_time: f64, _tick: Tick) {}

    /// Called when a defensive path drops a message or a vehicle placement.
    fn on_discard(&mut self, _reason: &DiscardReason) {}

    /// Called once after the final tick and the statistics gather.
    ///
    /// On the aggregator (last rank), `travel_time` holds the merged
    /// statistic of the whole run; elsewhere it holds the local samples
    /// that were shipped away.
    fn on_sim_end(&mut self, _final_tick: Tick, _travel_time: &Statistic) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want progress callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
