//! `SimOutputObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use ca_core::{Rank, Tick, VehicleId};
use ca_sim::{SimObserver, TickStats};
use ca_stats::Statistic;

use crate::row::{TickRow, TravelTimeRow};
use crate::writer::OutputWriter;
use crate::OutputError;

/// A [`SimObserver`] that writes tick summaries and completed journeys to
/// any [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver`
/// methods have no return value.  After `worker.run()` returns, check for
/// errors with [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer: W,
    rank: Rank,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    /// Create an observer backed by `writer` for the worker at `rank`.
    pub fn new(writer: W, rank: Rank) -> Self {
        Self {
            writer,
            rank,
            last_error: None,
        }
    }

    /// Take the stored write error (if any) after the run.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: crate::OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_tick_end(&mut self, tick: Tick, stats: &TickStats) {
        let row = TickRow {
            tick: tick.0,
            rank: self.rank.0,
            owned: stats.owned as u64,
            spawned: stats.spawned as u64,
            sent: stats.sent as u64,
            received: stats.received as u64,
            finished: stats.finished as u64,
        };
        let result = self.writer.write_tick(&row);
        self.store_err(result);
    }

    fn on_vehicle_finished(&mut self, id: VehicleId, travel_time: f64, tick: Tick) {
        let row = TravelTimeRow {
            vehicle_id: id.0,
            finished_tick: tick.0,
            travel_time_secs: travel_time,
        };
        let result = self.writer.write_travel_time(&row);
        self.store_err(result);
    }

    fn on_sim_end(&mut self, _final_tick: Tick, _travel_time: &Statistic) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
