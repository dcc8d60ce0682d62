//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `tick_summaries.csv`
//! - `travel_times.csv`
//!
//! In a multi-worker run each rank needs its own directory (the launcher
//! composes one per rank); the rank column makes merged analysis easy.

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::row::{TickRow, TravelTimeRow};
use crate::writer::OutputWriter;
use crate::OutputResult;

/// Writes simulation output to two CSV files.
pub struct CsvWriter {
    ticks: Writer<File>,
    travel_times: Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Open (or create) the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut ticks = Writer::from_path(dir.join("tick_summaries.csv"))?;
        ticks.write_record([
            "tick", "rank", "owned", "spawned", "sent", "received", "finished",
        ])?;

        let mut travel_times = Writer::from_path(dir.join("travel_times.csv"))?;
        travel_times.write_record(["vehicle_id", "finished_tick", "travel_time_secs"])?;

        Ok(Self {
            ticks,
            travel_times,
            finished: false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_tick(&mut self, row: &TickRow) -> OutputResult<()> {
        self.ticks.write_record(&[
            row.tick.to_string(),
            row.rank.to_string(),
            row.owned.to_string(),
            row.spawned.to_string(),
            row.sent.to_string(),
            row.received.to_string(),
            row.finished.to_string(),
        ])?;
        Ok(())
    }

    fn write_travel_time(&mut self, row: &TravelTimeRow) -> OutputResult<()> {
        self.travel_times.write_record(&[
            row.vehicle_id.to_string(),
            row.finished_tick.to_string(),
            row.travel_time_secs.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.ticks.flush()?;
        self.travel_times.flush()?;
        Ok(())
    }
}
