//! The backend-agnostic writer trait.

use crate::row::{TickRow, TravelTimeRow};
use crate::OutputResult;

/// A sink for simulation output rows.
///
/// Implementations buffer as they like; `finish` must flush everything and
/// be safe to call more than once.
pub trait OutputWriter {
    fn write_tick(&mut self, row: &TickRow) -> OutputResult<()>;

    fn write_travel_time(&mut self, row: &TravelTimeRow) -> OutputResult<()>;

    fn finish(&mut self) -> OutputResult<()>;
}
