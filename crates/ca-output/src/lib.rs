//! `ca-output` — simulation output writers.
//!
//! A [`SimOutputObserver`] bridges the simulation's observer hooks to any
//! [`OutputWriter`] backend.  The stock backend is CSV:
//!
//! | File                 | One row per                                |
//! |----------------------|--------------------------------------------|
//! | `tick_summaries.csv` | tick (owned/spawned/sent/received counts)  |
//! | `travel_times.csv`   | vehicle leaving the road                   |
//!
//! # Usage
//!
//! ```rust,ignore
//! use ca_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = SimOutputObserver::new(writer, worker.partition().rank());
//! worker.run(&mut obs)?;
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;


pub use self::csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{TickRow, TravelTimeRow};
pub use writer::OutputWriter;
