//! `ca-stats` — the streaming travel-time accumulator.
//!
//! One `Statistic` lives on every worker; vehicles record their travel time
//! on the worker where they leave the road.  At the end of the run the
//! non-aggregator workers ship their raw samples to the aggregator, which
//! absorbs them before reporting — so the raw sequence is retained alongside
//! the running moments.

pub mod statistic;


pub use statistic::Statistic;
