//! `ca-road` — the spatial model: lanes, the two-lane road, and the
//! per-worker partition that owns the vehicles inside it.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                      |
//! |---------------|---------------------------------------------------------------|
//! | [`vehicle`]   | `Vehicle` — kinematic state + the local CA update rules       |
//! | [`lane`]      | `Lane` — one cell row with gap scans                          |
//! | [`road`]      | `Road` — exactly two lanes over one partition's cell range    |
//! | [`partition`] | `Partition` — the vehicle arena and cell-map bookkeeping      |
//! | [`boundary`]  | `NeighborView` — per-tick ghost positions from both neighbors |
//! | [`error`]     | `RoadError`, `RoadResult<T>`                                  |
//!
//! # Ownership model
//!
//! The partition's `SlotMap` arena is the sole owner of every `Vehicle`;
//! lanes hold `VehicleKey`s, not references.  A lane switch is a key move
//! between the two cell rows, and a hand-off is `extract` (key freed, vehicle
//! returned by value for serialization) on the sender paired with `spawn`
//! (fresh key) on the receiver.

use slotmap::new_key_type;

pub mod boundary;
pub mod error;
pub mod lane;
pub mod partition;
pub mod road;
pub mod vehicle;

#[cfg(test)]
mod tests;

new_key_type! {
    /// Arena key for a vehicle owned by one partition.  Only meaningful
    /// within that partition; the stable cross-worker identity is
    /// [`ca_core::VehicleId`].
    pub struct VehicleKey;
}

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use boundary::NeighborView;
pub use error::{RoadError, RoadResult};
pub use lane::Lane;
pub use partition::Partition;
pub use road::Road;
pub use vehicle::Vehicle;
