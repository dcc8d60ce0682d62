//! `ca-core` — foundational types for the `rust_ca` traffic simulator.
//!
//! This crate is a dependency of every other `ca-*` crate.  It intentionally
//! has no `ca-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module       | Contents                                            |
//! |--------------|-----------------------------------------------------|
//! | [`ids`]      | `VehicleId`, `Rank`, `LaneId`                       |
//! | [`time`]     | `Tick`                                              |
//! | [`config`]   | `SimConfig` — the broadcast configuration record    |
//! | [`rng`]      | `WorkerRng` (per-worker deterministic RNG)          |
//! | [`error`]    | `CaError`, `CaResult`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                   |
//! |---------|----------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.      |

pub mod config;
pub mod error;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::SimConfig;
pub use error::{CaError, CaResult};
pub use ids::{LaneId, Rank, VehicleId};
pub use rng::WorkerRng;
pub use time::Tick;
