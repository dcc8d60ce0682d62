//! `ca-sim` — the distributed step protocol.
//!
//! # The five-phase tick
//!
//! ```text
//! for tick in 0..config.max_time, on every worker:
//!   Ⓐ Boundary exchange — learn the neighbors' nearest vehicle per lane
//!      (ghost info), with empty workers forwarding their neighbor's value.
//!   Ⓑ Local update     — four sweeps in insertion order:
//!                          gaps → lane switches → gaps → moves.
//!                        Finished vehicles retire; boundary crossers are
//!                        staged for hand-off.
//!   Ⓒ Hand-off         — loop until a global all-reduce of outbound sizes
//!                        reaches zero: send admissible crossers downstream
//!                        (overtaking-safety gate), absorb arrivals from
//!                        upstream, re-stage arrivals that are still past
//!                        this worker's end.
//!   Ⓓ Spawn            — worker 0 admits new vehicles at the entry cells,
//!                        treating the downstream ghost as an occupied cell.
//!   Ⓔ Barrier          — no worker starts tick t+1 before all finish t.
//! ```
//!
//! After the last tick, every non-aggregator worker ships its raw travel-time
//! samples to the last rank, which absorbs them and reports.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                |
//! |--------------|---------------------------------------------------------|
//! | [`worker`]   | `Worker` — per-rank state and the tick loop (Ⓑ Ⓓ Ⓔ)    |
//! | [`ghost`]    | Phase Ⓐ: the boundary exchange                          |
//! | [`handoff`]  | Phase Ⓒ: gate, wire conversion, multi-hop loop          |
//! | [`spawn`]    | `SpawnPolicy` trait, `InflowSpawner`, `NoSpawn`         |
//! | [`observer`] | `SimObserver` hooks, `TickStats`, `DiscardReason`       |
//! | [`error`]    | `SimError`, `SimResult<T>`                              |

pub mod error;
pub mod ghost;
pub mod handoff;
pub mod observer;
pub mod spawn;
pub mod worker;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{SimError, SimResult};
pub use observer::{DiscardReason, NoopObserver, SimObserver, TickStats};
pub use spawn::{InflowSpawner, NoSpawn, SpawnPolicy, SpawnRequest};
pub use worker::Worker;
