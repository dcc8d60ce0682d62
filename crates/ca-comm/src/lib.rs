//! `ca-comm` — the neighbor-link protocol: tagged messages, the vehicle wire
//! codec, and the worker-group transport abstraction.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`message`]   | `Message` — the tagged message kinds of the protocol      |
//! | [`payload`]   | `VehiclePayload` — the fixed-layout hand-off record       |
//! | [`comm`]      | `Communicator` — send/recv/barrier/all-reduce trait       |
//! | [`local`]     | `LocalGroup` — in-process channel transport               |
//! | [`bootstrap`] | `divide_road`, `broadcast_config` collectives             |
//! | [`error`]     | `CommError`, `CommResult<T>`                              |
//!
//! # Transport model
//!
//! Workers form a static group with ranks `0..num_workers`.  All protocol
//! traffic is point-to-point sends and blocking receives; `barrier` and
//! `allreduce_sum` have default implementations built from those, so any
//! point-to-point transport is a complete worker group.  [`LocalGroup`] is
//! the stock transport (one OS thread per worker, one FIFO channel per
//! directed rank pair); an MPI-style process transport would implement the
//! same trait.

pub mod bootstrap;
pub mod comm;
pub mod error;
pub mod local;
pub mod message;
pub mod payload;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use bootstrap::{broadcast_config, divide_road};
pub use comm::Communicator;
pub use error::{CommError, CommResult};
pub use local::{LocalComm, LocalGroup};
pub use message::{Message, NO_VEHICLE, decode_ghosts, encode_ghosts, tag};
pub use payload::{VEHICLE_WIRE_LEN, VehiclePayload};
