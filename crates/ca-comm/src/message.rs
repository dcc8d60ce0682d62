//! The tagged message kinds carried by the neighbor links.
//!
//! Tags are fixed per kind so that sender and receiver agree without
//! probing.  A transport is free to ship the enum directly (the in-process
//! channels do) or to put the tag on the wire; either way the kind set and
//! the payload layouts are the protocol contract.

use ca_core::SimConfig;

use crate::payload::VEHICLE_WIRE_LEN;

/// Wire sentinel for "no vehicle on this lane" in a ghost message.
pub const NO_VEHICLE: i32 = -1;

/// Fixed message tags, one per logical kind.
pub mod tag {
    /// Head-most positions, sent upstream.
    pub const LAST_VEHICLES: u16 = 10;
    /// Tail-most positions, sent downstream.
    pub const FIRST_VEHICLES: u16 = 11;
    /// Number of hand-off vehicles to follow, sent downstream.
    pub const HANDOFF_COUNT: u16 = 20;
    /// One hand-off vehicle (lane index + wire record), sent downstream.
    pub const HANDOFF_VEHICLE: u16 = 21;
    /// A worker's cell range, sent by rank 0 at bootstrap.
    pub const ROAD_RANGE: u16 = 30;
    /// The full configuration record, broadcast by rank 0 at bootstrap.
    pub const CONFIG: u16 = 40;
    /// A worker's raw travel-time samples, gathered at simulation end.
    pub const SAMPLES: u16 = 50;
    /// All-reduce contribution / result.
    pub const REDUCE_SUM: u16 = 60;
}

/// One protocol message.
#[derive(Clone, Debug, PartialEq)]
pub enum Message {
    /// Per-lane position of the sender side's head-most (lowest-position)
    /// vehicle, `NO_VEHICLE` if none is known.  Flows downstream→upstream.
    LastVehicles([i32; 2]),
    /// Per-lane position of the sender side's tail-most (highest-position)
    /// vehicle, `NO_VEHICLE` if none is known.  Flows upstream→downstream.
    FirstVehicles([i32; 2]),
    /// How many `HandoffVehicle` messages follow in this hand-off round.
    HandoffCount(u32),
    /// One vehicle changing owners: its lane index and its wire record.
    HandoffVehicle {
        lane: u8,
        payload: [u8; VEHICLE_WIRE_LEN],
    },
    /// Bootstrap: the half-open cell range `[start, end)` assigned to the
    /// receiving worker.
    RoadRange { start: u32, end: u32 },
    /// Bootstrap: the validated configuration record.
    Config(SimConfig),
    /// End of run: a non-aggregator worker's raw travel-time samples.
    Samples(Vec<f64>),
    /// All-reduce leg (contribution toward root, or the global result back).
    ReduceSum(u64),
}

impl Message {
    /// The fixed tag of this message's kind.
    pub fn tag(&self) -> u16 {
        match self {
            Message::LastVehicles(_) => tag::LAST_VEHICLES,
            Message::FirstVehicles(_) => tag::FIRST_VEHICLES,
            Message::HandoffCount(_) => tag::HANDOFF_COUNT,
            Message::HandoffVehicle { .. } => tag::HANDOFF_VEHICLE,
            Message::RoadRange { .. } => tag::ROAD_RANGE,
            Message::Config(_) => tag::CONFIG,
            Message::Samples(_) => tag::SAMPLES,
            Message::ReduceSum(_) => tag::REDUCE_SUM,
        }
    }

    /// Kind name for protocol-mismatch reporting.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::LastVehicles(_) => "LastVehicles",
            Message::FirstVehicles(_) => "FirstVehicles",
            Message::HandoffCount(_) => "HandoffCount",
            Message::HandoffVehicle { .. } => "HandoffVehicle",
            Message::RoadRange { .. } => "RoadRange",
            Message::Config(_) => "Config",
            Message::Samples(_) => "Samples",
            Message::ReduceSum(_) => "ReduceSum",
        }
    }
}

// ── Ghost encoding ────────────────────────────────────────────────────────────

/// Encode per-lane ghost positions for the wire (`None` → `NO_VEHICLE`).
pub fn encode_ghosts(ghosts: [Option<u32>; 2]) -> [i32; 2] {
    ghosts.map(|g| match g {
        Some(pos) => pos as i32,
        None => NO_VEHICLE,
    })
}

/// Decode per-lane ghost positions from the wire.  Any negative value is
/// treated as the "none" sentinel.
pub fn decode_ghosts(wire: [i32; 2]) -> [Option<u32>; 2] {
    wire.map(|w| if w < 0 { None } else { Some(w as u32) })
}
