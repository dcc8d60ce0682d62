//! The fixed-layout vehicle record shipped in a hand-off.
//!
//! Field order and widths are the protocol contract, identical on both ends
//! of every link: ten 4-byte integers, two IEEE-754 doubles, one 4-byte
//! integer, all little-endian, 60 bytes total.  Derived gaps travel with the
//! record; the receiver recomputes them next tick anyway, but keeping the
//! layout fixed means both ends commit the same datatype.

use crate::{CommError, CommResult};

/// Serialized size of one vehicle record.
pub const VEHICLE_WIRE_LEN: usize = 60;

/// The wire form of a vehicle, in declared field order.
///
/// The lane index is *not* part of the record; it rides alongside in the
/// `HandoffVehicle` message.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehiclePayload {
    pub id: u32,
    pub position: u32,
    pub speed: u32,
    pub max_speed: u32,
    pub gap_forward: u32,
    pub gap_other_forward: u32,
    pub gap_other_backward: u32,
    pub look_forward: u32,
    pub look_other_forward: u32,
    pub look_other_backward: u32,
    pub prob_slow_down: f64,
    pub prob_change: f64,
    pub time_on_road: u32,
}

impl VehiclePayload {
    /// Serialize into the fixed 60-byte wire layout.
    pub fn encode(&self) -> [u8; VEHICLE_WIRE_LEN] {
        let mut buf = [0u8; VEHICLE_WIRE_LEN];
        let mut at = 0;
        for word in [
            self.id,
            self.position,
            self.speed,
            self.max_speed,
            self.gap_forward,
            self.gap_other_forward,
            self.gap_other_backward,
            self.look_forward,
            self.look_other_forward,
            self.look_other_backward,
        ] {
            buf[at..at + 4].copy_from_slice(&word.to_le_bytes());
            at += 4;
        }
        for real in [self.prob_slow_down, self.prob_change] {
            buf[at..at + 8].copy_from_slice(&real.to_le_bytes());
            at += 8;
        }
        buf[at..at + 4].copy_from_slice(&self.time_on_road.to_le_bytes());
        debug_assert_eq!(at + 4, VEHICLE_WIRE_LEN);
        buf
    }

    /// Deserialize from the fixed wire layout.
    ///
    /// # Errors
    /// `Payload` if `bytes` is not exactly [`VEHICLE_WIRE_LEN`] long.
    pub fn decode(bytes: &[u8]) -> CommResult<Self> {
        if bytes.len() != VEHICLE_WIRE_LEN {
            return Err(CommError::Payload(format!(
                "vehicle record must be {VEHICLE_WIRE_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        let word = |i: usize| {
            let at = i * 4;
            u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
        };
        let real = |at: usize| {
            let mut b = [0u8; 8];
            b.copy_from_slice(&bytes[at..at + 8]);
            f64::from_le_bytes(b)
        };
        Ok(Self {
            id: word(0),
            position: word(1),
            speed: word(2),
            max_speed: word(3),
            gap_forward: word(4),
            gap_other_forward: word(5),
            gap_other_backward: word(6),
            look_forward: word(7),
            look_other_forward: word(8),
            look_other_backward: word(9),
            prob_slow_down: real(40),
            prob_change: real(48),
            time_on_road: u32::from_le_bytes([bytes[56], bytes[57], bytes[58], bytes[59]]),
        })
    }
}
