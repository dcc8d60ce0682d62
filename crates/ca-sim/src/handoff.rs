//! Phase Ⓒ: vehicle hand-off between neighboring workers.
//!
//! The phase is a loop, not a single pass: a vehicle received this round may
//! already be past the receiver's own `road_end` (short partitions, fast
//! vehicle) and is then re-staged into the receiver's outbound set for the
//! next round.  The loop terminates when a global all-reduce of outbound
//! sizes reaches zero, bounding a vehicle's transit to one worker per round.

use ca_comm::{Communicator, Message, VehiclePayload};
use ca_core::{LaneId, Rank, VehicleId};
use ca_road::{RoadError, Vehicle};

use crate::observer::{DiscardReason, SimObserver, TickStats};
use crate::spawn::SpawnPolicy;
use crate::worker::Worker;
use crate::SimResult;

impl<C: Communicator, S: SpawnPolicy> Worker<C, S> {
    /// Run hand-off rounds until no worker has outbound vehicles left.
    pub(crate) fn handoff_loop<O: SimObserver>(
        &mut self,
        observer: &mut O,
        stats: &mut TickStats,
    ) -> SimResult<()> {
        loop {
            let pending = self.outbound.len() as u64;
            if self.comm.allreduce_sum(pending)? == 0 {
                return Ok(());
            }
            self.handoff_round(observer, stats)?;
        }
    }

    /// One round: send the admissible outbound set downstream, then absorb
    /// whatever the upstream neighbor sent.
    fn handoff_round<O: SimObserver>(
        &mut self,
        observer: &mut O,
        stats: &mut TickStats,
    ) -> SimResult<()> {
        if let Some(next) = self.partition.next_rank() {
            let batch = self.admissible_outbound();
            self.comm
                .send(next, Message::HandoffCount(batch.len() as u32))?;
            for vehicle in batch {
                let msg = Message::HandoffVehicle {
                    lane: vehicle.lane.index() as u8,
                    payload: payload_of(&vehicle).encode(),
                };
                self.comm.send(next, msg)?;
                stats.sent += 1;
            }
        }

        if let Some(prev) = self.partition.prev_rank() {
            let count = self.recv_handoff_count(prev, observer)?;
            for _ in 0..count {
                match self.comm.recv(prev)? {
                    Message::HandoffVehicle { lane, payload } => {
                        self.accept_arrival(lane, &payload, observer, stats)?;
                    }
                    // Wrong kind counts as the announced (and now lost)
                    // vehicle; the defensive path never fails the tick.
                    other => observer.on_discard(&DiscardReason::UnexpectedMessage {
                        want: "HandoffVehicle",
                        got: other.kind(),
                    }),
                }
            }
        }
        Ok(())
    }

    /// Drain the outbound set through the overtaking-safety gate.
    ///
    /// A vehicle may go only if no retained same-lane vehicle sits ahead of
    /// it — transmitting it early would let it materialize downstream of a
    /// vehicle that is logically in front.  Survivors are returned in
    /// descending position order (front-most first); held vehicles stay
    /// staged for a later round.
    pub(crate) fn admissible_outbound(&mut self) -> Vec<Vehicle> {
        let mut admitted = Vec::new();
        let mut held = Vec::new();
        for vehicle in self.outbound.drain(..) {
            let blocked = self
                .partition
                .tail_most(vehicle.lane)
                .is_some_and(|p| p > vehicle.position);
            if blocked {
                held.push(vehicle);
            } else {
                admitted.push(vehicle);
            }
        }
        self.outbound = held;
        admitted.sort_by(|a, b| b.position.cmp(&a.position));
        admitted
    }

    /// Receive the round's `HandoffCount`, discarding strays.
    fn recv_handoff_count<O: SimObserver>(
        &mut self,
        from: Rank,
        observer: &mut O,
    ) -> SimResult<u32> {
        loop {
            match self.comm.recv(from)? {
                Message::HandoffCount(n) => return Ok(n),
                other => observer.on_discard(&DiscardReason::UnexpectedMessage {
                    want: "HandoffCount",
                    got: other.kind(),
                }),
            }
        }
    }

    /// Take ownership of one arriving vehicle.
    ///
    /// Malformed arrivals (lane index ∉ {0,1}, undecodable record) are
    /// discarded; a collision at the carried position rejects the vehicle
    /// without retry.  An arrival still past our own `road_end` re-enters
    /// the outbound set — unless this is the last worker, where "past the
    /// end" means the vehicle has left the road and retires here.
    pub(crate) fn accept_arrival<O: SimObserver>(
        &mut self,
        lane_index: u8,
        payload: &[u8],
        observer: &mut O,
        stats: &mut TickStats,
    ) -> SimResult<()> {
        let Some(lane) = LaneId::from_index(lane_index) else {
            observer.on_discard(&DiscardReason::BadLaneIndex(lane_index));
            return Ok(());
        };
        let record = match VehiclePayload::decode(payload) {
            Ok(record) => record,
            Err(e) => {
                observer.on_discard(&DiscardReason::MalformedPayload(e.to_string()));
                return Ok(());
            }
        };

        let vehicle = vehicle_of(lane, &record);
        stats.received += 1;

        if vehicle.position > self.partition.road_end() {
            if self.partition.is_last() {
                self.retire_vehicle(vehicle, observer, stats);
            } else {
                self.outbound.push(vehicle);
            }
            return Ok(());
        }

        match self.partition.spawn(vehicle) {
            Ok(_) => Ok(()),
            Err(RoadError::CellCollision { lane, position }) => {
                observer.on_discard(&DiscardReason::CellOccupied { lane, position });
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

// ── Wire conversion ───────────────────────────────────────────────────────────

/// Flatten a vehicle into its wire record (the lane travels separately).
fn payload_of(v: &Vehicle) -> VehiclePayload {
    VehiclePayload {
        id: v.id.0,
        position: v.position,
        speed: v.speed,
        max_speed: v.max_speed,
        gap_forward: v.gap_forward,
        gap_other_forward: v.gap_other_forward,
        gap_other_backward: v.gap_other_backward,
        look_forward: v.look_forward,
        look_other_forward: v.look_other_forward,
        look_other_backward: v.look_other_backward,
        prob_slow_down: v.prob_slow_down,
        prob_change: v.prob_change,
        time_on_road: v.time_on_road,
    }
}

/// Reconstruct a vehicle from its wire record on the receiving side.
fn vehicle_of(lane: LaneId, record: &VehiclePayload) -> Vehicle {
    Vehicle {
        id: VehicleId(record.id),
        lane,
        position: record.position,
        speed: record.speed,
        max_speed: record.max_speed,
        look_forward: record.look_forward,
        look_other_forward: record.look_other_forward,
        look_other_backward: record.look_other_backward,
        prob_slow_down: record.prob_slow_down,
        prob_change: record.prob_change,
        time_on_road: record.time_on_road,
        gap_forward: record.gap_forward,
        gap_other_forward: record.gap_other_forward,
        gap_other_backward: record.gap_other_backward,
    }
}
