//! Phase Ⓐ: the boundary (ghost info) exchange.
//!
//! Two sequential chains per tick, one per direction:
//!
//! - **LastVehicles** flows from the last rank toward rank 0.  Each worker
//!   first receives from its downstream neighbor, then sends its own
//!   head-most positions upstream.  The last rank has nothing to receive and
//!   sends immediately, so the chain always makes progress.
//! - **FirstVehicles** flows from rank 0 toward the last rank, symmetric.
//!
//! A worker whose lane is empty forwards the value it received from the far
//! side instead — so a run of empty workers between two populated ones is
//! transparent, and the ghost a worker ends up with is the road-global
//! nearest vehicle, not merely the adjacent worker's.

use std::array;

use ca_comm::{Communicator, Message, decode_ghosts, encode_ghosts};
use ca_core::{LaneId, Rank};
use ca_road::NeighborView;

use crate::observer::{DiscardReason, SimObserver};
use crate::spawn::SpawnPolicy;
use crate::worker::Worker;
use crate::SimResult;

/// Which ghost message a receive point expects.
#[derive(Copy, Clone, PartialEq, Eq)]
enum GhostKind {
    Last,
    First,
}

impl GhostKind {
    fn name(self) -> &'static str {
        match self {
            GhostKind::Last => "LastVehicles",
            GhostKind::First => "FirstVehicles",
        }
    }
}

impl<C: Communicator, S: SpawnPolicy> Worker<C, S> {
    /// Run the two exchange chains and return this tick's ghost view.
    pub(crate) fn exchange_boundaries<O: SimObserver>(
        &mut self,
        observer: &mut O,
    ) -> SimResult<NeighborView> {
        let mut view = NeighborView::EMPTY;

        // Chain 1: receive the downstream side's head-most vehicles, then
        // pass ours (or theirs, where we are empty) upstream.
        if let Some(next) = self.partition.next_rank() {
            view.last = self.recv_ghosts(next, GhostKind::Last, observer)?;
        }
        if let Some(prev) = self.partition.prev_rank() {
            let mine: [Option<u32>; 2] = array::from_fn(|i| {
                self.partition
                    .head_most(LaneId::BOTH[i])
                    .or(view.last[i])
            });
            self.comm
                .send(prev, Message::LastVehicles(encode_ghosts(mine)))?;
        }

        // Chain 2: receive the upstream side's tail-most vehicles, then pass
        // ours (or theirs) downstream.
        if let Some(prev) = self.partition.prev_rank() {
            view.first = self.recv_ghosts(prev, GhostKind::First, observer)?;
        }
        if let Some(next) = self.partition.next_rank() {
            let mine: [Option<u32>; 2] = array::from_fn(|i| {
                self.partition
                    .tail_most(LaneId::BOTH[i])
                    .or(view.first[i])
            });
            self.comm
                .send(next, Message::FirstVehicles(encode_ghosts(mine)))?;
        }

        Ok(view)
    }

    /// Receive one ghost message of the expected kind, discarding (and
    /// reporting) anything else that shows up first.
    fn recv_ghosts<O: SimObserver>(
        &mut self,
        from: Rank,
        want: GhostKind,
        observer: &mut O,
    ) -> SimResult<[Option<u32>; 2]> {
        loop {
            let msg = self.comm.recv(from)?;
            match (want, msg) {
                (GhostKind::Last, Message::LastVehicles(wire)) => return Ok(decode_ghosts(wire)),
                (GhostKind::First, Message::FirstVehicles(wire)) => return Ok(decode_ghosts(wire)),
                (_, other) => observer.on_discard(&DiscardReason::UnexpectedMessage {
                    want: want.name(),
                    got: other.kind(),
                }),
            }
        }
    }
}
