//! In-process worker group: one FIFO channel per directed rank pair.
//!
//! `LocalGroup::new(n)` hands back one [`LocalComm`] per rank; each is moved
//! into its own worker thread.  Unbounded channels make every `send`
//! buffered (never blocking on the receiver), which is exactly the transport
//! property the step protocol's fixed send/receive sequence assumes.

use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Barrier};

use ca_core::Rank;

use crate::{CommError, CommResult, Communicator, Message};

/// Factory for an in-process worker group.
pub struct LocalGroup;

impl LocalGroup {
    /// Build the n×n channel matrix and return one endpoint per rank, in
    /// rank order.
    ///
    /// # Panics
    /// Panics if `n == 0`.
    pub fn new(n: usize) -> Vec<LocalComm> {
        assert!(n > 0, "a worker group needs at least one rank");
        let barrier = Arc::new(Barrier::new(n));

        // txs[src][dst] sends into rxs[dst][src].
        let mut txs: Vec<Vec<Sender<Message>>> = (0..n).map(|_| Vec::with_capacity(n)).collect();
        let mut rxs: Vec<Vec<Receiver<Message>>> = (0..n).map(|_| Vec::with_capacity(n)).collect();
        for src in 0..n {
            for dst in 0..n {
                let (tx, rx) = channel();
                txs[src].push(tx);
                rxs[dst].push(rx);
            }
        }

        txs.into_iter()
            .zip(rxs)
            .enumerate()
            .map(|(rank, (txs, rxs))| LocalComm {
                rank: Rank(rank as u32),
                size: n,
                txs,
                rxs,
                barrier: Arc::clone(&barrier),
            })
            .collect()
    }
}

/// One rank's endpoint of a [`LocalGroup`].
///
/// Movable into a worker thread; not shareable between threads (each rank is
/// single-threaded, matching the process model).
pub struct LocalComm {
    rank: Rank,
    size: usize,
    /// Sender to every rank, indexed by destination.
    txs: Vec<Sender<Message>>,
    /// Receiver from every rank, indexed by source.
    rxs: Vec<Receiver<Message>>,
    barrier: Arc<Barrier>,
}

impl Communicator for LocalComm {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn num_workers(&self) -> usize {
        self.size
    }

    fn send(&mut self, to: Rank, msg: Message) -> CommResult<()> {
        self.txs
            .get(to.index())
            .ok_or_else(|| CommError::Transport(format!("no such rank {to}")))?
            .send(msg)
            .map_err(|_| CommError::Transport(format!("link to {to} is closed")))
    }

    fn recv(&mut self, from: Rank) -> CommResult<Message> {
        self.rxs
            .get(from.index())
            .ok_or_else(|| CommError::Transport(format!("no such rank {from}")))?
            .recv()
            .map_err(|_| CommError::Transport(format!("link from {from} is closed")))
    }

    /// Native rendezvous; cheaper than the message-based default.
    fn barrier(&mut self) -> CommResult<()> {
        self.barrier.wait();
        Ok(())
    }
}
