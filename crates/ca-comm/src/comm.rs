//! The worker-group transport abstraction.

use ca_core::Rank;

use crate::{CommError, CommResult, Message};

/// Point-to-point messaging within a static worker group, plus the two
/// collectives the step protocol needs.
///
/// `send` must be FIFO per directed rank pair and non-blocking with respect
/// to the receiver (buffered); `recv` blocks until a message from exactly
/// `from` is available.  Those two properties are what the per-tick message
/// sequence of the step protocol relies on to stay deadlock-free.
///
/// `barrier` and `allreduce_sum` have default implementations built from
/// `send`/`recv` (gather to rank 0, broadcast back), so implementing the
/// four required methods yields a complete worker group.  Transports with a
/// cheaper native collective (shared-memory barrier, MPI) should override
/// them.
pub trait Communicator {
    /// This worker's rank in `[0, num_workers)`.
    fn rank(&self) -> Rank;

    /// Size of the static worker group.
    fn num_workers(&self) -> usize;

    /// Queue `msg` for delivery to `to`.
    fn send(&mut self, to: Rank, msg: Message) -> CommResult<()>;

    /// Block until the next message from `from` arrives.
    fn recv(&mut self, from: Rank) -> CommResult<Message>;

    /// Sum `value` across all workers; every worker returns the total.
    fn allreduce_sum(&mut self, value: u64) -> CommResult<u64> {
        let root = Rank(0);
        if self.rank() == root {
            let mut total = value;
            for r in 1..self.num_workers() {
                match self.recv(Rank(r as u32))? {
                    Message::ReduceSum(v) => total += v,
                    other => {
                        return Err(CommError::Protocol {
                            want: "ReduceSum",
                            got: other.kind(),
                        });
                    }
                }
            }
            for r in 1..self.num_workers() {
                self.send(Rank(r as u32), Message::ReduceSum(total))?;
            }
            Ok(total)
        } else {
            self.send(root, Message::ReduceSum(value))?;
            match self.recv(root)? {
                Message::ReduceSum(total) => Ok(total),
                other => Err(CommError::Protocol {
                    want: "ReduceSum",
                    got: other.kind(),
                }),
            }
        }
    }

    /// Block until every worker has reached this point.
    fn barrier(&mut self) -> CommResult<()> {
        self.allreduce_sum(0).map(|_| ())
    }
}
