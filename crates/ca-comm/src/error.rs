//! Error types for the transport and bootstrap layer.

use ca_core::Rank;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommError {
    /// A link failed outright (peer gone, channel closed).  Fatal to the run.
    #[error("transport failure: {0}")]
    Transport(String),

    /// A received message had the wrong kind for this point in the protocol.
    #[error("protocol mismatch: expected {want}, got {got}")]
    Protocol {
        want: &'static str,
        got: &'static str,
    },

    /// Bootstrap assigned this worker an empty cell range.
    #[error("worker {rank} was assigned the empty range [{start}, {end})")]
    PartitionUnderflow { rank: Rank, start: u32, end: u32 },

    /// A hand-off record could not be decoded.
    #[error("malformed vehicle payload: {0}")]
    Payload(String),

    /// Rank 0 called the configuration broadcast without a configuration.
    #[error("rank 0 must supply the configuration to broadcast")]
    NoConfig,
}

pub type CommResult<T> = Result<T, CommError>;
