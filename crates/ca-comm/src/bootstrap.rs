//! Bootstrap collectives: road splitting and configuration broadcast.

use ca_core::{Rank, SimConfig};

use crate::{CommError, CommResult, Communicator, Message};

/// Split the global road into contiguous per-worker ranges.
///
/// Rank 0 computes the remainder-aware split over half-open ranges
/// (`end_i = start_i + ceil(remaining / (num_workers − i))`, so earlier
/// workers absorb the remainder) and sends each rank its `RoadRange`; every
/// rank — rank 0 included, through its self-link — receives its pair and
/// returns the *inclusive* range `(start, end − 1)`.
///
/// # Errors
/// `PartitionUnderflow` if this worker's range is empty (more workers than
/// cells), `Protocol` on an unexpected message kind.
pub fn divide_road<C: Communicator>(comm: &mut C, road_length: u32) -> CommResult<(u32, u32)> {
    let root = Rank(0);
    if comm.rank() == root {
        let p = comm.num_workers() as u32;
        let mut start = 0u32;
        let mut remaining = road_length;
        for i in 0..p {
            let end = start + remaining.div_ceil(p - i);
            remaining = road_length - end;
            comm.send(Rank(i), Message::RoadRange { start, end })?;
            start = end;
        }
    }

    let (start, end) = match comm.recv(root)? {
        Message::RoadRange { start, end } => (start, end),
        other => {
            return Err(CommError::Protocol {
                want: "RoadRange",
                got: other.kind(),
            });
        }
    };
    if end <= start {
        return Err(CommError::PartitionUnderflow {
            rank: comm.rank(),
            start,
            end,
        });
    }
    Ok((start, end - 1))
}

/// Broadcast the configuration record from rank 0 to every worker.
///
/// Rank 0 passes `Some(config)` (already loaded from disk and validated);
/// all other ranks pass `None` and receive the record.
pub fn broadcast_config<C: Communicator>(
    comm: &mut C,
    config: Option<SimConfig>,
) -> CommResult<SimConfig> {
    let root = Rank(0);
    if comm.rank() == root {
        let config = config.ok_or(CommError::NoConfig)?;
        for r in 1..comm.num_workers() {
            comm.send(Rank(r as u32), Message::Config(config.clone()))?;
        }
        Ok(config)
    } else {
        match comm.recv(root)? {
            Message::Config(config) => Ok(config),
            other => Err(CommError::Protocol {
                want: "Config",
                got: other.kind(),
            }),
        }
    }
}
