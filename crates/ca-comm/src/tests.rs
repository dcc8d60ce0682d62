//! Unit tests for the transport layer, wire codec, and bootstrap collectives.

use std::sync::Arc;
use std::thread;

use ca_core::Rank;

use crate::{
    CommError, Communicator, LocalComm, LocalGroup, Message, broadcast_config, decode_ghosts,
    divide_road, encode_ghosts,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Run `f` on every rank of a fresh `n`-worker group, one thread per rank,
/// and collect the results in rank order.
fn run_group<T, F>(n: usize, f: F) -> Vec<T>
where
    T: Send + 'static,
    F: Fn(LocalComm) -> T + Send + Sync + 'static,
{
    let f = Arc::new(f);
    let handles: Vec<_> = LocalGroup::new(n)
        .into_iter()
        .map(|comm| {
            let f = Arc::clone(&f);
            thread::spawn(move || f(comm))
        })
        .collect();
    handles.into_iter().map(|h| h.join().unwrap()).collect()
}

#[cfg(test)]
mod payload {
    use crate::{VEHICLE_WIRE_LEN, VehiclePayload};

    fn sample() -> VehiclePayload {
        VehiclePayload {
            id: 17,
            position: 1234,
            speed: 3,
            max_speed: 5,
            gap_forward: 2,
            gap_other_forward: 7,
            gap_other_backward: 1,
            look_forward: 8,
            look_other_forward: 8,
            look_other_backward: 5,
            prob_slow_down: 0.25,
            prob_change: 0.75,
            time_on_road: 99,
        }
    }

    #[test]
    fn encode_decode_roundtrip() {
        let p = sample();
        let decoded = VehiclePayload::decode(&p.encode()).unwrap();
        assert_eq!(decoded, p);
    }

    #[test]
    fn wire_length_is_fixed() {
        assert_eq!(sample().encode().len(), VEHICLE_WIRE_LEN);
        assert_eq!(VEHICLE_WIRE_LEN, 60, "10 ints + 2 doubles + 1 int");
    }

    #[test]
    fn declared_field_order_on_the_wire() {
        let bytes = sample().encode();
        assert_eq!(u32::from_le_bytes(bytes[0..4].try_into().unwrap()), 17);
        assert_eq!(u32::from_le_bytes(bytes[4..8].try_into().unwrap()), 1234);
        let p_slow = f64::from_le_bytes(bytes[40..48].try_into().unwrap());
        assert_eq!(p_slow, 0.25);
        let p_change = f64::from_le_bytes(bytes[48..56].try_into().unwrap());
        assert_eq!(p_change, 0.75);
        assert_eq!(u32::from_le_bytes(bytes[56..60].try_into().unwrap()), 99);
    }

    #[test]
    fn decode_rejects_wrong_length() {
        assert!(VehiclePayload::decode(&[0u8; 59]).is_err());
        assert!(VehiclePayload::decode(&[0u8; 61]).is_err());
        assert!(VehiclePayload::decode(&[]).is_err());
    }
}

#[cfg(test)]
mod ghosts {
    use super::*;
    use crate::NO_VEHICLE;

    #[test]
    fn encode_uses_sentinel_for_none() {
        assert_eq!(encode_ghosts([None, Some(42)]), [NO_VEHICLE, 42]);
        assert_eq!(encode_ghosts([Some(0), None]), [0, NO_VEHICLE]);
    }

    #[test]
    fn decode_roundtrip() {
        for ghosts in [[None, None], [Some(7), None], [Some(0), Some(1_000)]] {
            assert_eq!(decode_ghosts(encode_ghosts(ghosts)), ghosts);
        }
    }

    #[test]
    fn any_negative_decodes_to_none() {
        assert_eq!(decode_ghosts([-1, -99]), [None, None]);
    }
}

#[cfg(test)]
mod message {
    use crate::{Message, tag};

    #[test]
    fn tags_are_fixed_per_kind() {
        assert_eq!(Message::LastVehicles([-1, -1]).tag(), tag::LAST_VEHICLES);
        assert_eq!(Message::FirstVehicles([-1, -1]).tag(), tag::FIRST_VEHICLES);
        assert_eq!(Message::HandoffCount(0).tag(), tag::HANDOFF_COUNT);
        assert_eq!(
            Message::HandoffVehicle {
                lane: 0,
                payload: [0; 60]
            }
            .tag(),
            tag::HANDOFF_VEHICLE
        );
        assert_eq!(Message::RoadRange { start: 0, end: 1 }.tag(), tag::ROAD_RANGE);
        assert_eq!(Message::Samples(vec![]).tag(), tag::SAMPLES);
        assert_eq!(Message::ReduceSum(0).tag(), tag::REDUCE_SUM);
    }

    #[test]
    fn tags_are_distinct() {
        let tags = [
            tag::LAST_VEHICLES,
            tag::FIRST_VEHICLES,
            tag::HANDOFF_COUNT,
            tag::HANDOFF_VEHICLE,
            tag::ROAD_RANGE,
            tag::CONFIG,
            tag::SAMPLES,
            tag::REDUCE_SUM,
        ];
        for (i, a) in tags.iter().enumerate() {
            for b in &tags[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}

#[cfg(test)]
mod local {
    use super::*;

    #[test]
    fn point_to_point_delivery() {
        let results = run_group(2, |mut comm| {
            if comm.rank() == Rank(0) {
                comm.send(Rank(1), Message::HandoffCount(5)).unwrap();
                None
            } else {
                Some(comm.recv(Rank(0)).unwrap())
            }
        });
        assert_eq!(results[1], Some(Message::HandoffCount(5)));
    }

    #[test]
    fn per_pair_fifo_order() {
        let results = run_group(2, |mut comm| {
            if comm.rank() == Rank(0) {
                for i in 0..10 {
                    comm.send(Rank(1), Message::HandoffCount(i)).unwrap();
                }
                vec![]
            } else {
                (0..10).map(|_| comm.recv(Rank(0)).unwrap()).collect()
            }
        });
        let got: Vec<u32> = results[1]
            .iter()
            .map(|m| match m {
                Message::HandoffCount(i) => *i,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(got, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn self_link_works() {
        let results = run_group(1, |mut comm| {
            comm.send(Rank(0), Message::ReduceSum(9)).unwrap();
            comm.recv(Rank(0)).unwrap()
        });
        assert_eq!(results[0], Message::ReduceSum(9));
    }

    #[test]
    fn allreduce_sums_across_ranks() {
        let results = run_group(3, |mut comm| {
            let mine = (comm.rank().0 as u64 + 1) * 10;
            comm.allreduce_sum(mine).unwrap()
        });
        assert_eq!(results, vec![60, 60, 60]);
    }

    #[test]
    fn allreduce_repeated_rounds_stay_in_sync() {
        let results = run_group(4, |mut comm| {
            let mut totals = Vec::new();
            for round in 0..5u64 {
                totals.push(comm.allreduce_sum(round).unwrap());
            }
            totals
        });
        for totals in results {
            assert_eq!(totals, vec![0, 4, 8, 12, 16]);
        }
    }

    #[test]
    fn barrier_completes_for_all_ranks() {
        let results = run_group(4, |mut comm| {
            for _ in 0..3 {
                comm.barrier().unwrap();
            }
            true
        });
        assert!(results.into_iter().all(|ok| ok));
    }

    #[test]
    fn unexpected_kind_in_allreduce_is_a_protocol_error() {
        let results = run_group(2, |mut comm| {
            if comm.rank() == Rank(0) {
                // Expecting ReduceSum contributions; gets Samples instead.
                comm.allreduce_sum(0).err().map(|e| e.to_string())
            } else {
                comm.send(Rank(0), Message::Samples(vec![1.0])).unwrap();
                // Root bails out without answering; the link closes.
                comm.recv(Rank(0)).err().map(|e| e.to_string())
            }
        });
        assert!(
            results[0].as_deref().unwrap().contains("protocol mismatch"),
            "root should report the mismatch: {:?}",
            results[0]
        );
        assert!(results[1].is_some(), "peer should see the closed link");
    }
}

#[cfg(test)]
mod bootstrap {
    use super::*;

    #[test]
    fn divide_road_even_split() {
        let ranges = run_group(4, |mut comm| divide_road(&mut comm, 100).unwrap());
        assert_eq!(ranges, vec![(0, 24), (25, 49), (50, 74), (75, 99)]);
    }

    #[test]
    fn divide_road_remainder_aware_split() {
        let ranges = run_group(3, |mut comm| divide_road(&mut comm, 10).unwrap());
        assert_eq!(ranges, vec![(0, 3), (4, 6), (7, 9)]);
    }

    #[test]
    fn divide_road_single_worker_takes_everything() {
        let ranges = run_group(1, |mut comm| divide_road(&mut comm, 77).unwrap());
        assert_eq!(ranges, vec![(0, 76)]);
    }

    #[test]
    fn ranges_are_contiguous_and_cover_the_road() {
        for (len, n) in [(100u32, 7usize), (13, 5), (999, 8)] {
            let ranges = run_group(n, move |mut comm| divide_road(&mut comm, len).unwrap());
            assert_eq!(ranges[0].0, 0);
            assert_eq!(ranges[n - 1].1, len - 1);
            for w in ranges.windows(2) {
                assert_eq!(w[1].0, w[0].1 + 1, "ranges must chain: {ranges:?}");
            }
        }
    }

    #[test]
    fn more_workers_than_cells_underflows() {
        let results = run_group(4, |mut comm| divide_road(&mut comm, 2));
        // The first two workers get one cell each; the rest get nothing.
        assert!(results[0].is_ok());
        assert!(results[1].is_ok());
        for r in &results[2..] {
            assert!(
                matches!(r, Err(CommError::PartitionUnderflow { .. })),
                "expected underflow, got {r:?}"
            );
        }
    }

    #[test]
    fn config_broadcast_reaches_all_ranks() {
        use ca_core::SimConfig;
        let want = SimConfig {
            length: 123,
            max_time: 7,
            ..SimConfig::default()
        };
        let sent = want.clone();
        let results = run_group(3, move |mut comm| {
            let mine = (comm.rank() == Rank(0)).then(|| sent.clone());
            broadcast_config(&mut comm, mine).unwrap()
        });
        for got in results {
            assert_eq!(got, want);
        }
    }

    #[test]
    fn root_without_config_errors() {
        let results = run_group(1, |mut comm| broadcast_config(&mut comm, None));
        assert!(matches!(results[0], Err(CommError::NoConfig)));
    }
}
