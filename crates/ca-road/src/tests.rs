//! Unit tests for the spatial model and the local CA rules.

use ca_core::{LaneId, Rank, SimConfig, VehicleId, WorkerRng};

use crate::{NeighborView, Partition, Vehicle, VehicleKey};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn cfg() -> SimConfig {
    SimConfig::default()
}

fn rng() -> WorkerRng {
    WorkerRng::new(7, Rank(0))
}

fn part(start: u32, end: u32) -> Partition {
    Partition::new(Rank(0), 1, start, end)
}

fn add(p: &mut Partition, id: u32, lane: LaneId, pos: u32, speed: u32) -> VehicleKey {
    p.spawn(Vehicle::new(VehicleId(id), lane, pos, speed, &cfg()))
        .unwrap()
}

#[cfg(test)]
mod lane {
    use super::*;
    use crate::Lane;
    use slotmap::SlotMap;

    fn occupied_at(lane: &mut Lane, positions: &[u32]) {
        let mut arena: SlotMap<VehicleKey, ()> = SlotMap::with_key();
        for &pos in positions {
            lane.place(pos, arena.insert(())).unwrap();
        }
    }

    #[test]
    fn place_then_remove_roundtrip() {
        let mut lane = Lane::new(LaneId::Right, 10, 19);
        occupied_at(&mut lane, &[12]);
        assert!(lane.cell_occupied(12));
        lane.remove(12).unwrap();
        assert!(!lane.cell_occupied(12));
    }

    #[test]
    fn place_rejects_occupied_cell() {
        let mut lane = Lane::new(LaneId::Right, 0, 9);
        occupied_at(&mut lane, &[3]);
        let key = lane.occupant(3).unwrap();
        assert!(lane.place(3, key).is_err());
    }

    #[test]
    fn remove_rejects_empty_cell() {
        let mut lane = Lane::new(LaneId::Right, 0, 9);
        assert!(lane.remove(5).is_err());
    }

    #[test]
    fn out_of_range_positions_rejected() {
        let mut lane = Lane::new(LaneId::Right, 10, 19);
        assert!(lane.remove(9).is_err());
        assert!(lane.remove(20).is_err());
        assert!(!lane.cell_occupied(9));
        assert!(!lane.cell_occupied(20));
    }

    #[test]
    fn scan_forward_finds_nearest_blocker() {
        let mut lane = Lane::new(LaneId::Right, 0, 29);
        occupied_at(&mut lane, &[8, 15]);
        assert_eq!(lane.scan_forward(3, 10), Some(8));
        assert_eq!(lane.scan_forward(8, 10), Some(15));
    }

    #[test]
    fn scan_forward_respects_distance_cap() {
        let mut lane = Lane::new(LaneId::Right, 0, 29);
        occupied_at(&mut lane, &[15]);
        assert_eq!(lane.scan_forward(3, 5), None);
        assert_eq!(lane.scan_forward(3, 12), Some(15));
    }

    #[test]
    fn scan_backward_finds_nearest_blocker() {
        let mut lane = Lane::new(LaneId::Right, 0, 29);
        occupied_at(&mut lane, &[4, 10]);
        assert_eq!(lane.scan_backward(15, 10), Some(10));
        assert_eq!(lane.scan_backward(10, 10), Some(4));
        assert_eq!(lane.scan_backward(4, 3), None);
    }

    #[test]
    fn scans_clip_at_segment_edges() {
        let mut lane = Lane::new(LaneId::Right, 10, 19);
        occupied_at(&mut lane, &[11]);
        // Window reaches past both edges without panicking.
        assert_eq!(lane.scan_forward(18, 50), None);
        assert_eq!(lane.scan_backward(12, 50), Some(11));
        assert_eq!(lane.scan_backward(11, 50), None);
    }

    #[test]
    fn head_and_tail_most() {
        let mut lane = Lane::new(LaneId::Right, 0, 29);
        assert_eq!(lane.first_occupied_from_head(), None);
        assert_eq!(lane.first_occupied_from_tail(), None);
        occupied_at(&mut lane, &[7, 21, 13]);
        assert_eq!(lane.first_occupied_from_head(), Some(7));
        assert_eq!(lane.first_occupied_from_tail(), Some(21));
    }
}

#[cfg(test)]
mod gaps {
    use super::*;

    #[test]
    fn forward_gap_to_blocker_in_partition() {
        let mut p = part(0, 99);
        let a = add(&mut p, 0, LaneId::Right, 10, 0);
        add(&mut p, 1, LaneId::Right, 15, 0);
        p.refresh_gaps(&NeighborView::EMPTY);
        assert_eq!(p.vehicle(a).gap_forward, 4);
    }

    #[test]
    fn forward_gap_capped_by_look_forward() {
        let mut p = part(0, 99);
        let a = add(&mut p, 0, LaneId::Right, 10, 0);
        add(&mut p, 1, LaneId::Right, 50, 0);
        p.refresh_gaps(&NeighborView::EMPTY);
        assert_eq!(p.vehicle(a).gap_forward, cfg().look_forward);
    }

    #[test]
    fn forward_gap_uses_downstream_ghost() {
        let mut p = part(0, 9);
        let a = add(&mut p, 0, LaneId::Right, 8, 0);
        let view = NeighborView {
            first: [None, None],
            last: [Some(12), None],
        };
        p.refresh_gaps(&view);
        assert_eq!(p.vehicle(a).gap_forward, 3, "12 - 8 - 1 empty cells");
    }

    #[test]
    fn forward_gap_without_ghost_is_open_to_cap() {
        let mut p = part(0, 9);
        let a = add(&mut p, 0, LaneId::Right, 8, 0);
        p.refresh_gaps(&NeighborView::EMPTY);
        assert_eq!(p.vehicle(a).gap_forward, cfg().look_forward);
    }

    #[test]
    fn ghost_beyond_cap_does_not_shrink_gap() {
        let mut p = part(0, 9);
        let a = add(&mut p, 0, LaneId::Right, 8, 0);
        let view = NeighborView {
            first: [None, None],
            last: [Some(500), None],
        };
        p.refresh_gaps(&view);
        assert_eq!(p.vehicle(a).gap_forward, cfg().look_forward);
    }

    #[test]
    fn other_lane_gaps_use_opposite_row() {
        let mut p = part(0, 99);
        let a = add(&mut p, 0, LaneId::Right, 10, 0);
        add(&mut p, 1, LaneId::Left, 14, 0);
        add(&mut p, 2, LaneId::Left, 7, 0);
        p.refresh_gaps(&NeighborView::EMPTY);
        let v = p.vehicle(a);
        assert_eq!(v.gap_other_forward, 3, "14 - 10 - 1");
        assert_eq!(v.gap_other_backward, 2, "10 - 7 - 1");
    }

    #[test]
    fn backward_gap_uses_upstream_ghost() {
        let mut p = part(10, 19);
        let a = add(&mut p, 0, LaneId::Right, 11, 0);
        let view = NeighborView {
            first: [None, Some(8)],
            last: [None, None],
        };
        p.refresh_gaps(&view);
        assert_eq!(p.vehicle(a).gap_other_backward, 2, "11 - 8 - 1");
    }

    #[test]
    fn adjacent_ghost_gives_zero_backward_gap() {
        let mut p = part(10, 19);
        let a = add(&mut p, 0, LaneId::Right, 10, 0);
        let view = NeighborView {
            first: [None, Some(9)],
            last: [None, None],
        };
        p.refresh_gaps(&view);
        assert_eq!(p.vehicle(a).gap_other_backward, 0);
    }
}

#[cfg(test)]
mod lane_switch {
    use super::*;

    /// A vehicle blocked ahead on its own lane with a wide-open left lane.
    fn blocked_setup() -> (Partition, VehicleKey) {
        let mut p = part(0, 99);
        let a = add(&mut p, 0, LaneId::Right, 10, 3);
        add(&mut p, 1, LaneId::Right, 12, 0); // blocker one cell of gap ahead
        p.refresh_gaps(&NeighborView::EMPTY);
        (p, a)
    }

    fn always_switch(p: &mut Partition, key: VehicleKey) {
        p.vehicle_mut(key).prob_change = 1.0;
    }

    #[test]
    fn switches_when_blocked_and_other_lane_clear() {
        let (mut p, a) = blocked_setup();
        always_switch(&mut p, a);
        assert!(p.vehicle(a).wants_lane_switch(p.road(), &mut rng()));
    }

    #[test]
    fn no_switch_when_own_gap_sufficient() {
        let mut p = part(0, 99);
        let a = add(&mut p, 0, LaneId::Right, 10, 0);
        p.refresh_gaps(&NeighborView::EMPTY);
        always_switch(&mut p, a);
        // desired step 1, gap_forward = cap (8): no reason to switch
        assert!(!p.vehicle(a).wants_lane_switch(p.road(), &mut rng()));
    }

    #[test]
    fn no_switch_when_other_lane_not_better() {
        let (mut p, a) = blocked_setup();
        always_switch(&mut p, a);
        add(&mut p, 2, LaneId::Left, 12, 0); // same gap on the left lane
        p.refresh_gaps(&NeighborView::EMPTY);
        assert!(!p.vehicle(a).wants_lane_switch(p.road(), &mut rng()));
    }

    #[test]
    fn no_switch_when_backward_unsafe() {
        let (mut p, a) = blocked_setup();
        always_switch(&mut p, a);
        add(&mut p, 2, LaneId::Left, 8, 0); // too close behind on the left
        p.refresh_gaps(&NeighborView::EMPTY);
        assert!(!p.vehicle(a).wants_lane_switch(p.road(), &mut rng()));
    }

    #[test]
    fn no_switch_when_target_cell_taken() {
        let (mut p, a) = blocked_setup();
        always_switch(&mut p, a);
        add(&mut p, 2, LaneId::Left, 10, 0); // occupies the target cell
        p.refresh_gaps(&NeighborView::EMPTY);
        assert!(!p.vehicle(a).wants_lane_switch(p.road(), &mut rng()));
    }

    #[test]
    fn prob_change_zero_never_switches() {
        let (mut p, a) = blocked_setup();
        p.vehicle_mut(a).prob_change = 0.0;
        assert!(!p.vehicle(a).wants_lane_switch(p.road(), &mut rng()));
    }

    #[test]
    fn upstream_ghost_blocks_switch_near_boundary() {
        // Vehicle just inside its partition; the upstream neighbor's tail
        // vehicle sits right behind on the other lane.
        let mut p = Partition::new(Rank(1), 2, 50, 99);
        let a = add(&mut p, 0, LaneId::Right, 51, 3);
        add(&mut p, 1, LaneId::Right, 53, 0);
        always_switch(&mut p, a);
        let view = NeighborView {
            first: [None, Some(49)],
            last: [None, None],
        };
        p.refresh_gaps(&view);
        // gap_other_backward = 1 < look_other_backward: unsafe.
        assert!(!p.vehicle(a).wants_lane_switch(p.road(), &mut rng()));
    }
}

#[cfg(test)]
mod movement {
    use super::*;

    fn no_noise(v: &mut Vehicle) {
        v.prob_slow_down = 0.0;
    }

    #[test]
    fn accelerates_one_cell_per_tick_up_to_max() {
        let mut p = part(0, 99);
        let a = add(&mut p, 0, LaneId::Right, 0, 0);
        no_noise(p.vehicle_mut(a));
        let mut r = rng();
        let mut speeds = Vec::new();
        for _ in 0..6 {
            p.refresh_gaps(&NeighborView::EMPTY);
            let old = p.vehicle(a).position;
            p.vehicle_mut(a).advance(&mut r);
            p.relocate(a, old).unwrap();
            speeds.push(p.vehicle(a).speed);
        }
        assert_eq!(speeds, vec![1, 2, 3, 4, 5, 5]);
        assert_eq!(p.vehicle(a).position, 1 + 2 + 3 + 4 + 5 + 5);
    }

    #[test]
    fn brakes_to_gap() {
        let mut p = part(0, 99);
        let a = add(&mut p, 0, LaneId::Right, 10, 5);
        add(&mut p, 1, LaneId::Right, 13, 0);
        no_noise(p.vehicle_mut(a));
        p.refresh_gaps(&NeighborView::EMPTY);
        let new = p.vehicle_mut(a).advance(&mut rng());
        assert_eq!(p.vehicle(a).speed, 2, "braked to the 2-cell gap");
        assert_eq!(new, 12, "stops right behind the blocker");
    }

    #[test]
    fn certain_slowdown_oscillates_below_max() {
        // With prob_slow_down = 1 and open road, a vehicle at max speed
        // touches max during the step but always ends the tick one below.
        let mut p = part(0, 9999);
        let config = SimConfig {
            max_speed: 3,
            prob_slow_down: 1.0,
            look_forward: 50,
            ..cfg()
        };
        let a = p
            .spawn(Vehicle::new(VehicleId(0), LaneId::Right, 0, 3, &config))
            .unwrap();
        let mut r = rng();
        for _ in 0..10 {
            p.refresh_gaps(&NeighborView::EMPTY);
            let old = p.vehicle(a).position;
            p.vehicle_mut(a).advance(&mut r);
            p.relocate(a, old).unwrap();
            assert_eq!(p.vehicle(a).speed, 2);
        }
        assert_eq!(p.vehicle(a).position, 20);
    }

    #[test]
    fn never_exceeds_max_speed_or_reverses() {
        let mut p = part(0, 999);
        let a = add(&mut p, 0, LaneId::Right, 0, 0);
        let mut r = rng();
        let mut last_pos = 0;
        for _ in 0..50 {
            p.refresh_gaps(&NeighborView::EMPTY);
            let old = p.vehicle(a).position;
            let new = p.vehicle_mut(a).advance(&mut r);
            p.relocate(a, old).unwrap();
            let v = p.vehicle(a);
            assert!(v.speed <= v.max_speed);
            assert!(new >= last_pos, "position must be nondecreasing");
            last_pos = new;
        }
    }

    #[test]
    fn counts_time_on_road() {
        let mut p = part(0, 999);
        let a = add(&mut p, 0, LaneId::Right, 0, 0);
        let mut r = rng();
        for _ in 0..7 {
            p.refresh_gaps(&NeighborView::EMPTY);
            let old = p.vehicle(a).position;
            p.vehicle_mut(a).advance(&mut r);
            p.relocate(a, old).unwrap();
        }
        assert_eq!(p.vehicle(a).time_on_road, 7);
        assert_eq!(p.vehicle(a).travel_time(2.5), 17.5);
    }
}

#[cfg(test)]
mod partition {
    use super::*;
    use crate::RoadError;

    #[test]
    fn spawn_rejects_occupied_cell() {
        let mut p = part(0, 99);
        add(&mut p, 0, LaneId::Right, 5, 0);
        let err = p
            .spawn(Vehicle::new(VehicleId(1), LaneId::Right, 5, 0, &cfg()))
            .unwrap_err();
        assert!(matches!(err, RoadError::CellCollision { .. }));
        assert_eq!(p.vehicle_count(), 1, "rejected vehicle is not inserted");
    }

    #[test]
    fn spawn_rejects_out_of_range_position() {
        let mut p = part(10, 19);
        let err = p
            .spawn(Vehicle::new(VehicleId(0), LaneId::Right, 25, 0, &cfg()))
            .unwrap_err();
        assert!(matches!(err, RoadError::OutOfRange { .. }));
    }

    #[test]
    fn same_cell_on_both_lanes_is_fine() {
        let mut p = part(0, 99);
        add(&mut p, 0, LaneId::Right, 5, 0);
        add(&mut p, 1, LaneId::Left, 5, 0);
        assert_eq!(p.vehicle_count(), 2);
    }

    #[test]
    fn extract_clears_cell_arena_and_order() {
        let mut p = part(0, 99);
        let a = add(&mut p, 7, LaneId::Right, 5, 0);
        let v = p.extract(a, 5).unwrap();
        assert_eq!(v.id, VehicleId(7));
        assert_eq!(p.vehicle_count(), 0);
        assert!(!p.road().cell_occupied(LaneId::Right, 5));
        assert!(p.sweep_keys().is_empty());
    }

    #[test]
    fn switch_lane_moves_cell_entry() {
        let mut p = part(0, 99);
        let a = add(&mut p, 0, LaneId::Right, 5, 0);
        p.switch_lane(a).unwrap();
        assert_eq!(p.vehicle(a).lane, LaneId::Left);
        assert!(!p.road().cell_occupied(LaneId::Right, 5));
        assert!(p.road().cell_occupied(LaneId::Left, 5));
        assert_eq!(p.vehicle(a).position, 5, "switching keeps the position");
    }

    #[test]
    fn switch_lane_refuses_occupied_target() {
        let mut p = part(0, 99);
        let a = add(&mut p, 0, LaneId::Right, 5, 0);
        add(&mut p, 1, LaneId::Left, 5, 0);
        assert!(p.switch_lane(a).is_err());
        assert_eq!(p.vehicle(a).lane, LaneId::Right, "claim failed, no flip");
    }

    #[test]
    fn neighbor_ranks() {
        let first = Partition::new(Rank(0), 3, 0, 3);
        assert_eq!(first.prev_rank(), None);
        assert_eq!(first.next_rank(), Some(Rank(1)));
        assert!(first.is_first() && !first.is_last());

        let mid = Partition::new(Rank(1), 3, 4, 6);
        assert_eq!(mid.prev_rank(), Some(Rank(0)));
        assert_eq!(mid.next_rank(), Some(Rank(2)));

        let last = Partition::new(Rank(2), 3, 7, 9);
        assert_eq!(last.prev_rank(), Some(Rank(1)));
        assert_eq!(last.next_rank(), None);
        assert!(last.is_last());

        let solo = Partition::new(Rank(0), 1, 0, 9);
        assert!(solo.is_first() && solo.is_last());
        assert_eq!(solo.prev_rank(), None);
        assert_eq!(solo.next_rank(), None);
    }

    #[test]
    fn head_and_tail_most_per_lane() {
        let mut p = part(0, 99);
        add(&mut p, 0, LaneId::Right, 30, 0);
        add(&mut p, 1, LaneId::Right, 60, 0);
        add(&mut p, 2, LaneId::Left, 45, 0);
        assert_eq!(p.head_most(LaneId::Right), Some(30));
        assert_eq!(p.tail_most(LaneId::Right), Some(60));
        assert_eq!(p.head_most(LaneId::Left), Some(45));
        assert_eq!(p.tail_most(LaneId::Left), Some(45));
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let mut p = part(0, 99);
        add(&mut p, 2, LaneId::Right, 20, 0);
        add(&mut p, 0, LaneId::Right, 5, 0);
        add(&mut p, 1, LaneId::Left, 12, 0);
        let ids: Vec<u32> = p.iter().map(|v| v.id.0).collect();
        assert_eq!(ids, vec![2, 0, 1]);
    }
}
