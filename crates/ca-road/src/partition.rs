//! The per-worker view of the road: a contiguous cell range, the vehicles
//! inside it, and the bookkeeping that keeps the cell map and the vehicle
//! arena in agreement.

use ca_core::{LaneId, Rank};
use slotmap::SlotMap;

use crate::{NeighborView, Road, RoadResult, Vehicle, VehicleKey};

/// One worker's slice of the global road.
///
/// Owns the cells in `[road_start, road_end]` and every vehicle currently
/// inside that range.  The arena is the single owner of vehicle state; lanes
/// hold keys.  Every mutation goes through the primitives below so the two
/// structures can never disagree.
///
/// Invariant: every owned vehicle satisfies
/// `road_start <= position <= road_end`, except transiently during the move
/// sweep, between a vehicle advancing past `road_end` and its extraction
/// into the hand-off set within the same sweep iteration.
pub struct Partition {
    rank: Rank,
    num_workers: usize,
    road_start: u32,
    road_end: u32,
    road: Road,
    vehicles: SlotMap<VehicleKey, Vehicle>,
    /// Sweep order: keys in insertion order.
    order: Vec<VehicleKey>,
}

impl Partition {
    /// Create an empty partition for `rank` of `num_workers` covering
    /// `road_start..=road_end`.
    pub fn new(rank: Rank, num_workers: usize, road_start: u32, road_end: u32) -> Self {
        debug_assert!(road_start <= road_end, "zero-length partition");
        debug_assert!(rank.index() < num_workers);
        Self {
            rank,
            num_workers,
            road_start,
            road_end,
            road: Road::new(road_start, road_end),
            vehicles: SlotMap::with_key(),
            order: Vec::new(),
        }
    }

    // ── Topology ──────────────────────────────────────────────────────────

    #[inline]
    pub fn rank(&self) -> Rank {
        self.rank
    }

    #[inline]
    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    #[inline]
    pub fn road_start(&self) -> u32 {
        self.road_start
    }

    #[inline]
    pub fn road_end(&self) -> u32 {
        self.road_end
    }

    /// `true` for rank 0, the spawning worker.
    #[inline]
    pub fn is_first(&self) -> bool {
        self.rank.index() == 0
    }

    /// `true` for the highest rank, the statistics aggregator.
    #[inline]
    pub fn is_last(&self) -> bool {
        self.rank.index() == self.num_workers - 1
    }

    /// The upstream neighbor, or `None` on the first worker.
    pub fn prev_rank(&self) -> Option<Rank> {
        if self.is_first() {
            None
        } else {
            Some(Rank(self.rank.0 - 1))
        }
    }

    /// The downstream neighbor, or `None` on the last worker.
    pub fn next_rank(&self) -> Option<Rank> {
        if self.is_last() {
            None
        } else {
            Some(Rank(self.rank.0 + 1))
        }
    }

    #[inline]
    pub fn in_range(&self, pos: u32) -> bool {
        pos >= self.road_start && pos <= self.road_end
    }

    // ── State access ──────────────────────────────────────────────────────

    #[inline]
    pub fn road(&self) -> &Road {
        &self.road
    }

    /// Number of owned vehicles.
    #[inline]
    pub fn vehicle_count(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[inline]
    pub fn vehicle(&self, key: VehicleKey) -> &Vehicle {
        &self.vehicles[key]
    }

    #[inline]
    pub fn vehicle_mut(&mut self, key: VehicleKey) -> &mut Vehicle {
        &mut self.vehicles[key]
    }

    /// Owned vehicles in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Vehicle> {
        self.order.iter().map(|&k| &self.vehicles[k])
    }

    /// Snapshot of the sweep order.  Sweeps mutate the arena as they go, so
    /// they iterate over a copied key list.
    pub fn sweep_keys(&self) -> Vec<VehicleKey> {
        self.order.clone()
    }

    /// The lowest occupied position on `lane` (for the upstream-bound ghost).
    #[inline]
    pub fn head_most(&self, lane: LaneId) -> Option<u32> {
        self.road.head_most(lane)
    }

    /// The highest occupied position on `lane` (for the downstream-bound ghost).
    #[inline]
    pub fn tail_most(&self, lane: LaneId) -> Option<u32> {
        self.road.tail_most(lane)
    }

    // ── Mutating primitives ───────────────────────────────────────────────

    /// Take ownership of `vehicle`, placing it at its carried lane/position.
    ///
    /// Used for worker-0 inflow and for hand-off arrivals alike.
    ///
    /// # Errors
    /// `OutOfRange` if the position is outside the partition,
    /// `CellCollision` if the cell is taken.  On error the vehicle is not
    /// inserted anywhere.
    pub fn spawn(&mut self, vehicle: Vehicle) -> RoadResult<VehicleKey> {
        let (lane, pos) = (vehicle.lane, vehicle.position);
        let key = self.vehicles.insert(vehicle);
        if let Err(e) = self.road.place_vehicle(lane, pos, key) {
            self.vehicles.remove(key);
            return Err(e);
        }
        self.order.push(key);
        Ok(key)
    }

    /// Release `key` from this partition, returning the vehicle by value.
    ///
    /// `cell_pos` names the cell the vehicle still occupies, which during
    /// the move sweep differs from its (already advanced) position.  This is
    /// the serialization point of a hand-off and the removal point of a
    /// finished vehicle.
    pub fn extract(&mut self, key: VehicleKey, cell_pos: u32) -> RoadResult<Vehicle> {
        let lane = self.vehicles[key].lane;
        self.road.remove_vehicle(lane, cell_pos)?;
        self.order.retain(|&k| k != key);
        Ok(self
            .vehicles
            .remove(key)
            .expect("arena entry vanished under a live key"))
    }

    /// Move `key`'s cell entry from `old_pos` to its current position.
    pub fn relocate(&mut self, key: VehicleKey, old_pos: u32) -> RoadResult<()> {
        let (lane, new_pos) = {
            let v = &self.vehicles[key];
            (v.lane, v.position)
        };
        if new_pos == old_pos {
            return Ok(());
        }
        self.road.remove_vehicle(lane, old_pos)?;
        self.road.place_vehicle(lane, new_pos, key)
    }

    /// Claim the same-position cell on the other lane and flip the vehicle's
    /// lane.  The claim re-checks occupancy so it is atomic against the cell
    /// map even though the decision was taken earlier in the sweep.
    pub fn switch_lane(&mut self, key: VehicleKey) -> RoadResult<()> {
        let (from, pos) = {
            let v = &self.vehicles[key];
            (v.lane, v.position)
        };
        let to = from.other();
        self.road.place_vehicle(to, pos, key)?;
        self.road.remove_vehicle(from, pos)?;
        self.vehicles[key].lane = to;
        Ok(())
    }

    /// Recompute every owned vehicle's gaps against the current cell map and
    /// the tick's ghost positions (sweep 1 and sweep 3 of the local update).
    pub fn refresh_gaps(&mut self, ghosts: &NeighborView) {
        for &key in &self.order {
            if let Some(v) = self.vehicles.get_mut(key) {
                v.update_gaps(&self.road, ghosts);
            }
        }
    }
}
