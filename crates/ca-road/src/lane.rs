//! One lane: a fixed row of cells over the partition's position range.

use ca_core::LaneId;

use crate::{RoadError, RoadResult, VehicleKey};

/// A single lane of the partition's road segment.
///
/// Cells are addressed by *global* road position; the lane internally offsets
/// into its vector.  Each cell holds at most one vehicle key.
///
/// Invariant: two vehicles never occupy the same cell, enforced by
/// [`Lane::place`] refusing occupied cells.  Because storage *is* the
/// position axis, vehicle positions are trivially strictly increasing with
/// storage order.
pub struct Lane {
    id: LaneId,
    /// First global position covered by this lane (the partition's
    /// `road_start`).
    start: u32,
    cells: Vec<Option<VehicleKey>>,
}

impl Lane {
    /// Create an empty lane covering global positions `start..=end`.
    pub fn new(id: LaneId, start: u32, end: u32) -> Self {
        let len = (end - start + 1) as usize;
        Self {
            id,
            start,
            cells: vec![None; len],
        }
    }

    #[inline]
    pub fn id(&self) -> LaneId {
        self.id
    }

    /// First global position covered.
    #[inline]
    pub fn start(&self) -> u32 {
        self.start
    }

    /// Last global position covered (inclusive).
    #[inline]
    pub fn end(&self) -> u32 {
        self.start + self.cells.len() as u32 - 1
    }

    /// `true` if `pos` falls inside this lane's range.
    #[inline]
    pub fn in_range(&self, pos: u32) -> bool {
        pos >= self.start && pos <= self.end()
    }

    #[inline]
    fn idx(&self, pos: u32) -> usize {
        (pos - self.start) as usize
    }

    /// `true` if the cell at `pos` holds a vehicle.  Positions outside the
    /// range are reported as free; range checks belong to `place`/`remove`.
    #[inline]
    pub fn cell_occupied(&self, pos: u32) -> bool {
        self.in_range(pos) && self.cells[self.idx(pos)].is_some()
    }

    /// The key occupying `pos`, if any.
    #[inline]
    pub fn occupant(&self, pos: u32) -> Option<VehicleKey> {
        if self.in_range(pos) {
            self.cells[self.idx(pos)]
        } else {
            None
        }
    }

    /// Put `key` into the cell at `pos`.
    ///
    /// # Errors
    /// `OutOfRange` if `pos` is not covered, `CellCollision` if occupied.
    pub fn place(&mut self, pos: u32, key: VehicleKey) -> RoadResult<()> {
        if !self.in_range(pos) {
            return Err(RoadError::OutOfRange {
                position: pos,
                start: self.start,
                end: self.end(),
            });
        }
        let idx = self.idx(pos);
        if self.cells[idx].is_some() {
            return Err(RoadError::CellCollision {
                lane: self.id,
                position: pos,
            });
        }
        self.cells[idx] = Some(key);
        Ok(())
    }

    /// Clear the cell at `pos`, returning the key that was there.
    ///
    /// # Errors
    /// `OutOfRange` if `pos` is not covered, `CellEmpty` if nothing is there.
    pub fn remove(&mut self, pos: u32) -> RoadResult<VehicleKey> {
        if !self.in_range(pos) {
            return Err(RoadError::OutOfRange {
                position: pos,
                start: self.start,
                end: self.end(),
            });
        }
        let idx = self.idx(pos);
        self.cells[idx].take().ok_or(RoadError::CellEmpty {
            lane: self.id,
            position: pos,
        })
    }

    // ── Gap scans ─────────────────────────────────────────────────────────

    /// Position of the first occupied cell in `from_pos+1 ..= from_pos+max_distance`,
    /// clipped to the lane's range.
    pub fn scan_forward(&self, from_pos: u32, max_distance: u32) -> Option<u32> {
        let lo = from_pos.saturating_add(1).max(self.start);
        let hi = from_pos.saturating_add(max_distance).min(self.end());
        (lo..=hi).find(|&p| self.cells[self.idx(p)].is_some())
    }

    /// Position of the first occupied cell in `from_pos−max_distance ..= from_pos−1`,
    /// scanning from `from_pos−1` downwards, clipped to the lane's range.
    pub fn scan_backward(&self, from_pos: u32, max_distance: u32) -> Option<u32> {
        if from_pos <= self.start {
            return None;
        }
        let hi = (from_pos - 1).min(self.end());
        let lo = from_pos.saturating_sub(max_distance).max(self.start);
        (lo..=hi).rev().find(|&p| self.cells[self.idx(p)].is_some())
    }

    /// The lowest occupied position (nearest the upstream boundary), if any.
    pub fn first_occupied_from_head(&self) -> Option<u32> {
        self.cells
            .iter()
            .position(Option::is_some)
            .map(|i| self.start + i as u32)
    }

    /// The highest occupied position (nearest the downstream boundary), if any.
    pub fn first_occupied_from_tail(&self) -> Option<u32> {
        self.cells
            .iter()
            .rposition(Option::is_some)
            .map(|i| self.start + i as u32)
    }

    /// Number of occupied cells.
    pub fn vehicle_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// `true` if no cell holds a vehicle.
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }
}
