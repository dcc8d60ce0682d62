//! Pluggable inflow policy for worker 0.
//!
//! The policy only *proposes* entries; admission (cell free, downstream
//! ghost not on the cell, position inside the partition) is enforced by the
//! spawn phase, so a sloppy policy cannot corrupt the road.

use ca_core::{LaneId, SimConfig, Tick, WorkerRng};

/// One proposed vehicle entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SpawnRequest {
    pub lane: LaneId,
    /// Global cell to enter at; inflow policies normally use the road's
    /// entry cell 0.
    pub position: u32,
    /// Initial speed, clamped to `config.max_speed` on admission.
    pub speed: u32,
}

/// Decides which vehicles try to enter the road each tick.
///
/// Called once per tick on worker 0 only.  All randomness must come from the
/// supplied `rng` so runs stay reproducible for a fixed seed and worker
/// count.
pub trait SpawnPolicy: Send {
    fn plan_spawns(
        &mut self,
        tick: Tick,
        config: &SimConfig,
        rng: &mut WorkerRng,
    ) -> Vec<SpawnRequest>;
}

/// The stock inflow: each lane's entry cell gets a fresh vehicle with
/// probability `prob` per tick, entering at rest.
pub struct InflowSpawner {
    pub prob: f64,
}

impl SpawnPolicy for InflowSpawner {
    fn plan_spawns(
        &mut self,
        _tick: Tick,
        _config: &SimConfig,
        rng: &mut WorkerRng,
    ) -> Vec<SpawnRequest> {
        let mut requests = Vec::new();
        for lane in LaneId::BOTH {
            if rng.gen_bool(self.prob) {
                requests.push(SpawnRequest {
                    lane,
                    position: 0,
                    speed: 0,
                });
            }
        }
        requests
    }
}

/// No inflow at all — closed-road scenarios and tests.
pub struct NoSpawn;

impl SpawnPolicy for NoSpawn {
    fn plan_spawns(
        &mut self,
        _tick: Tick,
        _config: &SimConfig,
        _rng: &mut WorkerRng,
    ) -> Vec<SpawnRequest> {
        Vec::new()
    }
}
