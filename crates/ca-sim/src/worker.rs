//! The per-rank simulation driver: bootstrap, the tick loop, the local
//! update (phase Ⓑ), the spawn phase (Ⓓ), and the end-of-run gather.

use ca_comm::{Communicator, Message, broadcast_config, divide_road};
use ca_core::{LaneId, Rank, SimConfig, Tick, VehicleId, WorkerRng};
use ca_road::{NeighborView, Partition, RoadError, Vehicle};
use ca_stats::Statistic;

use crate::observer::{DiscardReason, SimObserver, TickStats};
use crate::spawn::SpawnPolicy;
use crate::SimResult;

/// One worker of the simulation: a partition of the road, its link
/// endpoints, and everything needed to run the five-phase tick.
///
/// `C` is the transport (see [`ca_comm::LocalGroup`] for the in-process
/// one); `S` decides the inflow on worker 0.
pub struct Worker<C: Communicator, S: SpawnPolicy> {
    pub(crate) config: SimConfig,
    pub(crate) comm: C,
    pub(crate) partition: Partition,
    pub(crate) rng: WorkerRng,
    pub(crate) spawn_policy: S,
    /// The tick currently being computed (advances after the barrier).
    pub(crate) now: Tick,
    /// Next vehicle id; only worker 0 allocates during the run.
    pub(crate) next_id: u32,
    pub(crate) travel_time: Statistic,
    /// Vehicles past `road_end` awaiting hand-off, staged during phases Ⓑ/Ⓒ.
    pub(crate) outbound: Vec<Vehicle>,
    /// This tick's ghost positions, refreshed by phase Ⓐ.
    pub(crate) view: NeighborView,
}

impl<C: Communicator, S: SpawnPolicy> Worker<C, S> {
    // ── Bootstrap ─────────────────────────────────────────────────────────

    /// Build a worker from a fresh communicator.
    ///
    /// Rank 0 passes `Some(config)` (loaded from disk by the launcher); it
    /// is validated there, broadcast to everyone, and the road is divided.
    ///
    /// # Errors
    /// Configuration and partition-underflow problems are fatal, as is any
    /// transport failure.
    pub fn bootstrap(mut comm: C, config: Option<SimConfig>, spawn_policy: S) -> SimResult<Self> {
        if let Some(cfg) = &config {
            cfg.validate()?;
        }
        let config = broadcast_config(&mut comm, config)?;
        let (road_start, road_end) = divide_road(&mut comm, config.length)?;

        let rank = comm.rank();
        let partition = Partition::new(rank, comm.num_workers(), road_start, road_end);
        let rng = WorkerRng::new(config.seed, rank);

        Ok(Self {
            config,
            comm,
            partition,
            rng,
            spawn_policy,
            now: Tick::ZERO,
            next_id: 0,
            travel_time: Statistic::new(),
            outbound: Vec::new(),
            view: NeighborView::EMPTY,
        })
    }

    /// Place a vehicle before the first tick (scenario setup, tests).
    ///
    /// Uses this worker's id counter; runs that seed vehicles on several
    /// workers should keep the spawning policy quiet or accept that ids are
    /// only unique per worker.
    pub fn seed_vehicle(&mut self, lane: LaneId, position: u32, speed: u32) -> SimResult<VehicleId> {
        let id = VehicleId(self.next_id);
        self.next_id += 1;
        self.partition
            .spawn(Vehicle::new(id, lane, position, speed, &self.config))?;
        Ok(id)
    }

    // ── Read access (launchers, tests) ────────────────────────────────────

    #[inline]
    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    #[inline]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// The next tick to be computed.
    #[inline]
    pub fn now(&self) -> Tick {
        self.now
    }

    /// The local (or, on the aggregator after the gather, merged)
    /// travel-time statistic.
    #[inline]
    pub fn travel_time(&self) -> &Statistic {
        &self.travel_time
    }

    // ── Tick loop ─────────────────────────────────────────────────────────

    /// Run from the current tick to `config.max_time`, then gather the
    /// travel-time statistics to the last rank.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        while self.now < self.config.end_tick() {
            self.step(observer)?;
        }
        self.finish(observer)
    }

    /// Run exactly one tick: phases Ⓐ through Ⓔ.
    ///
    /// Public so tests and incremental drivers can step the protocol; every
    /// worker of the group must step in lockstep or the collectives will
    /// stall.
    pub fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        observer.on_tick_start(self.now);
        let mut stats = TickStats::default();

        // Ⓐ boundary exchange
        self.view = self.exchange_boundaries(observer)?;

        // Ⓑ local update
        self.local_update(observer, &mut stats)?;

        // Ⓒ vehicle hand-off
        self.handoff_loop(observer, &mut stats)?;

        // Ⓓ spawn at the inflow
        if self.partition.is_first() {
            self.spawn_phase(observer, &mut stats)?;
        }

        stats.owned = self.partition.vehicle_count();
        observer.on_tick_end(self.now, &stats);

        // Ⓔ barrier closes the tick
        self.comm.barrier()?;
        self.now = self.now + 1;
        Ok(())
    }

    // ── Phase Ⓑ: local update ─────────────────────────────────────────────

    /// Four sweeps in insertion order: gaps, lane switches, gaps, moves.
    ///
    /// The sweeps are phase barriers — every vehicle finishes one sweep
    /// before any vehicle starts the next — so evaluation order inside a
    /// sweep cannot change the outcome; the only shared state a sweep writes
    /// is the cell map, and switch targets are claimed atomically there.
    fn local_update<O: SimObserver>(
        &mut self,
        observer: &mut O,
        stats: &mut TickStats,
    ) -> SimResult<()> {
        // Sweep 1+2: gaps, then switch decisions against those gaps.
        self.partition.refresh_gaps(&self.view);
        for key in self.partition.sweep_keys() {
            let wants = self
                .partition
                .vehicle(key)
                .wants_lane_switch(self.partition.road(), &mut self.rng);
            if wants {
                match self.partition.switch_lane(key) {
                    Ok(()) => {}
                    // Claim lost: the cell map wins, the vehicle stays put.
                    Err(RoadError::CellCollision { .. }) => {}
                    Err(e) => return Err(e.into()),
                }
            }
        }

        // Sweep 3+4: fresh gaps (lanes changed), then moves.
        self.partition.refresh_gaps(&self.view);
        for key in self.partition.sweep_keys() {
            let (old_pos, new_pos) = {
                let v = self.partition.vehicle_mut(key);
                let old = v.position;
                (old, v.advance(&mut self.rng))
            };

            if new_pos >= self.config.length {
                // Off the end of the global road.
                let vehicle = self.partition.extract(key, old_pos)?;
                self.retire_vehicle(vehicle, observer, stats);
            } else if new_pos > self.partition.road_end() {
                // Crossed into a downstream partition: stage for phase Ⓒ.
                let vehicle = self.partition.extract(key, old_pos)?;
                self.outbound.push(vehicle);
            } else {
                self.partition.relocate(key, old_pos)?;
            }
        }
        Ok(())
    }

    /// A vehicle has left the global road on this worker.
    ///
    /// The travel-time sample is recorded only on the aggregator (last
    /// rank), and only for ticks strictly after the warm-up window — the
    /// comparison uses the just-completed tick number, i.e. `now + 1`.
    pub(crate) fn retire_vehicle<O: SimObserver>(
        &mut self,
        vehicle: Vehicle,
        observer: &mut O,
        stats: &mut TickStats,
    ) {
        let travel_time = vehicle.travel_time(self.config.step_size);
        let completed = self.now + 1;
        if self.partition.is_last() && completed.0 > self.config.warmup_time {
            self.travel_time.add_value(travel_time);
        }
        stats.finished += 1;
        observer.on_vehicle_finished(vehicle.id, travel_time, self.now);
    }

    // ── Phase Ⓓ: spawn ────────────────────────────────────────────────────

    /// Admit the policy's proposals at the inflow (worker 0 only).
    ///
    /// Admission rejects cells that are occupied, outside the partition, or
    /// shadowed by the downstream ghost — the ghost counts as an occupied
    /// cell, so an inflow backed up across the first boundary stays closed.
    pub(crate) fn spawn_phase<O: SimObserver>(
        &mut self,
        observer: &mut O,
        stats: &mut TickStats,
    ) -> SimResult<()> {
        let requests = self
            .spawn_policy
            .plan_spawns(self.now, &self.config, &mut self.rng);

        for req in requests {
            let blocked = !self.partition.in_range(req.position)
                || self.partition.road().cell_occupied(req.lane, req.position)
                || self.view.last(req.lane) == Some(req.position);
            if blocked {
                observer.on_discard(&DiscardReason::CellOccupied {
                    lane: req.lane,
                    position: req.position,
                });
                continue;
            }

            let id = VehicleId(self.next_id);
            self.next_id += 1;
            let vehicle = Vehicle::new(id, req.lane, req.position, req.speed, &self.config);
            match self.partition.spawn(vehicle) {
                Ok(_) => {
                    stats.spawned += 1;
                    observer.on_vehicle_spawned(id, req.lane, self.now);
                }
                Err(RoadError::CellCollision { lane, position }) => {
                    observer.on_discard(&DiscardReason::CellOccupied { lane, position });
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    // ── End of run: statistics gather ─────────────────────────────────────

    /// Ship raw samples to the last rank; the last rank absorbs everyone's.
    ///
    /// Called by [`run`][Self::run] after the final tick.  Drivers that step
    /// the protocol manually call this once at the end, on every worker.
    pub fn finish<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let last = Rank(self.partition.num_workers() as u32 - 1);
        if self.partition.is_last() {
            for r in 0..last.index() {
                let samples = self.recv_samples(Rank(r as u32), observer)?;
                self.travel_time.absorb(&samples);
            }
        } else {
            let samples = self.travel_time.samples().to_vec();
            self.comm.send(last, Message::Samples(samples))?;
        }
        observer.on_sim_end(self.now, &self.travel_time);
        Ok(())
    }

    fn recv_samples<O: SimObserver>(
        &mut self,
        from: Rank,
        observer: &mut O,
    ) -> SimResult<Vec<f64>> {
        loop {
            match self.comm.recv(from)? {
                Message::Samples(samples) => return Ok(samples),
                other => observer.on_discard(&DiscardReason::UnexpectedMessage {
                    want: "Samples",
                    got: other.kind(),
                }),
            }
        }
    }
}
