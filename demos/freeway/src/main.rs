//! freeway — run the two-lane CA traffic simulation on an in-process worker
//! group and report travel-time statistics.
//!
//! Usage: `freeway [config.json]` (defaults to `demos/freeway/config.json`).
//! Exit code 0 on normal completion; nonzero if the configuration cannot be
//! loaded.

use std::path::PathBuf;
use std::time::Instant;
use std::{env, fs, thread};

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use ca_comm::{Communicator, LocalGroup};
use ca_core::{Rank, SimConfig};
use ca_output::{CsvWriter, SimOutputObserver};
use ca_sim::{InflowSpawner, Worker};

// ── Configuration file ────────────────────────────────────────────────────────

/// The launcher-level configuration: worker count and inflow tuning around
/// the broadcast simulation record.
#[derive(Deserialize)]
struct DemoConfig {
    /// Number of workers in the group.
    workers: usize,
    /// Per-lane entry probability per tick at the inflow.
    spawn_prob: f64,
    /// Where per-rank CSV output lands.
    output_dir: PathBuf,
    /// The record broadcast to every worker.
    sim: SimConfig,
}

// ── Per-rank summary returned from the worker threads ─────────────────────────

struct RankReport {
    rank: u32,
    elapsed_secs: f64,
    owned_at_end: usize,
    samples: u64,
    mean: f64,
    std_dev: f64,
    is_aggregator: bool,
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    println!("================================================");
    println!("||    CELLULAR AUTOMATA TRAFFIC SIMULATION    ||");
    println!("================================================");

    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| "demos/freeway/config.json".into());
    let raw = fs::read_to_string(&path).with_context(|| format!("reading configuration {path}"))?;
    let demo: DemoConfig =
        serde_json::from_str(&raw).with_context(|| format!("parsing configuration {path}"))?;
    demo.sim.validate()?;
    if demo.workers == 0 {
        return Err(anyhow!("workers must be at least 1"));
    }

    println!(
        "Road: {} cells × 2 lanes  |  Workers: {}  |  Ticks: {} (warm-up {})",
        demo.sim.length, demo.workers, demo.sim.max_time, demo.sim.warmup_time
    );
    println!("Inflow: p={} per lane per tick  |  Seed: {}", demo.spawn_prob, demo.sim.seed);
    println!();

    let max_time = demo.sim.max_time;
    let handles: Vec<_> = LocalGroup::new(demo.workers)
        .into_iter()
        .map(|comm| {
            let sim = demo.sim.clone();
            let spawn_prob = demo.spawn_prob;
            let out_root = demo.output_dir.clone();
            thread::spawn(move || -> Result<RankReport> {
                let rank = comm.rank();
                let config = (rank == Rank(0)).then_some(sim);
                let mut worker =
                    Worker::bootstrap(comm, config, InflowSpawner { prob: spawn_prob })?;

                let dir = out_root.join(format!("rank_{}", rank.0));
                fs::create_dir_all(&dir)?;
                let writer = CsvWriter::new(&dir)?;
                let mut observer = SimOutputObserver::new(writer, rank);

                let t0 = Instant::now();
                worker.run(&mut observer)?;
                let elapsed_secs = t0.elapsed().as_secs_f64();

                if let Some(e) = observer.take_error() {
                    eprintln!("rank {}: output error: {e}", rank.0);
                }

                let stat = worker.travel_time();
                Ok(RankReport {
                    rank: rank.0,
                    elapsed_secs,
                    owned_at_end: worker.partition().vehicle_count(),
                    samples: stat.num_samples(),
                    mean: stat.mean(),
                    std_dev: stat.std_dev(),
                    is_aggregator: worker.partition().is_last(),
                })
            })
        })
        .collect();

    let mut reports = Vec::with_capacity(handles.len());
    for handle in handles {
        let report = handle
            .join()
            .map_err(|_| anyhow!("a worker thread panicked"))??;
        reports.push(report);
    }
    reports.sort_by_key(|r| r.rank);

    println!("--- Simulation Performance ---");
    for r in &reports {
        println!(
            "rank {}: total {:.3} s  |  {:.6} s/iter  |  {:.1} iter/s  |  {} vehicles still on road",
            r.rank,
            r.elapsed_secs,
            r.elapsed_secs / max_time as f64,
            max_time as f64 / r.elapsed_secs,
            r.owned_at_end,
        );
    }

    let aggregator = reports
        .iter()
        .find(|r| r.is_aggregator)
        .context("no aggregator rank in the report set")?;
    println!();
    println!("--- Simulation Results ---");
    println!(
        "time on road: avg={:.3} s, std={:.3} s, N={}",
        aggregator.mean, aggregator.std_dev, aggregator.samples
    );
    println!("per-rank CSV output in {}", demo.output_dir.display());

    Ok(())
}
