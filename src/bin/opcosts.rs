use clap::{Parser, Subcommand};
use opcosts::benches;
use opcosts::harness::{self, HarnessConfig};
use opcosts::report;
use opcosts::resolve;
use opcosts::schema::{OpcostReport, RunMeta};
use opcosts::timer::{ClockSource, Timer};
use opcosts::Unit;
use std::fs;
use std::io;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
enum Command {
    /// Measure the catalog and print the overhead-calibrated report.
    Run {
        /// Restrict measurement to these report categories. Overhead
        /// sources the selection depends on are kept automatically.
        #[arg(long, value_name = "TAG", action = clap::ArgAction::Append)]
        category: Vec<String>,
    },

    /// List catalog candidates without measuring anything.
    List,
}

#[derive(Parser, Debug)]
#[command(name = "opcosts")]
#[command(about = "Micro-benchmark runner: isolated per-operation costs via overhead calibration")]
struct Args {
    /// Time unit for reported magnitudes.
    #[arg(long, value_enum, default_value_t = Unit::Ns, global = true)]
    unit: Unit,

    /// Logical operations per timed trial.
    #[arg(long, default_value_t = 100_000, global = true)]
    num_ops: u64,

    /// Independent trials per candidate; the minimum duration wins.
    #[arg(long, default_value_t = 10, global = true)]
    repetitions: u32,

    /// Seed for candidates with randomized fixture data.
    #[arg(long, default_value_t = 0, global = true)]
    seed: u64,

    /// Clock to time trials with. The wall clock is a degraded mode for
    /// platforms where the monotonic clock misbehaves; its coarser measured
    /// resolution is reported alongside the results.
    #[arg(long, value_enum, default_value_t = ClockSource::Monotonic, global = true)]
    clock: ClockSource,

    /// Where to write the JSON report in addition to the text table.
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

fn now_utc() -> String {
    // Avoid a chrono dependency; this is "good enough" for reports.
    use std::time::{SystemTime, UNIX_EPOCH};
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("unix:{secs}")
}

fn git_sha_short() -> Option<String> {
    // Best-effort: read from environment set by CI/build scripts.
    std::env::var("GIT_SHA")
        .ok()
        .or_else(|| std::env::var("GITHUB_SHA").ok())
        .map(|s| s.chars().take(12).collect())
}

fn main() -> io::Result<()> {
    let args = Args::parse();

    let category = match args.cmd {
        Command::List => {
            for candidate in benches::registry(args.seed, args.num_ops) {
                let spec = candidate.spec();
                println!(
                    "{:<55} categories={:?} tags={:?}",
                    spec.label(),
                    spec.categories,
                    spec.tags
                );
            }
            return Ok(());
        }
        Command::Run { category } => category,
    };

    let timer = Timer::with_source(args.clock);
    eprintln!(
        "clock: {} (resolution ~{} ns); num_ops={}, repetitions={}",
        timer.source().as_str(),
        timer.resolution().as_nanos(),
        args.num_ops,
        args.repetitions
    );

    let cfg = HarnessConfig {
        num_ops: args.num_ops,
        repetitions: args.repetitions,
        seed: args.seed,
    };
    let mut candidates = benches::select(benches::registry(cfg.seed, cfg.num_ops), &category);
    let mut measurements = harness::run_trials(&cfg, &timer, &mut candidates);
    resolve::resolve(&mut measurements).map_err(io::Error::other)?;

    let table = report::render(&measurements, args.unit, &benches::default_categories());
    print!("{table}");

    if let Some(out) = args.out {
        let run = RunMeta {
            schema_version: 1,
            bench_version: env!("CARGO_PKG_VERSION").to_string(),
            unit: args.unit.as_str().to_string(),
            num_ops: cfg.num_ops,
            repetitions: cfg.repetitions,
            seed: cfg.seed,
            clock_source: timer.source().as_str().to_string(),
            clock_resolution_ns: timer.resolution().as_nanos(),
            timestamp_utc: now_utc(),
            git_sha: git_sha_short(),
        };
        let json = serde_json::to_string_pretty(&OpcostReport::from_measurements(
            run,
            &measurements,
        ))
        .map_err(io::Error::other)?;
        fs::write(out, json)?;
    }

    Ok(())
}
