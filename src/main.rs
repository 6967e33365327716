//! cogsched - attention-weighted scheduling layer CLI
//!
//! Administrative and diagnostic tooling around the allocator: score
//! live processes, run synthetic admission/selection workloads, and
//! inspect allocator state.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use rand::Rng;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use cogsched::{
    AttentionAllocator, AttentionConfig, Feature, ProcHandle, RuntimeStats, StatSource,
    SysinfoStatSource,
};

#[derive(Parser)]
#[command(name = "cogsched")]
#[command(about = "Attention-weighted process scheduling layer", long_about = None)]
struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score live processes and show their attention placement
    Status {
        /// Number of top CPU consumers to track
        #[arg(short, long, default_value = "15")]
        top: usize,
    },

    /// Run a synthetic admission/selection workload
    Simulate {
        /// Scheduling ticks to run
        #[arg(short, long, default_value = "200")]
        ticks: u64,

        /// Synthetic processes to track
        #[arg(short, long, default_value = "12")]
        procs: usize,

        /// Engage emergency mode for the middle third of the run
        #[arg(long)]
        emergency_window: bool,
    },

    /// Print a diagnostic dump of allocator state
    Dump {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,

        /// Number of top CPU consumers to track before dumping
        #[arg(short, long, default_value = "15")]
        top: usize,
    },

    /// Show the active configuration as TOML
    Config,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Status { top } => {
            let allocator = AttentionAllocator::new(config);
            let tracked = track_live_processes(&allocator, top).await?;

            println!(
                "{:<8} {:<28} {:>6} {:>10} {:>7}",
                "PID", "NAME", "CPU%", "ATTENTION", "BUCKET"
            );
            for (pid, name, handle) in &tracked {
                let attention = allocator.attention(*handle);
                let load = allocator.feature(*handle, Feature::Load.index());
                let bucket = bucket_for(allocator.thresholds(), attention);
                println!(
                    "{:<8} {:<28} {:>6.1} {:>10.3} {:>7}",
                    pid,
                    truncated(name, 28),
                    load * 100.0,
                    attention,
                    bucket,
                );
            }
        }

        Commands::Simulate {
            ticks,
            procs,
            emergency_window,
        } => {
            simulate(config, ticks, procs, emergency_window);
        }

        Commands::Dump { json, top } => {
            let allocator = AttentionAllocator::new(config);
            track_live_processes(&allocator, top).await?;
            let dump = allocator.dump_state();
            if json {
                println!("{}", serde_json::to_string_pretty(&dump)?);
            } else {
                print!("{}", dump);
            }
        }

        Commands::Config => {
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

/// Load config from the given path, the platform config dir, or defaults.
fn load_config(path: Option<&std::path::Path>) -> Result<AttentionConfig, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return AttentionConfig::load(path);
    }
    let default_path = dirs::config_dir()
        .map(|dir| dir.join("cogsched").join("config.toml"));
    match default_path {
        Some(path) if path.exists() => AttentionConfig::load(&path),
        _ => Ok(AttentionConfig::default()),
    }
}

/// Register and admit the heaviest live CPU consumers once.
async fn track_live_processes(
    allocator: &AttentionAllocator,
    top: usize,
) -> Result<Vec<(u32, String, ProcHandle)>, Box<dyn std::error::Error>> {
    let mut source = SysinfoStatSource::new();
    source.refresh();
    // CPU usage needs two refresh cycles to produce deltas
    tokio::time::sleep(Duration::from_millis(250)).await;
    source.refresh();

    let mut tracked = Vec::new();
    for (pid, name, stats) in source.top_by_cpu(top) {
        let handle = match allocator.register(pid) {
            Ok(handle) => handle,
            Err(e) => {
                info!(pid, error = %e, "skipping process");
                continue;
            }
        };
        allocator.set_opted_in(handle, true);
        allocator.admit(handle, &stats, 1);
        tracked.push((pid, name, handle));
    }
    Ok(tracked)
}

/// Synthetic workload: random feature noise, per-tick admissions and a
/// selection drain, with an optional emergency window in the middle.
fn simulate(config: AttentionConfig, ticks: u64, procs: usize, emergency_window: bool) {
    let allocator = AttentionAllocator::new(config);
    let mut rng = rand::thread_rng();

    let handles: Vec<ProcHandle> = (0..procs)
        .filter_map(|i| {
            let handle = allocator.register(1000 + i as u32).ok()?;
            allocator.set_opted_in(handle, true);
            Some(handle)
        })
        .collect();

    let mut selections = vec![0usize; handles.len()];
    let mut deferred_ticks = 0u64;

    for tick in 1..=ticks {
        if emergency_window {
            if tick == ticks / 3 {
                allocator.set_emergency(true);
            } else if tick == 2 * ticks / 3 {
                allocator.set_emergency(false);
            }
        }

        for (i, handle) in handles.iter().enumerate() {
            let stats = RuntimeStats {
                cpu: rng.gen_range(0.0..1.0),
                priority: rng.gen_range(0..20),
                max_priority: 20,
                memory: Some(rng.gen_range(0.0..1.0)),
                io: Some(rng.gen_range(0.0..0.5)),
                network: None,
                realtime: Some(i % 5 == 0),
            };
            allocator.admit(*handle, &stats, tick);
        }

        match allocator.select_next(tick) {
            Some(selected) => {
                if let Some(i) = handles.iter().position(|h| *h == selected) {
                    selections[i] += 1;
                }
            }
            None => deferred_ticks += 1,
        }
    }

    println!("Simulated {} ticks over {} processes", ticks, handles.len());
    println!("Ticks deferred to the traditional scheduler: {}", deferred_ticks);
    for (i, count) in selections.iter().enumerate() {
        println!(
            "  Process {}: selected {} times, attention {:.3}",
            1000 + i,
            count,
            allocator.attention(handles[i]),
        );
    }
    print!("{}", allocator.dump_state());
}

fn bucket_for(thresholds: &[f32], score: f32) -> usize {
    thresholds
        .iter()
        .position(|t| score >= *t)
        .unwrap_or(thresholds.len().saturating_sub(1))
}

fn truncated(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        name.to_string()
    } else {
        let head: String = name.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
