use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use rally_core::{Clock, RaceStatus, RngSource, SystemClock, DEFAULT_TRACK_DISTANCE_KM};
use rally_daemon::{InMemoryRaceStore, JobHost, SchedulerConfig, SimulatorJob};
use rally_world::report::{render_leaderboard, status_line};
use rally_world::{build_race, generate_roster, load_roster};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Lower bound on the status print interval, whatever the tick pacing.
const MIN_STATUS_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Parser)]
#[command(name = "rally_daemon", about = "Off-road rally simulation daemon")]
struct Cli {
    /// Roster JSON file. Without it a roster is generated from the seed.
    #[arg(long)]
    roster: Option<PathBuf>,
    /// Number of vehicles in a generated roster.
    #[arg(long, default_value_t = 12)]
    vehicles: usize,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value_t = 2024)]
    year: i32,
    #[arg(long, default_value_t = DEFAULT_TRACK_DISTANCE_KM)]
    track_distance: f64,
    /// Scheduler config JSON file; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    warm_up_ms: Option<u64>,
    #[arg(long)]
    pacing_ms: Option<u64>,
    /// Keep the scheduler ticking after the race finishes (until Ctrl-C).
    #[arg(long)]
    keep_running: bool,
}

fn status_interval(config: &SchedulerConfig) -> Duration {
    config.pacing().max(MIN_STATUS_INTERVAL)
}

fn resolve_config(cli: &Cli) -> Result<SchedulerConfig> {
    let mut config = match &cli.config {
        Some(path) => SchedulerConfig::load(path)?,
        None => SchedulerConfig::default(),
    };
    if let Some(ms) = cli.warm_up_ms {
        config.warm_up_ms = ms;
    }
    if let Some(ms) = cli.pacing_ms {
        config.pacing_ms = ms;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    let seed = config.seed.unwrap_or_else(rand::random);
    let clock = SystemClock;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let roster = match &cli.roster {
        Some(path) => load_roster(path)?,
        None => generate_roster(
            "Dakar Rally",
            cli.year,
            cli.track_distance,
            cli.vehicles,
            &mut rng,
        ),
    };
    let race = build_race(&roster, clock.now(), &mut rng)?;
    let race_id = race.id;

    let store = Arc::new(InMemoryRaceStore::new());
    store.insert_race(&race)?;
    store.start_race(race_id, clock.now()).context("starting race")?;
    info!(%race_id, seed, vehicles = race.vehicles.len(), "race started");

    let job = Arc::new(SimulatorJob::new(
        Arc::clone(&store),
        RngSource::new(rng),
        clock,
        config.clone(),
    ));
    let host = JobHost::new();
    let handle = host.spawn(Arc::clone(&job))?;

    let status_every = status_interval(&config);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            result = &mut ctrl_c => {
                result.context("listening for ctrl-c")?;
                info!("shutdown requested");
                break;
            }
            () = tokio::time::sleep(status_every) => {
                let Some(current) = store.race(race_id) else { break };
                println!("{}", status_line(&current));
                if current.status == RaceStatus::Finished && !cli.keep_running {
                    break;
                }
            }
        }
    }

    handle.shutdown().await?;

    if let Some(race) = store.race(race_id) {
        print!("{}", render_leaderboard(&race));
    }
    println!("{}", serde_json::to_string_pretty(&job.stats())?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_interval_has_a_floor() {
        let mut config = SchedulerConfig {
            pacing_ms: 0,
            ..SchedulerConfig::default()
        };
        assert_eq!(status_interval(&config), MIN_STATUS_INTERVAL);

        config.pacing_ms = 2_000;
        assert_eq!(status_interval(&config), Duration::from_secs(2));
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scheduler.json");
        std::fs::write(&path, r#"{"warm_up_ms": 10, "pacing_ms": 20, "seed": 1}"#).unwrap();

        let cli = Cli::parse_from([
            "rally_daemon",
            "--config",
            path.to_str().unwrap(),
            "--pacing-ms",
            "0",
            "--seed",
            "9",
        ]);
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.warm_up_ms, 10);
        assert_eq!(config.pacing_ms, 0);
        assert_eq!(config.seed, Some(9));
    }
}
