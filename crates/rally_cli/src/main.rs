use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rally_core::{
    simulate_hour, statistics, Clock, Event, MalfunctionKind, RngSource, SystemClock,
    DEFAULT_TRACK_DISTANCE_KM,
};
use rally_world::report::{render_leaderboard, status_line};
use rally_world::{build_race, generate_roster, load_roster, RosterFile};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "rally_cli", about = "Off-road rally simulator CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a race hour by hour until every vehicle is done.
    Run {
        #[arg(long)]
        seed: Option<u64>,
        /// Load the roster from a JSON file. Mutually exclusive with --vehicles.
        #[arg(long, conflicts_with = "vehicles")]
        roster: Option<PathBuf>,
        /// Size of a generated roster.
        #[arg(long)]
        vehicles: Option<usize>,
        #[arg(long, default_value_t = 2024)]
        year: i32,
        #[arg(long, default_value_t = DEFAULT_TRACK_DISTANCE_KM)]
        track_distance: f64,
        /// Give up after this many simulated hours.
        #[arg(long, default_value_t = 10_000)]
        max_hours: u64,
        #[arg(long, default_value_t = 10)]
        print_every: u64,
        /// Write the final race state as JSON.
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Check a roster file without running it.
    Validate {
        #[arg(long)]
        roster: PathBuf,
    },
}

// ---------------------------------------------------------------------------
// Run loop
// ---------------------------------------------------------------------------

struct RunArgs {
    seed: Option<u64>,
    roster: Option<PathBuf>,
    vehicles: Option<usize>,
    year: i32,
    track_distance: f64,
    max_hours: u64,
    print_every: u64,
    save: Option<PathBuf>,
}

fn run(args: RunArgs) -> Result<()> {
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let clock = SystemClock;

    let roster: RosterFile = match &args.roster {
        Some(path) => load_roster(path)?,
        None => generate_roster(
            "Dakar Rally",
            args.year,
            args.track_distance,
            args.vehicles.unwrap_or(12),
            &mut rng,
        ),
    };
    let mut race = build_race(&roster, clock.now(), &mut rng)?;
    race.start(clock.now()).context("starting race")?;

    println!(
        "Starting race: {} {} seed={seed} vehicles={} track={:.0} km",
        race.name,
        race.year,
        race.vehicles.len(),
        race.track_distance,
    );
    println!("{}", "-".repeat(80));

    let mut source = RngSource::new(rng);
    let print_every = args.print_every.max(1);
    while !race.is_complete() {
        if race.elapsed_hours >= args.max_hours {
            bail!("race not finished after {} simulated hours", race.elapsed_hours);
        }
        let events = simulate_hour(&mut race, &mut source)?;

        for envelope in &events {
            if let Event::MalfunctionOccurred {
                vehicle_id,
                kind: MalfunctionKind::Heavy,
            } = &envelope.event
            {
                let team = race
                    .vehicles
                    .iter()
                    .find(|v| v.id == *vehicle_id)
                    .map_or("?", |v| v.team_name.as_str());
                println!("*** RETIRED: {team} at hour={:04} ***", envelope.hour);
            }
        }

        if race.elapsed_hours % print_every == 0 {
            println!("{}", status_line(&race));
        }
    }
    race.complete(clock.now())?;

    println!("{}", "-".repeat(80));
    println!("Done after {} simulated hours.", race.elapsed_hours);
    print!("{}", render_leaderboard(&race));
    println!("{}", serde_json::to_string_pretty(&statistics(&race))?);

    if let Some(path) = &args.save {
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(file, &race)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("Race written to {}", path.display());
    }

    Ok(())
}

fn validate(path: &Path) -> Result<()> {
    let roster = load_roster(path)?;
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let race = build_race(&roster, SystemClock.now(), &mut rng)?;
    println!(
        "{}: '{}' {} with {} vehicles on {:.0} km is valid",
        path.display(),
        race.name,
        race.year,
        race.vehicles.len(),
        race.track_distance,
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            seed,
            roster,
            vehicles,
            year,
            track_distance,
            max_hours,
            print_every,
            save,
        } => run(RunArgs {
            seed,
            roster,
            vehicles,
            year,
            track_distance,
            max_hours,
            print_every,
            save,
        })?,
        Commands::Validate { roster } => validate(&roster)?,
    }
    Ok(())
}
