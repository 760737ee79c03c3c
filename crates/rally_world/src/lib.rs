//! Roster loading and race setup shared between `rally_cli` and `rally_daemon`.

pub mod report;

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use rally_core::{Race, RaceId, Vehicle, VehicleClass, VehicleId, DEFAULT_TRACK_DISTANCE_KM};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterFile {
    pub race: RaceDef,
    pub entries: Vec<EntryDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceDef {
    pub name: String,
    pub year: i32,
    #[serde(default = "default_track_distance")]
    pub track_distance: f64,
}

fn default_track_distance() -> f64 {
    DEFAULT_TRACK_DISTANCE_KM
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryDef {
    pub team_name: String,
    pub model: String,
    pub class: VehicleClass,
    #[serde(default)]
    pub manufactured_on: Option<NaiveDate>,
    /// Per-entry deviations from the class presets.
    #[serde(default)]
    pub overrides: EntryOverrides,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryOverrides {
    pub speed: Option<f64>,
    pub malfunction_probability: Option<f64>,
    pub heavy_malfunction_probability: Option<f64>,
    pub repairment_length: Option<u32>,
}

pub fn load_roster(path: &Path) -> Result<RosterFile> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading roster file: {}", path.display()))?;
    let roster: RosterFile = serde_json::from_str(&json)
        .with_context(|| format!("parsing roster file: {}", path.display()))?;
    Ok(roster)
}

/// Builds a `Created` race from a roster. Ids are minted from `rng` so the same
/// seed always produces the same race (and therefore the same draw order).
///
/// Every entry goes through `Race::add_vehicle`, so malformed parameters are
/// reported here rather than inside the simulation.
pub fn build_race(roster: &RosterFile, now: DateTime<Utc>, rng: &mut impl Rng) -> Result<Race> {
    let race_id = RaceId::generate(rng);
    let mut race = Race::new(
        race_id,
        roster.race.name.clone(),
        roster.race.year,
        roster.race.track_distance,
        now,
    )
    .with_context(|| format!("race '{}'", roster.race.name))?;

    for (idx, entry) in roster.entries.iter().enumerate() {
        let vehicle = build_vehicle(entry, race_id, VehicleId::generate(rng));
        race.add_vehicle(vehicle)
            .with_context(|| format!("roster entry {idx} ('{}')", entry.team_name))?;
    }

    Ok(race)
}

fn build_vehicle(entry: &EntryDef, race_id: RaceId, vehicle_id: VehicleId) -> Vehicle {
    let mut vehicle = Vehicle::from_class(
        vehicle_id,
        race_id,
        entry.class,
        entry.team_name.clone(),
        entry.model.clone(),
    );
    vehicle.manufactured_on = entry.manufactured_on;

    let o = &entry.overrides;
    if let Some(speed) = o.speed {
        vehicle.speed = speed;
    }
    if let Some(p) = o.malfunction_probability {
        vehicle.malfunction_probability = p;
    }
    if let Some(p) = o.heavy_malfunction_probability {
        vehicle.heavy_malfunction_probability = p;
    }
    if let Some(hours) = o.repairment_length {
        vehicle.repairment_length = hours;
    }
    vehicle
}

const TEAM_PREFIXES: [&str; 8] = [
    "Desert", "Dune", "Sahara", "Atlas", "Mirage", "Sandstorm", "Oasis", "Canyon",
];

/// Procedurally generates a roster of `vehicle_count` entries with random classes.
pub fn generate_roster(
    name: &str,
    year: i32,
    track_distance: f64,
    vehicle_count: usize,
    rng: &mut impl Rng,
) -> RosterFile {
    let entries = (1..=vehicle_count)
        .map(|n| {
            let class = VehicleClass::ALL[rng.gen_range(0..VehicleClass::ALL.len())];
            let prefix = TEAM_PREFIXES[rng.gen_range(0..TEAM_PREFIXES.len())];
            EntryDef {
                team_name: format!("{prefix} Racing {n:02}"),
                model: format!("{} Mk{}", class.label(), rng.gen_range(1..=5)),
                class,
                manufactured_on: None,
                overrides: EntryOverrides::default(),
            }
        })
        .collect();

    RosterFile {
        race: RaceDef {
            name: name.to_string(),
            year,
            track_distance,
        },
        entries,
    }
}
