//! Shared test fixtures for `rally_core` and downstream crates.
//!
//! Vehicle ids are `Uuid::from_u128(n)`, so the per-hour draw order is simply
//! ascending `n`.

use chrono::{DateTime, TimeZone, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

use crate::{
    FixedClock, Race, RaceId, RaceStatus, RngSource, Vehicle, VehicleClass, VehicleId,
    VehicleStatus,
};

pub fn race_id() -> RaceId {
    RaceId(Uuid::from_u128(0xdaca_2024))
}

pub fn vehicle_id(n: u128) -> VehicleId {
    VehicleId(Uuid::from_u128(n))
}

pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 5, 8, 0, 0)
        .single()
        .unwrap_or_default()
}

pub fn fixed_clock() -> FixedClock {
    FixedClock(epoch())
}

pub fn make_rng() -> RngSource<ChaCha8Rng> {
    RngSource::new(ChaCha8Rng::seed_from_u64(42))
}

/// A `Running` vehicle with explicit figures and no heavy malfunctions.
pub fn vehicle_with(
    n: u128,
    speed: f64,
    malfunction_probability: f64,
    repairment_length: u32,
) -> Vehicle {
    let mut vehicle = Vehicle::from_class(
        vehicle_id(n),
        race_id(),
        VehicleClass::TerrainCar,
        format!("Team {n}"),
        "Test Model",
    );
    vehicle.speed = speed;
    vehicle.malfunction_probability = malfunction_probability;
    vehicle.heavy_malfunction_probability = 0.0;
    vehicle.repairment_length = repairment_length;
    vehicle.status = VehicleStatus::Running;
    vehicle
}

/// A `Created` race with the given `Ready` roster.
pub fn created_race(track_distance: f64, mut vehicles: Vec<Vehicle>) -> Race {
    let mut race = Race {
        id: race_id(),
        name: "Test Rally".to_string(),
        year: 2024,
        track_distance,
        status: RaceStatus::Created,
        elapsed_hours: 0,
        created_at: epoch(),
        started_at: None,
        finished_at: None,
        vehicles: Vec::new(),
    };
    for vehicle in &mut vehicles {
        vehicle.status = VehicleStatus::Ready;
    }
    race.vehicles = vehicles;
    race
}

/// A `Running` race; vehicle statuses are kept as given.
pub fn running_race(track_distance: f64, vehicles: Vec<Vehicle>) -> Race {
    Race {
        id: race_id(),
        name: "Test Rally".to_string(),
        year: 2024,
        track_distance,
        status: RaceStatus::Running,
        elapsed_hours: 0,
        created_at: epoch(),
        started_at: Some(epoch()),
        finished_at: None,
        vehicles,
    }
}
