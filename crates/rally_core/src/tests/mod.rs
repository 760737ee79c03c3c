use super::*;
use crate::test_fixtures::{
    created_race, fixed_clock, make_rng, race_id, running_race, vehicle_id, vehicle_with,
};

mod simulate;

// --- Shared test helpers ------------------------------------------------

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

/// Runs `advance` once with a single scripted draw at hour `hour`.
fn advance_with_roll(
    vehicle: &mut Vehicle,
    track_distance: f64,
    hour: u64,
    roll: f64,
) -> Vec<EventEnvelope> {
    let mut rolls = ScriptedRolls::constant(roll);
    let mut events = Vec::new();
    advance(vehicle, track_distance, hour, &mut rolls, &mut events);
    events
}

fn broken_beyond_repair(n: u128) -> Vehicle {
    let mut vehicle = vehicle_with(n, 50.0, 0.0, 3);
    vehicle.status = VehicleStatus::Broken;
    vehicle.remaining_repair_hours = 0;
    vehicle.malfunctions.push(Malfunction {
        kind: MalfunctionKind::Heavy,
        hour: 1,
    });
    vehicle
}

fn finished(n: u128, track_distance: f64) -> Vehicle {
    let mut vehicle = vehicle_with(n, 50.0, 0.0, 3);
    vehicle.status = VehicleStatus::CompletedRace;
    vehicle.distance_covered = track_distance;
    vehicle.finished_at_hour = Some(2);
    vehicle
}
