use crate::vehicle::advance;
use crate::{EngineError, EventEnvelope, RaceStatus, RandomSource, Race};

/// Advance a running race by one simulated hour.
///
/// Order of operations:
/// 1. Bump the logical clock (`elapsed_hours`); the new value is the hour
///    stamped on malfunctions and events.
/// 2. Sort the roster by vehicle id so draws are taken in a fixed order.
/// 3. Advance every vehicle independently.
///
/// Race completion is left to the caller (`Race::is_complete` / `Race::complete`).
/// Returns all events produced this hour.
pub fn simulate_hour(
    race: &mut Race,
    rng: &mut impl RandomSource,
) -> Result<Vec<EventEnvelope>, EngineError> {
    race.expect_status(RaceStatus::Running)?;

    race.elapsed_hours += 1;
    let hour = race.elapsed_hours;
    let track_distance = race.track_distance;

    race.vehicles.sort_by_key(|vehicle| vehicle.id);

    let mut events = Vec::new();
    for vehicle in &mut race.vehicles {
        advance(vehicle, track_distance, hour, rng, &mut events);
    }
    Ok(events)
}
