//! Per-vehicle transition rules for one simulated hour.

use crate::{
    emit, ConfigurationError, Event, EventEnvelope, Malfunction, MalfunctionKind, RandomSource,
    Vehicle, VehicleStatus,
};

/// Advance one vehicle by one simulated hour.
///
/// - Terminal vehicles (finished, or broken with no repair pending) and vehicles
///   still `Ready` are left untouched and consume no draw.
/// - `Running`: exactly one draw. Below `malfunction_probability` is a light
///   malfunction, below the light + heavy sum a heavy one; either way the vehicle
///   covers no distance this hour. Otherwise it moves `speed` and finishes once
///   `distance_covered >= track_distance`.
/// - `Broken` under repair: the countdown drops by one; at zero the vehicle is
///   `Running` again. The hour is spent on the repair, so no distance is added.
pub fn advance(
    vehicle: &mut Vehicle,
    track_distance: f64,
    hour: u64,
    rng: &mut impl RandomSource,
    events: &mut Vec<EventEnvelope>,
) {
    match vehicle.status {
        VehicleStatus::Running => drive(vehicle, track_distance, hour, rng, events),
        VehicleStatus::Broken if vehicle.remaining_repair_hours > 0 => {
            repair(vehicle, hour, events);
        }
        VehicleStatus::Ready | VehicleStatus::Broken | VehicleStatus::CompletedRace => {}
    }
}

fn drive(
    vehicle: &mut Vehicle,
    track_distance: f64,
    hour: u64,
    rng: &mut impl RandomSource,
    events: &mut Vec<EventEnvelope>,
) {
    let roll = rng.next_unit();

    let malfunction = if roll < vehicle.malfunction_probability {
        Some(MalfunctionKind::Light)
    } else if roll < vehicle.malfunction_probability + vehicle.heavy_malfunction_probability {
        Some(MalfunctionKind::Heavy)
    } else {
        None
    };

    if let Some(kind) = malfunction {
        vehicle.status = VehicleStatus::Broken;
        vehicle.remaining_repair_hours = match kind {
            MalfunctionKind::Light => vehicle.repairment_length,
            MalfunctionKind::Heavy => 0,
        };
        vehicle.malfunctions.push(Malfunction { kind, hour });
        events.push(emit(
            hour,
            Event::MalfunctionOccurred {
                vehicle_id: vehicle.id,
                kind,
            },
        ));
        return;
    }

    vehicle.distance_covered += vehicle.speed;
    if vehicle.distance_covered >= track_distance {
        vehicle.status = VehicleStatus::CompletedRace;
        vehicle.finished_at_hour = Some(hour);
        events.push(emit(
            hour,
            Event::VehicleFinished {
                vehicle_id: vehicle.id,
                distance_covered: vehicle.distance_covered,
            },
        ));
    }
}

fn repair(vehicle: &mut Vehicle, hour: u64, events: &mut Vec<EventEnvelope>) {
    vehicle.remaining_repair_hours -= 1;
    if vehicle.remaining_repair_hours == 0 {
        vehicle.status = VehicleStatus::Running;
        events.push(emit(
            hour,
            Event::RepairCompleted {
                vehicle_id: vehicle.id,
            },
        ));
    }
}

/// Rejects vehicle parameters the engine cannot simulate meaningfully.
pub fn validate_vehicle(vehicle: &Vehicle) -> Result<(), ConfigurationError> {
    let vehicle_id = vehicle.id;

    if !vehicle.speed.is_finite() || vehicle.speed <= 0.0 {
        return Err(ConfigurationError::InvalidSpeed {
            vehicle_id,
            speed: vehicle.speed,
        });
    }

    for (field, value) in [
        ("malfunction_probability", vehicle.malfunction_probability),
        (
            "heavy_malfunction_probability",
            vehicle.heavy_malfunction_probability,
        ),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigurationError::InvalidProbability {
                vehicle_id,
                field,
                value,
            });
        }
    }

    let total = vehicle.malfunction_probability + vehicle.heavy_malfunction_probability;
    if total > 1.0 {
        return Err(ConfigurationError::ProbabilityOverflow { vehicle_id, total });
    }

    if vehicle.repairment_length == 0 {
        return Err(ConfigurationError::ZeroRepairLength { vehicle_id });
    }

    Ok(())
}
