use thiserror::Error;

use crate::{RaceId, RaceStatus, VehicleId};

#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("invalid state: {0}")]
    InvalidState(#[from] InvalidState),

    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

/// An operation was attempted on a race or vehicle whose status forbids it.
#[derive(Debug, Error, PartialEq)]
pub enum InvalidState {
    #[error("race {race_id} is {actual:?}, expected {expected:?}")]
    RaceStatus {
        race_id: RaceId,
        expected: RaceStatus,
        actual: RaceStatus,
    },

    #[error("race {0} still has vehicles on the course")]
    RaceNotComplete(RaceId),

    #[error("race {0} is already running; only one race may run at a time")]
    AnotherRaceRunning(RaceId),

    #[error("race {0} has no vehicles entered")]
    EmptyRoster(RaceId),

    #[error("vehicle {0} is already entered")]
    DuplicateVehicle(VehicleId),

    #[error("vehicle {vehicle_id} is not entered in race {race_id}")]
    UnknownVehicle {
        vehicle_id: VehicleId,
        race_id: RaceId,
    },

    #[error("vehicle {vehicle_id} belongs to race {owner}, not {race_id}")]
    ForeignVehicle {
        vehicle_id: VehicleId,
        race_id: RaceId,
        owner: RaceId,
    },
}

/// Malformed vehicle or race parameters, caught before anything enters the engine.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigurationError {
    #[error("vehicle {vehicle_id}: speed must be finite and positive, got {speed}")]
    InvalidSpeed { vehicle_id: VehicleId, speed: f64 },

    #[error("vehicle {vehicle_id}: {field} must lie in [0, 1], got {value}")]
    InvalidProbability {
        vehicle_id: VehicleId,
        field: &'static str,
        value: f64,
    },

    #[error("vehicle {vehicle_id}: combined malfunction probability {total} exceeds 1")]
    ProbabilityOverflow { vehicle_id: VehicleId, total: f64 },

    #[error("vehicle {vehicle_id}: repair length must be at least one hour")]
    ZeroRepairLength { vehicle_id: VehicleId },

    #[error("track distance must be finite and positive, got {0}")]
    InvalidTrackDistance(f64),
}
