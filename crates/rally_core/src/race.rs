//! Race-level lifecycle: roster edits, start, completion.

use chrono::{DateTime, Utc};

use crate::{
    validate_vehicle, ConfigurationError, EngineError, InvalidState, Race, RaceId, RaceStatus,
    Vehicle, VehicleId, VehicleStatus,
};

impl Race {
    /// A new race in `Created` status with an empty roster.
    pub fn new(
        id: RaceId,
        name: impl Into<String>,
        year: i32,
        track_distance: f64,
        now: DateTime<Utc>,
    ) -> Result<Self, ConfigurationError> {
        if !track_distance.is_finite() || track_distance <= 0.0 {
            return Err(ConfigurationError::InvalidTrackDistance(track_distance));
        }
        Ok(Self {
            id,
            name: name.into(),
            year,
            track_distance,
            status: RaceStatus::Created,
            elapsed_hours: 0,
            created_at: now,
            started_at: None,
            finished_at: None,
            vehicles: Vec::new(),
        })
    }

    /// True iff every vehicle is terminal: finished, or broken beyond repair.
    ///
    /// Recomputed from vehicle state on every call; the race keeps no counter.
    pub fn is_complete(&self) -> bool {
        is_complete(&self.vehicles)
    }

    /// Enter a vehicle. Only allowed before the start.
    pub fn add_vehicle(&mut self, vehicle: Vehicle) -> Result<(), EngineError> {
        self.expect_status(RaceStatus::Created)?;
        if vehicle.race_id != self.id {
            return Err(InvalidState::ForeignVehicle {
                vehicle_id: vehicle.id,
                race_id: self.id,
                owner: vehicle.race_id,
            }
            .into());
        }
        validate_vehicle(&vehicle)?;
        match self.vehicles.binary_search_by(|v| v.id.cmp(&vehicle.id)) {
            Ok(_) => Err(InvalidState::DuplicateVehicle(vehicle.id).into()),
            Err(idx) => {
                self.vehicles.insert(idx, vehicle);
                Ok(())
            }
        }
    }

    /// Withdraw a vehicle. Only allowed before the start.
    pub fn remove_vehicle(&mut self, vehicle_id: VehicleId) -> Result<Vehicle, EngineError> {
        self.expect_status(RaceStatus::Created)?;
        let idx = self
            .vehicles
            .iter()
            .position(|v| v.id == vehicle_id)
            .ok_or(InvalidState::UnknownVehicle {
                vehicle_id,
                race_id: self.id,
            })?;
        Ok(self.vehicles.remove(idx))
    }

    /// `Created` → `Running`. Every `Ready` vehicle starts running.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), EngineError> {
        self.expect_status(RaceStatus::Created)?;
        if self.vehicles.is_empty() {
            return Err(InvalidState::EmptyRoster(self.id).into());
        }
        for vehicle in &self.vehicles {
            validate_vehicle(vehicle)?;
        }
        for vehicle in &mut self.vehicles {
            if vehicle.status == VehicleStatus::Ready {
                vehicle.status = VehicleStatus::Running;
            }
        }
        self.status = RaceStatus::Running;
        self.started_at = Some(now);
        Ok(())
    }

    /// `Running` → `Finished`, stamping the finish time.
    ///
    /// Fails if the race is not running (including when it already finished)
    /// or if any vehicle can still move.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<(), EngineError> {
        self.expect_status(RaceStatus::Running)?;
        if !self.is_complete() {
            return Err(InvalidState::RaceNotComplete(self.id).into());
        }
        self.status = RaceStatus::Finished;
        self.finished_at = Some(now);
        Ok(())
    }

    pub(crate) fn expect_status(&self, expected: RaceStatus) -> Result<(), InvalidState> {
        if self.status == expected {
            Ok(())
        } else {
            Err(InvalidState::RaceStatus {
                race_id: self.id,
                expected,
                actual: self.status,
            })
        }
    }
}

/// Completion predicate over a roster.
pub fn is_complete(vehicles: &[Vehicle]) -> bool {
    vehicles.iter().all(Vehicle::is_terminal)
}
