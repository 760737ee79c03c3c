//! Type definitions for `rally_core`.
//!
//! Races, vehicles, malfunction records, events, and the ID newtypes that tie
//! them together.

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default course length of a rally, in kilometres.
pub const DEFAULT_TRACK_DISTANCE_KM: f64 = 10_000.0;

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! uuid_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub Uuid);

        impl $name {
            /// Mints an id from `rng`. A seeded rng yields the same ids in the
            /// same order, which fixes the per-hour draw order of a generated roster.
            pub fn generate(rng: &mut impl Rng) -> Self {
                Self(uuid::Builder::from_random_bytes(rng.gen()).into_uuid())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

uuid_id!(RaceId);
uuid_id!(VehicleId);

// ---------------------------------------------------------------------------
// Core enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleStatus {
    /// Entered in a race that has not started yet.
    Ready,
    Running,
    /// Either counting down a repair (`remaining_repair_hours > 0`) or out of
    /// the race for good (`remaining_repair_hours == 0`).
    Broken,
    CompletedRace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RaceStatus {
    Created,
    Running,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MalfunctionKind {
    /// Repairable: the vehicle sits out `repairment_length` hours.
    Light,
    /// Irrecoverable: the vehicle is out of the race.
    Heavy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleClass {
    Truck,
    TerrainCar,
    SportCar,
    CrossMotorcycle,
    SportMotorcycle,
}

/// Fixed per-class performance figures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassProfile {
    /// Kilometres per simulated hour.
    pub speed: f64,
    pub repairment_length: u32,
    pub light_malfunction_probability: f64,
    pub heavy_malfunction_probability: f64,
}

impl VehicleClass {
    pub const ALL: [VehicleClass; 5] = [
        VehicleClass::Truck,
        VehicleClass::TerrainCar,
        VehicleClass::SportCar,
        VehicleClass::CrossMotorcycle,
        VehicleClass::SportMotorcycle,
    ];

    pub fn profile(self) -> ClassProfile {
        let (speed, repairment_length, light, heavy) = match self {
            VehicleClass::Truck => (80.0, 7, 0.06, 0.04),
            VehicleClass::TerrainCar => (100.0, 5, 0.03, 0.01),
            VehicleClass::SportCar => (140.0, 5, 0.12, 0.02),
            VehicleClass::CrossMotorcycle => (85.0, 3, 0.03, 0.02),
            VehicleClass::SportMotorcycle => (130.0, 3, 0.18, 0.10),
        };
        ClassProfile {
            speed,
            repairment_length,
            light_malfunction_probability: light,
            heavy_malfunction_probability: heavy,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VehicleClass::Truck => "truck",
            VehicleClass::TerrainCar => "terrain_car",
            VehicleClass::SportCar => "sport_car",
            VehicleClass::CrossMotorcycle => "cross_motorcycle",
            VehicleClass::SportMotorcycle => "sport_motorcycle",
        }
    }
}

// ---------------------------------------------------------------------------
// State types
// ---------------------------------------------------------------------------

/// An immutable fact: which malfunction happened and in which simulated hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Malfunction {
    pub kind: MalfunctionKind,
    pub hour: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub race_id: RaceId,
    pub class: VehicleClass,
    pub team_name: String,
    pub model: String,
    pub manufactured_on: Option<NaiveDate>,
    /// Kilometres per simulated hour.
    pub speed: f64,
    /// Chance per simulated hour of a repairable malfunction.
    pub malfunction_probability: f64,
    /// Chance per simulated hour of a malfunction that ends the race for this vehicle.
    #[serde(default)]
    pub heavy_malfunction_probability: f64,
    pub repairment_length: u32,
    pub distance_covered: f64,
    pub status: VehicleStatus,
    pub malfunctions: Vec<Malfunction>,
    /// Non-zero only while `status == Broken` and a repair is under way.
    pub remaining_repair_hours: u32,
    pub finished_at_hour: Option<u64>,
}

impl Vehicle {
    /// Builds a `Ready` vehicle with the fixed figures of its class.
    pub fn from_class(
        id: VehicleId,
        race_id: RaceId,
        class: VehicleClass,
        team_name: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let profile = class.profile();
        Self {
            id,
            race_id,
            class,
            team_name: team_name.into(),
            model: model.into(),
            manufactured_on: None,
            speed: profile.speed,
            malfunction_probability: profile.light_malfunction_probability,
            heavy_malfunction_probability: profile.heavy_malfunction_probability,
            repairment_length: profile.repairment_length,
            distance_covered: 0.0,
            status: VehicleStatus::Ready,
            malfunctions: Vec::new(),
            remaining_repair_hours: 0,
            finished_at_hour: None,
        }
    }

    #[must_use]
    pub fn manufactured_on(mut self, date: NaiveDate) -> Self {
        self.manufactured_on = Some(date);
        self
    }

    /// `CompletedRace`, or `Broken` with no repair pending.
    pub fn is_terminal(&self) -> bool {
        match self.status {
            VehicleStatus::CompletedRace => true,
            VehicleStatus::Broken => self.remaining_repair_hours == 0,
            VehicleStatus::Ready | VehicleStatus::Running => false,
        }
    }

    pub fn is_under_repair(&self) -> bool {
        self.status == VehicleStatus::Broken && self.remaining_repair_hours > 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Race {
    pub id: RaceId,
    pub name: String,
    pub year: i32,
    /// Kilometres. Fixed at creation.
    pub track_distance: f64,
    pub status: RaceStatus,
    /// Logical clock: simulated hours applied so far.
    pub elapsed_hours: u64,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Roster. Storage may hand out a race with this left empty and load the
    /// vehicles separately.
    #[serde(default)]
    pub vehicles: Vec<Vehicle>,
}

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Simulated hour in which the event happened.
    pub hour: u64,
    pub event: Event,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    MalfunctionOccurred {
        vehicle_id: VehicleId,
        kind: MalfunctionKind,
    },
    RepairCompleted {
        vehicle_id: VehicleId,
    },
    VehicleFinished {
        vehicle_id: VehicleId,
        distance_covered: f64,
    },
}
