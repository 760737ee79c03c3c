//! Storage contract used by the scheduler, plus an in-memory provider.
//!
//! Each tick opens its own `UnitOfWork`; nothing is cached between ticks.
//! A unit of work either commits everything it was handed or nothing, and
//! dropping it without committing discards it.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rally_core::{EngineError, InvalidState, Race, RaceId, RaceStatus, Vehicle, VehicleId};

use crate::error::{DaemonError, PersistenceError};

#[async_trait]
pub trait RaceStore: Send + Sync {
    /// Opens a fresh unit of work.
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, PersistenceError>;
}

#[async_trait]
pub trait UnitOfWork: Send {
    /// The race whose status is `Running`, without its roster. Zero is normal;
    /// more than one is an error the provider reports.
    async fn running_race(&mut self) -> Result<Option<Race>, PersistenceError>;

    async fn vehicles_for_race(&mut self, race_id: RaceId)
        -> Result<Vec<Vehicle>, PersistenceError>;

    /// Writes the race and its whole roster atomically.
    async fn commit(self: Box<Self>, race: &Race) -> Result<(), PersistenceError>;
}

// ---------------------------------------------------------------------------
// In-memory provider
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Tables {
    /// Race rows, roster always empty.
    races: BTreeMap<RaceId, Race>,
    vehicles: BTreeMap<VehicleId, Vehicle>,
    /// Bumped on every committed write; used to detect concurrent writers.
    version: u64,
}

impl Tables {
    fn write_race(&mut self, race: &Race) {
        let mut row = race.clone();
        let roster = std::mem::take(&mut row.vehicles);
        self.vehicles.retain(|_, v| v.race_id != race.id);
        self.vehicles
            .extend(roster.into_iter().map(|vehicle| (vehicle.id, vehicle)));
        self.races.insert(race.id, row);
        self.version += 1;
    }

    fn load_race(&self, race_id: RaceId) -> Option<Race> {
        let mut race = self.races.get(&race_id)?.clone();
        race.vehicles = self.roster(race_id);
        Some(race)
    }

    fn roster(&self, race_id: RaceId) -> Vec<Vehicle> {
        self.vehicles
            .values()
            .filter(|v| v.race_id == race_id)
            .cloned()
            .collect()
    }
}

#[derive(Debug, Default)]
struct Faults {
    failing_begins: u32,
    failing_commits: u32,
    commit_delay: Option<Duration>,
}

/// Cheap to clone; clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRaceStore {
    tables: Arc<Mutex<Tables>>,
    faults: Arc<Mutex<Faults>>,
}

impl InMemoryRaceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_race(&self, race: &Race) -> Result<(), PersistenceError> {
        let mut tables = self.tables.lock();
        if tables.races.contains_key(&race.id) {
            return Err(PersistenceError::DuplicateRace(race.id));
        }
        tables.write_race(race);
        Ok(())
    }

    /// The race with its roster loaded.
    pub fn race(&self, race_id: RaceId) -> Option<Race> {
        self.tables.lock().load_race(race_id)
    }

    /// Starts a `Created` race, refusing while another race is running.
    pub fn start_race(&self, race_id: RaceId, now: DateTime<Utc>) -> Result<(), DaemonError> {
        let mut tables = self.tables.lock();
        if let Some(running) = tables
            .races
            .values()
            .find(|r| r.status == RaceStatus::Running)
        {
            return Err(EngineError::from(InvalidState::AnotherRaceRunning(running.id)).into());
        }
        let mut race = tables
            .load_race(race_id)
            .ok_or(PersistenceError::RaceNotFound(race_id))?;
        race.start(now)?;
        tables.write_race(&race);
        Ok(())
    }

    /// Makes the next `n` calls to `begin` fail.
    pub fn fail_next_begins(&self, n: u32) {
        self.faults.lock().failing_begins = n;
    }

    /// Makes the next `n` commits fail without writing anything.
    pub fn fail_next_commits(&self, n: u32) {
        self.faults.lock().failing_commits = n;
    }

    /// Stalls every commit for `delay` before it writes.
    pub fn delay_commits(&self, delay: Duration) {
        self.faults.lock().commit_delay = Some(delay);
    }

    /// Writes a race row directly, bypassing the unit-of-work path.
    /// Stands in for a second writer racing the scheduler.
    pub fn overwrite_race(&self, race: &Race) {
        self.tables.lock().write_race(race);
    }
}

#[async_trait]
impl RaceStore for InMemoryRaceStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, PersistenceError> {
        {
            let mut faults = self.faults.lock();
            if faults.failing_begins > 0 {
                faults.failing_begins -= 1;
                return Err(PersistenceError::Unavailable(
                    "could not open unit of work".to_string(),
                ));
            }
        }
        let version = self.tables.lock().version;
        Ok(Box::new(InMemoryUnitOfWork {
            tables: Arc::clone(&self.tables),
            faults: Arc::clone(&self.faults),
            version,
        }))
    }
}

struct InMemoryUnitOfWork {
    tables: Arc<Mutex<Tables>>,
    faults: Arc<Mutex<Faults>>,
    /// Table version seen when the unit of work was opened.
    version: u64,
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn running_race(&mut self) -> Result<Option<Race>, PersistenceError> {
        let tables = self.tables.lock();
        let mut running = tables
            .races
            .values()
            .filter(|r| r.status == RaceStatus::Running);
        match (running.next(), running.next()) {
            (None, _) => Ok(None),
            (Some(race), None) => Ok(Some(race.clone())),
            (Some(_), Some(_)) => Err(PersistenceError::MultipleRunningRaces(
                tables
                    .races
                    .values()
                    .filter(|r| r.status == RaceStatus::Running)
                    .map(|r| r.id)
                    .collect(),
            )),
        }
    }

    async fn vehicles_for_race(
        &mut self,
        race_id: RaceId,
    ) -> Result<Vec<Vehicle>, PersistenceError> {
        Ok(self.tables.lock().roster(race_id))
    }

    async fn commit(self: Box<Self>, race: &Race) -> Result<(), PersistenceError> {
        let delay = {
            let mut faults = self.faults.lock();
            if faults.failing_commits > 0 {
                faults.failing_commits -= 1;
                return Err(PersistenceError::Unavailable(
                    "commit rejected".to_string(),
                ));
            }
            faults.commit_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut tables = self.tables.lock();
        if tables.version != self.version {
            return Err(PersistenceError::Conflict(race.id));
        }
        if !tables.races.contains_key(&race.id) {
            return Err(PersistenceError::RaceNotFound(race.id));
        }
        tables.write_race(race);
        Ok(())
    }
}
