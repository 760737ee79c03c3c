//! The rally simulator job: one simulated hour per tick.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rally_core::{simulate_hour, Clock, Event, EventEnvelope, RaceId, RandomSource};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::SchedulerConfig;
use crate::error::DaemonError;
use crate::job::{Job, Shutdown};
use crate::store::RaceStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No race is running.
    Idle,
    Advanced {
        race_id: RaceId,
        hour: u64,
        events: usize,
    },
    /// This tick's hour left every vehicle terminal; the race is now `Finished`.
    Finished { race_id: RaceId, hour: u64 },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SchedulerStats {
    pub ticks: u64,
    pub failed_ticks: u64,
    pub hours_simulated: u64,
    pub races_finished: u64,
}

#[derive(Debug, Default)]
struct Counters {
    ticks: AtomicU64,
    failed_ticks: AtomicU64,
    hours_simulated: AtomicU64,
    races_finished: AtomicU64,
}

pub struct SimulatorJob<S, R, C> {
    store: Arc<S>,
    rng: Mutex<R>,
    clock: C,
    config: SchedulerConfig,
    counters: Counters,
}

impl<S, R, C> SimulatorJob<S, R, C>
where
    S: RaceStore,
    R: RandomSource + Send,
    C: Clock,
{
    pub fn new(store: Arc<S>, rng: R, clock: C, config: SchedulerConfig) -> Self {
        Self {
            store,
            rng: Mutex::new(rng),
            clock,
            config,
            counters: Counters::default(),
        }
    }

    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            ticks: self.counters.ticks.load(Ordering::Relaxed),
            failed_ticks: self.counters.failed_ticks.load(Ordering::Relaxed),
            hours_simulated: self.counters.hours_simulated.load(Ordering::Relaxed),
            races_finished: self.counters.races_finished.load(Ordering::Relaxed),
        }
    }

    /// One tick: load the running race through a fresh unit of work, simulate
    /// one hour, finish the race if every vehicle is terminal, commit once.
    ///
    /// On error nothing has been committed; the next tick starts over from
    /// whatever the store holds.
    pub async fn run_tick(&self) -> Result<TickOutcome, DaemonError> {
        let mut uow = self.store.begin().await?;

        let Some(mut race) = uow.running_race().await? else {
            return Ok(TickOutcome::Idle);
        };
        race.vehicles = uow.vehicles_for_race(race.id).await?;

        let events = {
            let mut rng = self.rng.lock();
            simulate_hour(&mut race, &mut *rng)?
        };
        let hour = race.elapsed_hours;

        let finished = race.is_complete();
        if finished {
            race.complete(self.clock.now())?;
        }

        uow.commit(&race).await?;

        log_events(race.id, &events);
        self.counters.hours_simulated.fetch_add(1, Ordering::Relaxed);

        if finished {
            self.counters.races_finished.fetch_add(1, Ordering::Relaxed);
            info!(race_id = %race.id, hour, "race finished");
            Ok(TickOutcome::Finished {
                race_id: race.id,
                hour,
            })
        } else {
            debug!(race_id = %race.id, hour, events = events.len(), "simulated hour");
            Ok(TickOutcome::Advanced {
                race_id: race.id,
                hour,
                events: events.len(),
            })
        }
    }

    /// Warm-up, then tick until cancelled. A tick that has started always runs
    /// to completion; cancellation is only observed between ticks.
    pub async fn run(&self, mut shutdown: Shutdown) {
        info!("rally simulation started");

        if shutdown.sleep(self.config.warm_up()).await {
            info!("rally simulation cancelled during warm-up");
            return;
        }

        while !shutdown.is_cancelled() {
            self.counters.ticks.fetch_add(1, Ordering::Relaxed);
            if let Err(err) = self.run_tick().await {
                self.counters.failed_ticks.fetch_add(1, Ordering::Relaxed);
                match &err {
                    DaemonError::Persistence(_) => {
                        warn!(error = %err, "tick failed, retrying next tick");
                    }
                    DaemonError::Engine(_) => {
                        error!(error = %err, "engine rejected tick");
                    }
                }
            }

            if shutdown.sleep(self.config.pacing()).await {
                break;
            }
        }

        info!(stats = ?self.stats(), "rally simulation finished");
    }
}

fn log_events(race_id: RaceId, events: &[EventEnvelope]) {
    for envelope in events {
        let hour = envelope.hour;
        match &envelope.event {
            Event::MalfunctionOccurred { vehicle_id, kind } => {
                info!(%race_id, hour, %vehicle_id, ?kind, "vehicle malfunction");
            }
            Event::RepairCompleted { vehicle_id } => {
                debug!(%race_id, hour, %vehicle_id, "vehicle repaired");
            }
            Event::VehicleFinished {
                vehicle_id,
                distance_covered,
            } => {
                info!(%race_id, hour, %vehicle_id, distance_covered, "vehicle crossed the line");
            }
        }
    }
}

#[async_trait]
impl<S, R, C> Job for SimulatorJob<S, R, C>
where
    S: RaceStore + 'static,
    R: RandomSource + Send + 'static,
    C: Clock + 'static,
{
    fn name(&self) -> &'static str {
        "rally-simulator"
    }

    async fn execute(&self, shutdown: Shutdown) {
        self.run(shutdown).await;
    }
}
