//! Background tick scheduler for the rally simulation.
//!
//! Finds the running race once per tick, applies one simulated hour through
//! `rally_core`, and commits the result through a fresh unit of work.

pub mod config;
pub mod error;
pub mod job;
pub mod scheduler;
pub mod store;

pub use config::SchedulerConfig;
pub use error::{DaemonError, JobError, PersistenceError};
pub use job::{shutdown_channel, Job, JobHandle, JobHost, Shutdown, ShutdownTrigger};
pub use scheduler::{SchedulerStats, SimulatorJob, TickOutcome};
pub use store::{InMemoryRaceStore, RaceStore, UnitOfWork};
