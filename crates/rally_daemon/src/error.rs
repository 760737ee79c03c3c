use rally_core::{EngineError, RaceId};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PersistenceError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("more than one race is running: {0:?}")]
    MultipleRunningRaces(Vec<RaceId>),

    #[error("race {0} not found")]
    RaceNotFound(RaceId),

    #[error("race {0} already exists")]
    DuplicateRace(RaceId),

    #[error("race {0} was modified by another unit of work")]
    Conflict(RaceId),
}

/// Anything that can go wrong inside one tick or one store operation.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

#[derive(Debug, Error)]
pub enum JobError {
    #[error("job '{0}' is already running")]
    AlreadyRunning(&'static str),

    #[error("job '{0}' panicked: {1}")]
    Panicked(&'static str, String),
}
