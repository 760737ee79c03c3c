//! `rally_core`: deterministic rally race simulation.
//!
//! No IO, no network. All randomness via the passed-in `RandomSource`,
//! all wall-clock time via the passed-in `Clock`.

mod clock;
mod engine;
mod error;
mod race;
mod random;
mod standings;
mod types;
mod vehicle;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::simulate_hour;
pub use error::{ConfigurationError, EngineError, InvalidState};
pub use race::is_complete;
pub use random::{RandomSource, RngSource, ScriptedRolls};
pub use standings::{leaderboard, statistics, RaceStatistics, Standing};
pub use types::*;
pub use uuid::Uuid;
pub use vehicle::{advance, validate_vehicle};

pub(crate) fn emit(hour: u64, event: Event) -> EventEnvelope {
    EventEnvelope { hour, event }
}

#[cfg(test)]
mod tests;
