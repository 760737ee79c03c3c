use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Pacing of the tick loop. Pacing is wall-clock only; every tick applies
/// exactly one simulated hour no matter how long it took.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Delay before the first tick.
    pub warm_up_ms: u64,
    /// Delay between the end of one tick and the start of the next.
    pub pacing_ms: u64,
    /// Seed for the malfunction draws. Random when absent.
    pub seed: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            warm_up_ms: 3_000,
            pacing_ms: 2_000,
            seed: None,
        }
    }
}

impl SchedulerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading scheduler config: {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("parsing scheduler config: {}", path.display()))
    }

    pub fn warm_up(&self) -> Duration {
        Duration::from_millis(self.warm_up_ms)
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config: SchedulerConfig = serde_json::from_str(r#"{"pacing_ms": 50}"#).unwrap();
        assert_eq!(config.pacing(), Duration::from_millis(50));
        assert_eq!(config.warm_up(), Duration::from_secs(3));
        assert_eq!(config.seed, None);
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scheduler.json");
        std::fs::write(&path, r#"{"warm_up_ms": 0, "pacing_ms": 10, "seed": 7}"#).unwrap();
        let config = SchedulerConfig::load(&path).unwrap();
        assert_eq!(
            config,
            SchedulerConfig {
                warm_up_ms: 0,
                pacing_ms: 10,
                seed: Some(7),
            }
        );
    }
}
