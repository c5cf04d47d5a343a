use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::error::{InvalidConfigSnafu, IoSnafu, JsonSnafu, Result};
use crate::proficiency::ProficiencyConfig;
use crate::scheduler::{Scheduler, SchedulerConfig};

/// Everything tunable, loadable from one JSON document. Missing sections and
/// fields fall back to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scheduler: SchedulerConfig,
    pub proficiency: ProficiencyConfig,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path).context(IoSnafu)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).context(JsonSnafu)?;
        config.scheduler()?;
        if !(0.0..=1.0).contains(&config.proficiency.smoothing) {
            return InvalidConfigSnafu {
                reason: "proficiency smoothing must lie in [0, 1]",
            }
            .fail();
        }
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context(JsonSnafu)?;
        fs::write(path, json).context(IoSnafu)
    }

    pub fn scheduler(&self) -> Result<Scheduler> {
        Scheduler::new(self.scheduler.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DrowordError;
    use tempfile::tempdir;

    #[test]
    fn partial_json_uses_defaults() -> Result<()> {
        let config = Config::from_json(r#"{ "scheduler": { "relearn_delay_minutes": 5 } }"#)?;
        assert_eq!(config.scheduler.relearn_delay_minutes, 5);
        assert_eq!(config.scheduler.minimum_ease_factor, 1.3);
        assert_eq!(config.proficiency, ProficiencyConfig::default());
        assert_eq!(Config::from_json("{}")?, Config::default());
        Ok(())
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = Config::from_json(r#"{ "scheduler": { "first_interval_days": 0 } }"#);
        assert!(matches!(err, Err(DrowordError::InvalidConfig { .. })));
        let err = Config::from_json(r#"{ "proficiency": { "smoothing": 1.5 } }"#);
        assert!(matches!(err, Err(DrowordError::InvalidConfig { .. })));
        let err = Config::from_json(r#"{ "scheduler": 5 }"#);
        assert!(matches!(err, Err(DrowordError::Json { .. })));
    }

    #[test]
    fn save_and_load() -> Result<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = Config::default();
        config.proficiency.smoothing = 0.1;
        config.save(&path)?;
        assert_eq!(Config::load(&path)?, config);
        Ok(())
    }
}
