use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

use crate::engine::ScoringConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackerSettings {
    scoring: ScoringConfig,
}

/// JSON-file store for the tunable scoring parameters. Unreadable or
/// missing files fall back to defaults rather than failing startup.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<TrackerSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            TrackerSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn scoring(&self) -> ScoringConfig {
        self.data.read().unwrap().scoring.clone()
    }

    pub fn update_scoring(&self, scoring: ScoringConfig) -> Result<()> {
        {
            let mut guard = self.data.write().unwrap();
            guard.scoring = scoring;
        }
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        let snapshot = self.data.read().unwrap().clone();
        let contents =
            serde_json::to_string_pretty(&snapshot).context("Failed to serialize settings")?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory {}", parent.display())
            })?;
        }

        fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();
        let scoring = store.scoring();
        assert_eq!(scoring.base_xp_per_hour, 50.0);
        assert_eq!(scoring.xp_per_level, 1000);
    }

    #[test]
    fn update_round_trips_through_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let store = SettingsStore::new(path.clone()).unwrap();
        let mut scoring = store.scoring();
        scoring.default_target_hours = 80.0;
        store.update_scoring(scoring).unwrap();

        let reloaded = SettingsStore::new(path).unwrap();
        assert_eq!(reloaded.scoring().default_target_hours, 80.0);
    }
}
