//! Game-Data Store
//!
//! Loads static scenario and step record tables from TOML files.
//! The store is a dumb typed-record source: it accumulates rows and
//! hands out iterators, nothing more.

use std::path::Path;
use tracing::{info, warn};

use super::records::{RawGameDataFile, ScenarioRecord, ScenarioStepRecord};

/// Store of static scenario game-data records
pub struct GameDataStore {
    scenarios: Vec<ScenarioRecord>,
    steps: Vec<ScenarioStepRecord>,
}

impl GameDataStore {
    pub fn new() -> Self {
        Self {
            scenarios: Vec::new(),
            steps: Vec::new(),
        }
    }

    /// Build a store directly from records (used by tests and tools)
    pub fn from_records(scenarios: Vec<ScenarioRecord>, steps: Vec<ScenarioStepRecord>) -> Self {
        Self { scenarios, steps }
    }

    /// Load all record files from `<data_dir>/scenarios`
    pub fn load_from_directory(&mut self, data_dir: &Path) -> Result<(), String> {
        let scenarios_dir = data_dir.join("scenarios");

        if !scenarios_dir.exists() {
            warn!("Scenario data directory does not exist: {:?}", scenarios_dir);
            return Ok(());
        }

        let entries = std::fs::read_dir(&scenarios_dir)
            .map_err(|e| format!("Failed to read scenario data directory: {}", e))?;

        for entry in entries {
            let entry = entry.map_err(|e| format!("Failed to read entry: {}", e))?;
            let path = entry.path();

            if path.extension().map_or(false, |ext| ext == "toml") {
                let content = std::fs::read_to_string(&path)
                    .map_err(|e| format!("Failed to read {:?}: {}", path, e))?;

                let file: RawGameDataFile = toml::from_str(&content)
                    .map_err(|e| format!("Failed to parse {:?}: {}", path, e))?;

                self.scenarios.extend(file.scenario);
                self.steps.extend(file.step);
            }
        }

        info!(
            "Loaded {} scenario records and {} scenario step records",
            self.scenarios.len(),
            self.steps.len()
        );

        Ok(())
    }

    /// All scenario records, in file order
    pub fn scenarios(&self) -> impl Iterator<Item = &ScenarioRecord> {
        self.scenarios.iter()
    }

    /// All scenario step records, in file order
    pub fn steps(&self) -> impl Iterator<Item = &ScenarioStepRecord> {
        self.steps.iter()
    }

    pub fn scenario_count(&self) -> usize {
        self.scenarios.len()
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}

impl Default for GameDataStore {
    fn default() -> Self {
        Self::new()
    }
}
