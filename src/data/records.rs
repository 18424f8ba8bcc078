//! Static Game-Data Records
//!
//! Flat record types deserialized from TOML data tables. These mirror
//! client-side data tables one row at a time; grouping and validation
//! happen later in the scenario registry, not here.

use serde::Deserialize;

/// A TOML data file holding scenario and scenario-step record tables
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawGameDataFile {
    #[serde(default)]
    pub scenario: Vec<ScenarioRecord>,
    #[serde(default)]
    pub step: Vec<ScenarioStepRecord>,
}

/// A TOML data file holding criteria-tree record tables
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCriteriaTreeFile {
    #[serde(default)]
    pub criteria_tree: Vec<CriteriaTreeRecord>,
}

/// One scenario record
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioRecord {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub flags: u32,
    /// Scenario category (dungeon, event, ...)
    #[serde(rename = "type", default)]
    pub scenario_type: u32,
}

/// One scenario-step record
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioStepRecord {
    pub id: u32,
    pub scenario_id: u32,
    /// Position of this step within its scenario; steps run in
    /// increasing order index
    pub order_index: u8,
    /// Criteria tree evaluated to complete this step
    pub criteria_tree_id: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub reward_quest_id: u32,
    #[serde(default)]
    pub flags: u32,
}

/// One criteria-tree node record, parent-linked (parent 0 = root)
#[derive(Debug, Clone, Deserialize)]
pub struct CriteriaTreeRecord {
    pub id: u32,
    #[serde(default)]
    pub parent: u32,
    #[serde(default)]
    pub criteria_id: u32,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub operator: u8,
}
