//! Scenario Definitions
//!
//! Resolved, immutable scenario data: one definition per scenario id
//! with its steps keyed by order index. Built once per load by the
//! registry and shared out behind `Arc`.

use std::collections::BTreeMap;

use crate::data::records::{ScenarioRecord, ScenarioStepRecord};

/// One ordered stage of a scenario
#[derive(Debug, Clone)]
pub struct ScenarioStep {
    pub id: u32,
    pub order_index: u8,
    /// Criteria tree evaluated to complete this step
    pub criteria_tree_id: u32,
    pub title: String,
    pub reward_quest_id: u32,
    pub flags: u32,
}

impl ScenarioStep {
    pub fn from_record(record: &ScenarioStepRecord) -> Self {
        Self {
            id: record.id,
            order_index: record.order_index,
            criteria_tree_id: record.criteria_tree_id,
            title: record.title.clone(),
            reward_quest_id: record.reward_quest_id,
            flags: record.flags,
        }
    }
}

/// A staged encounter definition with its ordered steps
#[derive(Debug, Clone)]
pub struct ScenarioDefinition {
    pub id: u32,
    pub name: String,
    pub flags: u32,
    pub scenario_type: u32,
    /// Steps keyed by order index; iteration order is execution order
    pub steps: BTreeMap<u8, ScenarioStep>,
}

impl ScenarioDefinition {
    pub fn from_record(record: &ScenarioRecord, steps: BTreeMap<u8, ScenarioStep>) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            flags: record.flags,
            scenario_type: record.scenario_type,
            steps,
        }
    }

    /// The first step in execution order
    pub fn first_step(&self) -> Option<&ScenarioStep> {
        self.steps.values().next()
    }

    /// Step at a given order index
    pub fn step(&self, order_index: u8) -> Option<&ScenarioStep> {
        self.steps.get(&order_index)
    }

    /// All steps in execution order
    pub fn steps_in_order(&self) -> impl Iterator<Item = &ScenarioStep> {
        self.steps.values()
    }
}
