//! Instance Scenarios
//!
//! The per-map-instance progress object handed out by the registry
//! factory. The map instance owns it for its whole life; the registry
//! keeps no reference. Step progression state lives here, the rules for
//! completing a step live with the criteria evaluation engine.

use std::ops::Bound;
use std::sync::Arc;

use super::definition::{ScenarioDefinition, ScenarioStep};
use crate::map::MapInstance;

/// A scenario in progress on one map instance
#[derive(Debug)]
pub struct InstanceScenario {
    map_id: u32,
    difficulty: u8,
    definition: Arc<ScenarioDefinition>,
    /// Order index of the step in progress; `None` once past the last
    current_step: Option<u8>,
}

impl InstanceScenario {
    pub(crate) fn new(map: &MapInstance, definition: Arc<ScenarioDefinition>) -> Self {
        let current_step = definition.first_step().map(|step| step.order_index);
        Self {
            map_id: map.map_id(),
            difficulty: map.difficulty(),
            definition,
            current_step,
        }
    }

    pub fn map_id(&self) -> u32 {
        self.map_id
    }

    pub fn difficulty(&self) -> u8 {
        self.difficulty
    }

    pub fn definition(&self) -> &ScenarioDefinition {
        &self.definition
    }

    /// The step currently in progress
    pub fn current_step(&self) -> Option<&ScenarioStep> {
        self.definition.step(self.current_step?)
    }

    /// Move to the next step in execution order and return it
    pub fn advance_step(&mut self) -> Option<&ScenarioStep> {
        self.current_step = self.current_step.and_then(|current| {
            self.definition
                .steps
                .range((Bound::Excluded(current), Bound::Unbounded))
                .next()
                .map(|(order_index, _)| *order_index)
        });

        self.current_step()
    }

    /// Whether the scenario has run past its last step
    pub fn is_complete(&self) -> bool {
        self.current_step.is_none()
    }
}
