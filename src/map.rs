//! Map Instances
//!
//! A map instance is a running instantiation of a map at a difficulty.
//! The scenario registry only ever asks an instance for its map id and
//! difficulty; in return the instance owns whatever scenario the
//! registry instantiates for it.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::scenario::{InstanceScenario, ScenarioRegistry};

/// Faction a party enters an instance as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Team {
    Alliance,
    Horde,
    Neutral,
}

/// A running, concrete instantiation of a map at a given difficulty
pub struct MapInstance {
    pub instance_id: Uuid,
    map_id: u32,
    difficulty: u8,
    /// Scenario in progress on this instance, if one is configured
    pub scenario: RwLock<Option<InstanceScenario>>,
}

impl MapInstance {
    pub fn new(map_id: u32, difficulty: u8) -> Self {
        Self {
            instance_id: Uuid::new_v4(),
            map_id,
            difficulty,
            scenario: RwLock::new(None),
        }
    }

    pub fn map_id(&self) -> u32 {
        self.map_id
    }

    pub fn difficulty(&self) -> u8 {
        self.difficulty
    }

    pub async fn has_scenario(&self) -> bool {
        self.scenario.read().await.is_some()
    }
}

/// Manages all active map instances
pub struct InstanceManager {
    instances: DashMap<Uuid, Arc<MapInstance>>,
}

impl InstanceManager {
    pub fn new() -> Self {
        Self {
            instances: DashMap::new(),
        }
    }

    /// Create and register an instance, attaching the scenario the
    /// given team runs on this map/difficulty (if any)
    pub async fn create_instance(
        &self,
        map_id: u32,
        difficulty: u8,
        team: Team,
        registry: &ScenarioRegistry,
    ) -> Arc<MapInstance> {
        let instance = Arc::new(MapInstance::new(map_id, difficulty));

        if let Some(scenario) = registry
            .create_instance_scenario_for_team(&instance, team)
            .await
        {
            info!(
                "Instance {} on map {} difficulty {} runs scenario {}",
                instance.instance_id,
                map_id,
                difficulty,
                scenario.definition().id
            );
            *instance.scenario.write().await = Some(scenario);
        }

        self.instances
            .insert(instance.instance_id, instance.clone());
        instance
    }

    pub fn get(&self, instance_id: &Uuid) -> Option<Arc<MapInstance>> {
        self.instances.get(instance_id).map(|e| e.clone())
    }

    /// Drop an instance; its scenario goes with it
    pub fn remove_instance(&self, instance_id: &Uuid) -> Option<Arc<MapInstance>> {
        self.instances.remove(instance_id).map(|(_, instance)| instance)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl Default for InstanceManager {
    fn default() -> Self {
        Self::new()
    }
}
