//! Scenario Registry
//!
//! Resolves which scenario applies to a map instance and serves scenario
//! POI data. Owns three indexes: static scenario definitions, database
//! map/difficulty associations, and POI groups. Each load rebuilds its
//! index wholesale into a fresh map and swaps it in, so concurrent
//! lookups never observe a half-built index.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{error, info};

use super::association::ScenarioAssociation;
use super::definition::{ScenarioDefinition, ScenarioStep};
use super::instance::InstanceScenario;
use super::poi::{build_poi_index, collect_poi_points, ScenarioPoi};
use crate::criteria::CriteriaTreeStore;
use crate::data::GameDataStore;
use crate::db::Database;
use crate::map::{MapInstance, Team};

/// Client POI queries are answered from a fixed-size buffer with one
/// slot per criteria tree node. The deepest tree any scenario step
/// references must stay strictly below this, or the buffer would
/// overflow at query time.
pub const MAX_SCENARIO_POI_QUERY_SIZE: usize = 50;

/// Registry for scenario definitions, map associations and POI data
pub struct ScenarioRegistry {
    scenarios: RwLock<HashMap<u32, Arc<ScenarioDefinition>>>,
    associations: RwLock<HashMap<(u32, u8), ScenarioAssociation>>,
    pois: RwLock<HashMap<u32, Arc<Vec<ScenarioPoi>>>>,
}

impl ScenarioRegistry {
    pub fn new() -> Self {
        Self {
            scenarios: RwLock::new(HashMap::new()),
            associations: RwLock::new(HashMap::new()),
            pois: RwLock::new(HashMap::new()),
        }
    }

    /// Rebuild the static scenario index from game-data records.
    ///
    /// Must run before `load_db_data`, which validates scenario ids
    /// against this index. Fails if any referenced criteria tree is too
    /// deep for the POI query buffer; that is a data-packaging error the
    /// server must not start with.
    pub async fn load_static_data(
        &self,
        game_data: &GameDataStore,
        criteria_trees: &CriteriaTreeStore,
    ) -> Result<(), String> {
        let started = Instant::now();

        let mut step_groups: HashMap<u32, BTreeMap<u8, ScenarioStep>> = HashMap::new();
        let mut deepest_tree_size = 0usize;

        for record in game_data.steps() {
            step_groups
                .entry(record.scenario_id)
                .or_default()
                .insert(record.order_index, ScenarioStep::from_record(record));

            if let Some(tree) = criteria_trees.get(record.criteria_tree_id) {
                let mut tree_size = 0usize;
                tree.walk(&mut |_| tree_size += 1);
                deepest_tree_size = deepest_tree_size.max(tree_size);
            }
        }

        if deepest_tree_size >= MAX_SCENARIO_POI_QUERY_SIZE {
            return Err(format!(
                "Deepest criteria tree referenced by a scenario step has {} nodes, but the POI query buffer holds {}",
                deepest_tree_size, MAX_SCENARIO_POI_QUERY_SIZE
            ));
        }

        let mut scenarios: HashMap<u32, Arc<ScenarioDefinition>> = HashMap::new();
        for record in game_data.scenarios() {
            // Step groups without a scenario record stay behind and are
            // discarded with the grouping map
            let steps = step_groups.remove(&record.id).unwrap_or_default();
            scenarios.insert(record.id, Arc::new(ScenarioDefinition::from_record(record, steps)));
        }

        let count = scenarios.len();
        *self.scenarios.write().await = scenarios;

        info!(
            "Loaded {} scenario definitions in {} ms",
            count,
            started.elapsed().as_millis()
        );

        Ok(())
    }

    /// Rebuild the map/difficulty association index from the world
    /// database. Rows referencing scenarios missing from the static
    /// index are reported and skipped whole.
    pub async fn load_db_data(&self, db: &Database) -> Result<(), String> {
        let started = Instant::now();

        let rows = db
            .fetch_scenario_associations()
            .await
            .map_err(|e| format!("Failed to query `scenarios` table: {}", e))?;

        if rows.is_empty() {
            *self.associations.write().await = HashMap::new();
            info!("Loaded 0 instance scenario entries. DB table `scenarios` is empty!");
            return Ok(());
        }

        let scenarios = self.scenarios.read().await;
        let mut associations: HashMap<(u32, u8), ScenarioAssociation> = HashMap::new();

        for row in rows {
            if row.scenario_alliance > 0 && !scenarios.contains_key(&row.scenario_alliance) {
                error!(
                    "Table `scenarios` column scenario_alliance contains an invalid scenario id {} for map {} difficulty {}",
                    row.scenario_alliance, row.map_id, row.difficulty
                );
                continue;
            }

            if row.scenario_horde > 0 && !scenarios.contains_key(&row.scenario_horde) {
                error!(
                    "Table `scenarios` column scenario_horde contains an invalid scenario id {} for map {} difficulty {}",
                    row.scenario_horde, row.map_id, row.difficulty
                );
                continue;
            }

            let horde_scenario = if row.scenario_horde == 0 {
                row.scenario_alliance
            } else {
                row.scenario_horde
            };

            associations.insert(
                (row.map_id, row.difficulty),
                ScenarioAssociation {
                    map_id: row.map_id,
                    difficulty: row.difficulty,
                    alliance_scenario: row.scenario_alliance,
                    horde_scenario,
                },
            );
        }
        drop(scenarios);

        let count = associations.len();
        *self.associations.write().await = associations;

        info!(
            "Loaded {} instance scenario entries in {} ms",
            count,
            started.elapsed().as_millis()
        );

        Ok(())
    }

    /// Rebuild the POI index from the world database
    pub async fn load_scenario_poi(
        &self,
        db: &Database,
        criteria_trees: &CriteriaTreeStore,
    ) -> Result<(), String> {
        let started = Instant::now();

        let definitions = db
            .fetch_scenario_poi_definitions()
            .await
            .map_err(|e| format!("Failed to query `scenario_poi` table: {}", e))?;

        if definitions.is_empty() {
            *self.pois.write().await = HashMap::new();
            error!("Loaded 0 scenario POI definitions. DB table `scenario_poi` is empty.");
            return Ok(());
        }

        let point_rows = db
            .fetch_scenario_poi_points()
            .await
            .map_err(|e| format!("Failed to query `scenario_poi_points` table: {}", e))?;

        let points = collect_poi_points(point_rows);
        let (index, count) = build_poi_index(definitions, points, criteria_trees);

        *self.pois.write().await = index
            .into_iter()
            .map(|(tree_id, pois)| (tree_id, Arc::new(pois)))
            .collect();

        info!(
            "Loaded {} scenario POI definitions in {} ms",
            count,
            started.elapsed().as_millis()
        );

        Ok(())
    }

    /// Get a scenario definition by id
    pub async fn get(&self, scenario_id: u32) -> Option<Arc<ScenarioDefinition>> {
        self.scenarios.read().await.get(&scenario_id).cloned()
    }

    /// Get the scenario association for a map and difficulty
    pub async fn association(&self, map_id: u32, difficulty: u8) -> Option<ScenarioAssociation> {
        self.associations
            .read()
            .await
            .get(&(map_id, difficulty))
            .copied()
    }

    /// Get the POIs grouped under a criteria tree id
    pub async fn scenario_pois(&self, criteria_tree_id: u32) -> Option<Arc<Vec<ScenarioPoi>>> {
        self.pois.read().await.get(&criteria_tree_id).cloned()
    }

    /// Instantiate the given scenario for a map instance. The caller
    /// (the map instance) owns the returned scenario.
    pub async fn create_instance_scenario(
        &self,
        map: &MapInstance,
        scenario_id: u32,
    ) -> Option<InstanceScenario> {
        let Some(definition) = self.get(scenario_id).await else {
            error!(
                "No scenario data was found related to scenario {} for map {}, difficulty {}",
                scenario_id,
                map.map_id(),
                map.difficulty()
            );
            return None;
        };

        Some(InstanceScenario::new(map, definition))
    }

    /// Instantiate whichever scenario the given team runs on this map
    /// instance, if the map/difficulty has one configured at all.
    pub async fn create_instance_scenario_for_team(
        &self,
        map: &MapInstance,
        team: Team,
    ) -> Option<InstanceScenario> {
        // No scenario registered for this map and difficulty is the
        // normal case, not an error
        let association = self.association(map.map_id(), map.difficulty()).await?;
        let scenario_id = association.scenario_for(team)?;

        self.create_instance_scenario(map, scenario_id).await
    }

    pub async fn scenario_count(&self) -> usize {
        self.scenarios.read().await.len()
    }

    pub async fn association_count(&self) -> usize {
        self.associations.read().await.len()
    }

    pub async fn poi_group_count(&self) -> usize {
        self.pois.read().await.len()
    }
}

impl Default for ScenarioRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::records::{CriteriaTreeRecord, ScenarioRecord, ScenarioStepRecord};
    use tempfile::TempDir;

    fn scenario_record(id: u32) -> ScenarioRecord {
        ScenarioRecord {
            id,
            name: format!("Scenario {}", id),
            flags: 0,
            scenario_type: 0,
        }
    }

    fn step_record(id: u32, scenario_id: u32, order_index: u8, criteria_tree_id: u32) -> ScenarioStepRecord {
        ScenarioStepRecord {
            id,
            scenario_id,
            order_index,
            criteria_tree_id,
            title: String::new(),
            reward_quest_id: 0,
            flags: 0,
        }
    }

    fn tree_record(id: u32, parent: u32) -> CriteriaTreeRecord {
        CriteriaTreeRecord {
            id,
            parent,
            criteria_id: 0,
            amount: 0,
            operator: 0,
        }
    }

    /// Chain of `size` nodes rooted at `root_id`
    fn chain_tree(root_id: u32, size: u32) -> Vec<CriteriaTreeRecord> {
        (0..size)
            .map(|i| tree_record(root_id + i, if i == 0 { 0 } else { root_id + i - 1 }))
            .collect()
    }

    async fn test_db() -> (TempDir, Database) {
        let dir = TempDir::new().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("world.db").display());
        let db = Database::new(&url).await.unwrap();
        (dir, db)
    }

    async fn loaded_registry(db: &Database) -> ScenarioRegistry {
        let game_data = GameDataStore::from_records(
            vec![scenario_record(7), scenario_record(8)],
            vec![
                step_record(1, 7, 0, 100),
                step_record(2, 7, 1, 101),
                step_record(3, 8, 0, 102),
            ],
        );
        let criteria_trees = CriteriaTreeStore::from_records(vec![
            tree_record(100, 0),
            tree_record(101, 0),
            tree_record(102, 0),
        ]);

        let registry = ScenarioRegistry::new();
        registry
            .load_static_data(&game_data, &criteria_trees)
            .await
            .unwrap();
        registry.load_db_data(db).await.unwrap();
        registry
    }

    #[tokio::test]
    async fn grouping_keeps_all_order_indices() {
        let game_data = GameDataStore::from_records(
            vec![scenario_record(7)],
            vec![
                step_record(1, 7, 2, 100),
                step_record(2, 7, 0, 100),
                step_record(3, 7, 1, 100),
            ],
        );
        let criteria_trees = CriteriaTreeStore::from_records(vec![tree_record(100, 0)]);

        let registry = ScenarioRegistry::new();
        registry
            .load_static_data(&game_data, &criteria_trees)
            .await
            .unwrap();

        let definition = registry.get(7).await.unwrap();
        let order: Vec<u8> = definition.steps_in_order().map(|s| s.order_index).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn duplicate_order_index_keeps_the_later_step() {
        let game_data = GameDataStore::from_records(
            vec![scenario_record(7)],
            vec![step_record(1, 7, 0, 100), step_record(2, 7, 0, 100)],
        );
        let criteria_trees = CriteriaTreeStore::from_records(vec![tree_record(100, 0)]);

        let registry = ScenarioRegistry::new();
        registry
            .load_static_data(&game_data, &criteria_trees)
            .await
            .unwrap();

        let definition = registry.get(7).await.unwrap();
        assert_eq!(definition.steps.len(), 1);
        assert_eq!(definition.step(0).unwrap().id, 2);
    }

    #[tokio::test]
    async fn step_group_without_scenario_record_is_discarded() {
        let game_data = GameDataStore::from_records(
            vec![scenario_record(7)],
            vec![step_record(1, 7, 0, 100), step_record(2, 999, 0, 100)],
        );
        let criteria_trees = CriteriaTreeStore::from_records(vec![tree_record(100, 0)]);

        let registry = ScenarioRegistry::new();
        registry
            .load_static_data(&game_data, &criteria_trees)
            .await
            .unwrap();

        assert_eq!(registry.scenario_count().await, 1);
        assert!(registry.get(999).await.is_none());
    }

    #[tokio::test]
    async fn duplicate_scenario_record_overwrites_and_loses_steps() {
        // The first record takes the step group with it, so the
        // surviving duplicate ends up with no steps
        let game_data = GameDataStore::from_records(
            vec![scenario_record(7), scenario_record(7)],
            vec![step_record(1, 7, 0, 100)],
        );
        let criteria_trees = CriteriaTreeStore::from_records(vec![tree_record(100, 0)]);

        let registry = ScenarioRegistry::new();
        registry
            .load_static_data(&game_data, &criteria_trees)
            .await
            .unwrap();

        let definition = registry.get(7).await.unwrap();
        assert!(definition.steps.is_empty());
    }

    #[tokio::test]
    async fn deepest_tree_at_ceiling_fails_the_load() {
        let size = MAX_SCENARIO_POI_QUERY_SIZE as u32;
        let game_data = GameDataStore::from_records(
            vec![scenario_record(7)],
            vec![step_record(1, 7, 0, 1000)],
        );
        let criteria_trees = CriteriaTreeStore::from_records(chain_tree(1000, size));

        let registry = ScenarioRegistry::new();
        let err = registry
            .load_static_data(&game_data, &criteria_trees)
            .await
            .unwrap_err();
        assert!(err.contains("POI query buffer"));
    }

    #[tokio::test]
    async fn deepest_tree_below_ceiling_loads() {
        let size = MAX_SCENARIO_POI_QUERY_SIZE as u32 - 1;
        let game_data = GameDataStore::from_records(
            vec![scenario_record(7)],
            vec![step_record(1, 7, 0, 1000)],
        );
        let criteria_trees = CriteriaTreeStore::from_records(chain_tree(1000, size));

        let registry = ScenarioRegistry::new();
        registry
            .load_static_data(&game_data, &criteria_trees)
            .await
            .unwrap();
        assert_eq!(registry.scenario_count().await, 1);
    }

    #[tokio::test]
    async fn unset_horde_scenario_falls_back_to_alliance() {
        let (_dir, db) = test_db().await;
        db.insert_scenario_association(1000, 1, 7, 0).await.unwrap();

        let registry = loaded_registry(&db).await;

        let association = registry.association(1000, 1).await.unwrap();
        assert_eq!(association.horde_scenario, 7);
        assert_eq!(association.scenario_for(Team::Horde), Some(7));
    }

    #[tokio::test]
    async fn association_with_invalid_alliance_scenario_is_rejected() {
        let (_dir, db) = test_db().await;
        db.insert_scenario_association(1000, 1, 999, 0).await.unwrap();

        let registry = loaded_registry(&db).await;

        assert!(registry.association(1000, 1).await.is_none());
    }

    #[tokio::test]
    async fn association_with_invalid_horde_scenario_is_rejected() {
        let (_dir, db) = test_db().await;
        db.insert_scenario_association(1000, 1, 7, 999).await.unwrap();

        let registry = loaded_registry(&db).await;

        assert!(registry.association(1000, 1).await.is_none());
    }

    #[tokio::test]
    async fn unconfigured_map_creates_no_scenario() {
        let (_dir, db) = test_db().await;
        let registry = loaded_registry(&db).await;

        let map = MapInstance::new(2222, 1);
        let scenario = registry
            .create_instance_scenario_for_team(&map, Team::Alliance)
            .await;
        assert!(scenario.is_none());
    }

    #[tokio::test]
    async fn unknown_scenario_id_creates_nothing() {
        let (_dir, db) = test_db().await;
        let registry = loaded_registry(&db).await;

        let map = MapInstance::new(1000, 1);
        assert!(registry.create_instance_scenario(&map, 999).await.is_none());
    }

    #[tokio::test]
    async fn team_scenario_is_instantiated_for_the_map() {
        let (_dir, db) = test_db().await;
        db.insert_scenario_association(1000, 1, 7, 8).await.unwrap();

        let registry = loaded_registry(&db).await;

        let map = MapInstance::new(1000, 1);
        let scenario = registry
            .create_instance_scenario_for_team(&map, Team::Horde)
            .await
            .unwrap();
        assert_eq!(scenario.definition().id, 8);
        assert_eq!(scenario.map_id(), 1000);
        assert_eq!(scenario.difficulty(), 1);
    }

    #[tokio::test]
    async fn neutral_team_gets_no_scenario() {
        let (_dir, db) = test_db().await;
        db.insert_scenario_association(1000, 1, 7, 8).await.unwrap();

        let registry = loaded_registry(&db).await;

        let map = MapInstance::new(1000, 1);
        let scenario = registry
            .create_instance_scenario_for_team(&map, Team::Neutral)
            .await;
        assert!(scenario.is_none());
    }

    #[tokio::test]
    async fn poi_load_builds_descriptors_with_ordered_points() {
        let (_dir, db) = test_db().await;
        db.insert_scenario_poi(5, 9, 2, 0, 0, 0, 0, 0, 0, 0).await.unwrap();
        db.insert_scenario_poi_point(5, 2, 0, 1, 2, 3).await.unwrap();
        db.insert_scenario_poi_point(5, 2, 1, 4, 5, 6).await.unwrap();

        let criteria_trees = CriteriaTreeStore::from_records(vec![tree_record(5, 0)]);
        let registry = ScenarioRegistry::new();
        registry.load_scenario_poi(&db, &criteria_trees).await.unwrap();

        let pois = registry.scenario_pois(5).await.unwrap();
        assert_eq!(pois.len(), 1);
        assert_eq!(pois[0].blob_index, 9);
        let coords: Vec<(i32, i32, i32)> = pois[0].points.iter().map(|p| (p.x, p.y, p.z)).collect();
        assert_eq!(coords, vec![(1, 2, 3), (4, 5, 6)]);
    }

    #[tokio::test]
    async fn poi_definition_without_points_is_absent_from_lookup() {
        let (_dir, db) = test_db().await;
        db.insert_scenario_poi(5, 9, 2, 0, 0, 0, 0, 0, 0, 0).await.unwrap();

        let criteria_trees = CriteriaTreeStore::from_records(vec![tree_record(5, 0)]);
        let registry = ScenarioRegistry::new();
        registry.load_scenario_poi(&db, &criteria_trees).await.unwrap();

        assert!(registry.scenario_pois(5).await.is_none());
    }

    #[tokio::test]
    async fn reloads_are_idempotent() {
        let (_dir, db) = test_db().await;
        db.insert_scenario_association(1000, 1, 7, 0).await.unwrap();
        db.insert_scenario_poi(100, 1, 0, 0, 0, 0, 0, 0, 0, 0).await.unwrap();
        db.insert_scenario_poi_point(100, 0, 0, 1, 1, 1).await.unwrap();

        let game_data = GameDataStore::from_records(
            vec![scenario_record(7)],
            vec![step_record(1, 7, 0, 100)],
        );
        let criteria_trees = CriteriaTreeStore::from_records(vec![tree_record(100, 0)]);

        let registry = ScenarioRegistry::new();
        for _ in 0..2 {
            registry
                .load_static_data(&game_data, &criteria_trees)
                .await
                .unwrap();
            registry.load_db_data(&db).await.unwrap();
            registry.load_scenario_poi(&db, &criteria_trees).await.unwrap();
        }

        assert_eq!(registry.scenario_count().await, 1);
        assert_eq!(registry.association_count().await, 1);
        assert_eq!(registry.poi_group_count().await, 1);

        let definition = registry.get(7).await.unwrap();
        assert_eq!(definition.steps.len(), 1);
        let pois = registry.scenario_pois(100).await.unwrap();
        assert_eq!(pois[0].points.len(), 1);
    }
}
