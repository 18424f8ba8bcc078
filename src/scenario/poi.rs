//! Scenario POIs
//!
//! Navigation hints shown by the client's objective tracker, grouped by
//! the criteria tree they illuminate. Loading runs in two passes: points
//! are materialized into `(criteria_tree_id, idx1)` groups first, then
//! each definition row claims its group.

use std::collections::HashMap;
use tracing::error;

use crate::criteria::CriteriaTreeStore;
use crate::db::{ScenarioPoiPointRow, ScenarioPoiRow};

/// One POI coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioPoiPoint {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// One POI descriptor with its ordered points
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioPoi {
    pub blob_index: i32,
    pub map_id: i32,
    pub ui_map_id: i32,
    pub priority: i32,
    pub flags: i32,
    pub world_effect_id: i32,
    pub player_condition_id: i32,
    pub navigation_player_condition_id: i32,
    pub points: Vec<ScenarioPoiPoint>,
}

/// Point lists grouped by criteria tree id, then by idx1
pub(crate) type PoiPointGroups = HashMap<u32, HashMap<i32, Vec<ScenarioPoiPoint>>>;

/// First pass: materialize point rows into their groups. Row order is
/// the fetch order, which the query makes deterministic per group.
pub(crate) fn collect_poi_points(rows: Vec<ScenarioPoiPointRow>) -> PoiPointGroups {
    let mut groups: PoiPointGroups = HashMap::new();

    for row in rows {
        groups
            .entry(row.criteria_tree_id)
            .or_default()
            .entry(row.idx1)
            .or_default()
            .push(ScenarioPoiPoint {
                x: row.x,
                y: row.y,
                z: row.z,
            });
    }

    groups
}

/// Second pass: walk the definition rows, moving each row's matching
/// point group into a descriptor under its criteria tree id. Rows whose
/// criteria tree is unknown are reported but kept; rows without points
/// are reported and dropped. Returns the index and the number of
/// descriptors built.
pub(crate) fn build_poi_index(
    definitions: Vec<ScenarioPoiRow>,
    mut points: PoiPointGroups,
    criteria_trees: &CriteriaTreeStore,
) -> (HashMap<u32, Vec<ScenarioPoi>>, usize) {
    let mut index: HashMap<u32, Vec<ScenarioPoi>> = HashMap::new();
    let mut count = 0;

    for row in definitions {
        if criteria_trees.get(row.criteria_tree_id).is_none() {
            error!(
                "Table `scenario_poi` criteria tree id {} idx1 {} does not correspond to a valid criteria tree",
                row.criteria_tree_id, row.idx1
            );
        }

        let matched = points
            .get_mut(&row.criteria_tree_id)
            .and_then(|groups| groups.get_mut(&row.idx1))
            .map(std::mem::take);

        match matched {
            Some(row_points) => {
                index
                    .entry(row.criteria_tree_id)
                    .or_default()
                    .push(ScenarioPoi {
                        blob_index: row.blob_index,
                        map_id: row.map_id,
                        ui_map_id: row.ui_map_id,
                        priority: row.priority,
                        flags: row.flags,
                        world_effect_id: row.world_effect_id,
                        player_condition_id: row.player_condition_id,
                        navigation_player_condition_id: row.navigation_player_condition_id,
                        points: row_points,
                    });
                count += 1;
            }
            None => {
                error!(
                    "Table `scenario_poi` references unknown scenario POI points for criteria tree id {} POI {}",
                    row.criteria_tree_id, row.blob_index
                );
            }
        }
    }

    (index, count)
}
