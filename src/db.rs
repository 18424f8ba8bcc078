use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Row;

/// One row of the `scenarios` association table
#[derive(Debug, Clone)]
pub struct ScenarioAssociationRow {
    pub map_id: u32,
    pub difficulty: u8,
    pub scenario_alliance: u32,
    pub scenario_horde: u32,
}

/// One row of the `scenario_poi` definitions table
#[derive(Debug, Clone)]
pub struct ScenarioPoiRow {
    pub criteria_tree_id: u32,
    pub blob_index: i32,
    pub idx1: i32,
    pub map_id: i32,
    pub ui_map_id: i32,
    pub priority: i32,
    pub flags: i32,
    pub world_effect_id: i32,
    pub player_condition_id: i32,
    pub navigation_player_condition_id: i32,
}

/// One row of the `scenario_poi_points` table. `idx2` only orders the
/// query and is not carried past it.
#[derive(Debug, Clone)]
pub struct ScenarioPoiPointRow {
    pub criteria_tree_id: u32,
    pub idx1: i32,
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        // Run migrations
        Self::migrate(&pool).await?;

        Ok(Self { pool })
    }

    async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS scenarios (
                map INTEGER NOT NULL,
                difficulty INTEGER NOT NULL,
                scenario_alliance INTEGER NOT NULL DEFAULT 0,
                scenario_horde INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY(map, difficulty)
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS scenario_poi (
                criteria_tree_id INTEGER NOT NULL,
                blob_index INTEGER NOT NULL,
                idx1 INTEGER NOT NULL,
                map_id INTEGER NOT NULL DEFAULT 0,
                ui_map_id INTEGER NOT NULL DEFAULT 0,
                priority INTEGER NOT NULL DEFAULT 0,
                flags INTEGER NOT NULL DEFAULT 0,
                world_effect_id INTEGER NOT NULL DEFAULT 0,
                player_condition_id INTEGER NOT NULL DEFAULT 0,
                navigation_player_condition_id INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY(criteria_tree_id, idx1)
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS scenario_poi_points (
                criteria_tree_id INTEGER NOT NULL,
                idx1 INTEGER NOT NULL,
                idx2 INTEGER NOT NULL,
                x INTEGER NOT NULL DEFAULT 0,
                y INTEGER NOT NULL DEFAULT 0,
                z INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY(criteria_tree_id, idx1, idx2)
            )
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    pub async fn fetch_scenario_associations(
        &self,
    ) -> Result<Vec<ScenarioAssociationRow>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT map, difficulty, scenario_alliance, scenario_horde FROM scenarios",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|r| ScenarioAssociationRow {
                map_id: r.get("map"),
                difficulty: r.get("difficulty"),
                scenario_alliance: r.get("scenario_alliance"),
                scenario_horde: r.get("scenario_horde"),
            })
            .collect())
    }

    pub async fn fetch_scenario_poi_definitions(&self) -> Result<Vec<ScenarioPoiRow>, sqlx::Error> {
        let rows = sqlx::query(
            r#"SELECT criteria_tree_id, blob_index, idx1, map_id, ui_map_id, priority,
                flags, world_effect_id, player_condition_id, navigation_player_condition_id
            FROM scenario_poi ORDER BY criteria_tree_id, idx1"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|r| ScenarioPoiRow {
                criteria_tree_id: r.get("criteria_tree_id"),
                blob_index: r.get("blob_index"),
                idx1: r.get("idx1"),
                map_id: r.get("map_id"),
                ui_map_id: r.get("ui_map_id"),
                priority: r.get("priority"),
                flags: r.get("flags"),
                world_effect_id: r.get("world_effect_id"),
                player_condition_id: r.get("player_condition_id"),
                navigation_player_condition_id: r.get("navigation_player_condition_id"),
            })
            .collect())
    }

    /// Points ordered so that each `(criteria_tree_id, idx1)` group comes
    /// out in `idx2` order. The descending tree-id ordering is inherited
    /// from the source data and has no observable effect.
    pub async fn fetch_scenario_poi_points(&self) -> Result<Vec<ScenarioPoiPointRow>, sqlx::Error> {
        let rows = sqlx::query(
            r#"SELECT criteria_tree_id, idx1, x, y, z
            FROM scenario_poi_points ORDER BY criteria_tree_id DESC, idx1, idx2"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|r| ScenarioPoiPointRow {
                criteria_tree_id: r.get("criteria_tree_id"),
                idx1: r.get("idx1"),
                x: r.get("x"),
                y: r.get("y"),
                z: r.get("z"),
            })
            .collect())
    }

    pub async fn insert_scenario_association(
        &self,
        map_id: u32,
        difficulty: u8,
        scenario_alliance: u32,
        scenario_horde: u32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"INSERT OR REPLACE INTO scenarios (map, difficulty, scenario_alliance, scenario_horde)
            VALUES (?, ?, ?, ?)"#,
        )
        .bind(map_id)
        .bind(difficulty)
        .bind(scenario_alliance)
        .bind(scenario_horde)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn insert_scenario_poi(
        &self,
        criteria_tree_id: u32,
        blob_index: i32,
        idx1: i32,
        map_id: i32,
        ui_map_id: i32,
        priority: i32,
        flags: i32,
        world_effect_id: i32,
        player_condition_id: i32,
        navigation_player_condition_id: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"INSERT OR REPLACE INTO scenario_poi (criteria_tree_id, blob_index, idx1,
                map_id, ui_map_id, priority, flags, world_effect_id,
                player_condition_id, navigation_player_condition_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(criteria_tree_id)
        .bind(blob_index)
        .bind(idx1)
        .bind(map_id)
        .bind(ui_map_id)
        .bind(priority)
        .bind(flags)
        .bind(world_effect_id)
        .bind(player_condition_id)
        .bind(navigation_player_condition_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn insert_scenario_poi_point(
        &self,
        criteria_tree_id: u32,
        idx1: i32,
        idx2: i32,
        x: i32,
        y: i32,
        z: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"INSERT OR REPLACE INTO scenario_poi_points (criteria_tree_id, idx1, idx2, x, y, z)
            VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(criteria_tree_id)
        .bind(idx1)
        .bind(idx2)
        .bind(x)
        .bind(y)
        .bind(z)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
