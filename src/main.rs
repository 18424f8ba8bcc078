use std::path::Path;
use std::sync::Arc;
use tracing::info;

use scenario_server::config::ServerConfig;
use scenario_server::criteria::CriteriaTreeStore;
use scenario_server::data::GameDataStore;
use scenario_server::db::Database;
use scenario_server::scenario::ScenarioRegistry;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("scenario_server=info".parse().unwrap()),
        )
        .init();

    let config = ServerConfig::load(Path::new("server.toml"))
        .expect("Failed to load server configuration");

    let db = Database::new(&config.database_url)
        .await
        .expect("Failed to initialize world database");

    let mut game_data = GameDataStore::new();
    game_data
        .load_from_directory(&config.data_dir)
        .expect("Failed to load scenario game data");

    let mut criteria_trees = CriteriaTreeStore::new();
    criteria_trees
        .load_from_directory(&config.data_dir)
        .expect("Failed to load criteria trees");

    let registry = Arc::new(ScenarioRegistry::new());

    // Static definitions first: the association load validates its
    // scenario ids against them
    registry
        .load_static_data(&game_data, &criteria_trees)
        .await
        .expect("Failed to load static scenario data");
    registry
        .load_db_data(&db)
        .await
        .expect("Failed to load scenario associations");
    registry
        .load_scenario_poi(&db, &criteria_trees)
        .await
        .expect("Failed to load scenario POIs");

    info!(
        "Scenario registry ready: {} scenarios, {} map associations, {} POI groups",
        registry.scenario_count().await,
        registry.association_count().await,
        registry.poi_group_count().await
    );
}
