//! scenario-server
//!
//! World-server subsystem that decides which scenario (a scripted
//! multi-stage encounter) a map instance runs, and serves the POI
//! navigation data the client's objective tracker asks for. Static
//! definitions come from TOML game-data tables, associations and POIs
//! from the world database; the registry re-indexes all of it at load
//! time and hands out instance scenarios at map creation.

pub mod config;
pub mod criteria;
pub mod data;
pub mod db;
pub mod map;
pub mod scenario;

pub use config::ServerConfig;
pub use criteria::{CriteriaTree, CriteriaTreeStore};
pub use data::GameDataStore;
pub use db::Database;
pub use map::{InstanceManager, MapInstance, Team};
pub use scenario::{InstanceScenario, ScenarioRegistry};
