//! Scenario System Module
//!
//! Static scenario definitions, map/difficulty associations, POI data
//! and the registry that resolves all three for map instances.

pub mod association;
pub mod definition;
pub mod instance;
pub mod poi;
pub mod registry;

pub use association::ScenarioAssociation;
pub use definition::{ScenarioDefinition, ScenarioStep};
pub use instance::InstanceScenario;
pub use poi::{ScenarioPoi, ScenarioPoiPoint};
pub use registry::{ScenarioRegistry, MAX_SCENARIO_POI_QUERY_SIZE};
