pub mod records;
pub mod store;

pub use records::{CriteriaTreeRecord, ScenarioRecord, ScenarioStepRecord};
pub use store::GameDataStore;
