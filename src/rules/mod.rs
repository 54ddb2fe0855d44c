//! Pet transition rules and the TOML data loader

pub mod loader;
pub mod transition;

pub use loader::{load_data_dir, DataSet};
pub use transition::{NeedCondition, RuleSubject, RuleTable, RuleTier, TransitionRule};
