pub mod calculations;
pub mod config;
pub mod db;
pub mod models;
pub mod returns;
pub mod user_input;

pub use calculations::TaxComputationError;
pub use config::{CreationMetadata, RegimeRules, ReliefRules, RulesError, SurchargeTier, TaxRules};
pub use db::repository::{RepositoryError, ReturnRepository};
pub use models::*;
