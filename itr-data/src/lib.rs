pub mod config;
pub mod income;
pub mod loader;
pub mod logging;

pub use config::{AppConfig, ConfigError, FilingConfig, LoggingConfig};
pub use income::{IncomeRecordError, parse_income_record, read_income_record};
pub use loader::{TaxSlabLoader, TaxSlabLoaderError, TaxSlabRecord, rules_from_repository};
