pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{cli::LocalStorage, toml_config::TomlConfig};
pub use core::{
    etl::{EtlEngine, EtlOutcome},
    growth::GrowthCalculator,
    pipeline::ReportPipeline,
};
pub use domain::model::{GrowthResult, RegistrationRecord};
pub use domain::period::{Granularity, Period};
pub use utils::error::{ReportError, Result};
