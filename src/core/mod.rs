pub mod aggregate;
pub mod etl;
pub mod growth;
pub mod insights;
pub mod pipeline;
pub mod selection;

pub use crate::domain::model::{Dataset, GrowthReport, RegistrationRecord};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
