pub mod cache;
pub mod calculations;
pub mod db;
pub mod models;
pub mod provider;
pub mod validation;

pub use cache::ReferenceCache;
pub use calculations::CalculationError;
pub use db::repository::{PayrollRepository, RepositoryError};
pub use models::*;
pub use provider::{ReferenceDataProvider, ReferenceDataSnapshot};
