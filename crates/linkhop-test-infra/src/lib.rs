//! Disposable backing services for linkhop integration tests.

pub mod error;
pub mod mysql;

pub use error::{Result, TestInfraError};
pub use mysql::{MySqlOptions, MySqlServer};
