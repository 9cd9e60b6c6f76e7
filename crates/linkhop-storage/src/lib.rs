//! Storage backends for link and user records.

pub mod memory;
pub mod mysql;

pub use linkhop_core::repository::{LinkRepository, ReadRepository, Result, UserRepository};
pub use linkhop_core::StorageError;
pub use memory::InMemoryRepository;
pub use mysql::MySqlRepository;
