//! Infrastructure Layer
//!
//! Storage adapters for the repository traits.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryAccountRepository;
pub use postgres::PgAccountRepository;
