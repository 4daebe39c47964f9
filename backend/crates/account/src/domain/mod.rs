//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{
    progress::{ProgressStats, StatsPatch},
    user::{User, UserPatch},
};
pub use repository::{AccountStore, ProgressRepository, UserRepository};
