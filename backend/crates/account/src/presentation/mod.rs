//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and middleware.

pub mod dto;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use extract::ValidJson;
pub use handlers::AccountAppState;
pub use middleware::require_session;
pub use router::account_router;
