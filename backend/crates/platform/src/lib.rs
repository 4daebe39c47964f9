//! Platform Crate - Technical Infrastructure
//!
//! Domain-free building blocks shared by the service crates:
//! - Secure random bytes
//! - Password hashing (Argon2id with tunable work factor)
//! - Signed, time-bounded session tokens (HS256 JWT)
//! - Request header helpers (bearer token extraction)

pub mod client;
pub mod crypto;
pub mod password;
pub mod token;
