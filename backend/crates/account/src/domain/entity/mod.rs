//! Entity Module

pub mod progress;
pub mod user;
