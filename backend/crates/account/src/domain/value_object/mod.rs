//! Value Object Module

pub mod difficulty;
pub mod email;
pub mod leetcode_name;
pub mod user_id;
pub mod user_name;
pub mod user_password;
