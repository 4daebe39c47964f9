//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod hasher;
pub mod progress;
pub mod session;
pub mod sign_in;
pub mod sign_up;
pub mod update_profile;

// Re-exports
pub use config::{AuthConfig, ConfigError};
pub use hasher::PasswordService;
pub use progress::ProgressService;
pub use session::{Identity, SessionFacade};
pub use sign_in::{SignInInput, SignInOutput, SignInUseCase};
pub use sign_up::{SignUpInput, SignUpOutput, SignUpUseCase};
pub use update_profile::{UpdateProfileInput, UpdateProfileUseCase};
