//! Password Hashing Service
//!
//! Runs Argon2id on the blocking thread pool. A semaphore bounds how many
//! hashes run at once so a burst of logins cannot exhaust memory
//! (each hash allocates `memory_kib`).

use std::sync::Arc;

use platform::password::HashParams;
use tokio::sync::Semaphore;

use crate::application::config::AuthConfig;
use crate::domain::value_object::user_password::{RawPassword, UserPassword};
use crate::error::{AuthError, AuthResult};

/// Outcome of [`PasswordService::verify_and_upgrade`]
#[derive(Debug)]
pub enum Verification {
    Mismatch,
    /// `upgraded` holds a stronger hash to store, if one was needed
    Match { upgraded: Option<UserPassword> },
}

#[derive(Clone)]
pub struct PasswordService {
    params: HashParams,
    pepper: Option<Arc<[u8]>>,
    permits: Arc<Semaphore>,
}

impl PasswordService {
    pub fn new(params: HashParams, pepper: Option<&[u8]>, max_concurrent: usize) -> Self {
        Self {
            params,
            pepper: pepper.map(Arc::from),
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            config.hash_params,
            config.pepper(),
            config.max_concurrent_hashes,
        )
    }

    /// Hash with a fresh salt at the configured cost
    pub async fn hash(&self, raw: RawPassword) -> AuthResult<UserPassword> {
        let params = self.params;
        let pepper = self.pepper.clone();
        self.run_blocking(move || UserPassword::from_raw(&raw, &params, pepper.as_deref()))
            .await
    }

    /// Check `raw` against a stored hash, using the hash's own parameters
    pub async fn verify(&self, raw: RawPassword, stored: UserPassword) -> AuthResult<bool> {
        let pepper = self.pepper.clone();
        self.run_blocking(move || stored.verify(&raw, pepper.as_deref()))
            .await
    }

    /// Verify, and on success re-hash if `stored` is weaker than configured
    ///
    /// Both steps run in one blocking task so the clear text never leaves it.
    pub async fn verify_and_upgrade(
        &self,
        raw: RawPassword,
        stored: UserPassword,
    ) -> AuthResult<Verification> {
        let params = self.params;
        let pepper = self.pepper.clone();
        self.run_blocking(move || {
            if !stored.verify(&raw, pepper.as_deref())? {
                return Ok(Verification::Mismatch);
            }
            if !stored.needs_rehash(&params) {
                return Ok(Verification::Match { upgraded: None });
            }
            let upgraded = UserPassword::from_raw(&raw, &params, pepper.as_deref())?;
            Ok(Verification::Match {
                upgraded: Some(upgraded),
            })
        })
        .await
    }

    /// True if `stored` was hashed with weaker settings than configured
    pub fn needs_rehash(&self, stored: &UserPassword) -> bool {
        stored.needs_rehash(&self.params)
    }

    async fn run_blocking<T, F>(&self, f: F) -> AuthResult<T>
    where
        F: FnOnce() -> AuthResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| AuthError::Internal(format!("Hashing pool closed: {}", e)))?;

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            f()
        })
        .await
        .map_err(|e| AuthError::Internal(format!("Hashing task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(work_factor: u32) -> PasswordService {
        PasswordService::new(HashParams::new(work_factor, 1024, 1), None, 2)
    }

    #[tokio::test]
    async fn test_hash_then_verify() {
        let service = service(1);
        let stored = service
            .hash(RawPassword::new("pw123456".to_string()).unwrap())
            .await
            .unwrap();

        let ok = service
            .verify(RawPassword::for_login("pw123456".to_string()).unwrap(), stored.clone())
            .await
            .unwrap();
        let bad = service
            .verify(RawPassword::for_login("pw1234567".to_string()).unwrap(), stored)
            .await
            .unwrap();

        assert!(ok);
        assert!(!bad);
    }

    #[tokio::test]
    async fn test_same_input_different_hashes() {
        let service = service(1);
        let a = service
            .hash(RawPassword::new("pw123456".to_string()).unwrap())
            .await
            .unwrap();
        let b = service
            .hash(RawPassword::new("pw123456".to_string()).unwrap())
            .await
            .unwrap();
        assert_ne!(a.as_phc_string(), b.as_phc_string());
    }

    #[tokio::test]
    async fn test_raised_work_factor_flags_rehash() {
        let old = service(1)
            .hash(RawPassword::new("pw123456".to_string()).unwrap())
            .await
            .unwrap();

        let raised = service(2);
        assert!(raised.needs_rehash(&old));

        // Old hash still verifies under the raised configuration
        let ok = raised
            .verify(RawPassword::for_login("pw123456".to_string()).unwrap(), old)
            .await
            .unwrap();
        assert!(ok);
    }

    #[tokio::test]
    async fn test_verify_and_upgrade() {
        let old = service(1)
            .hash(RawPassword::new("pw123456".to_string()).unwrap())
            .await
            .unwrap();
        let raised = service(2);

        let outcome = raised
            .verify_and_upgrade(RawPassword::for_login("pw123456".to_string()).unwrap(), old.clone())
            .await
            .unwrap();
        let upgraded = match outcome {
            Verification::Match {
                upgraded: Some(upgraded),
            } => upgraded,
            other => panic!("expected an upgraded hash, got {:?}", other),
        };
        assert!(!raised.needs_rehash(&upgraded));

        let outcome = raised
            .verify_and_upgrade(RawPassword::for_login("wrong-pw".to_string()).unwrap(), old)
            .await
            .unwrap();
        assert!(matches!(outcome, Verification::Mismatch));

        let outcome = raised
            .verify_and_upgrade(RawPassword::for_login("pw123456".to_string()).unwrap(), upgraded)
            .await
            .unwrap();
        assert!(matches!(outcome, Verification::Match { upgraded: None }));
    }

    #[tokio::test]
    async fn test_concurrent_hashes_complete() {
        let service = service(1);
        let mut handles = Vec::new();
        for i in 0..6 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service
                    .hash(RawPassword::new(format!("pw12345{}", i)).unwrap())
                    .await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }
    }
}
