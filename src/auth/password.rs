//! Password hashing
//!
//! Argon2id with a fixed work factor and a fresh random salt per hash. Hashes
//! are stored as PHC strings, so verification reads the parameters back from
//! the stored hash.

use anyhow::{Result, anyhow};
use argon2::password_hash::rand_core::OsRng;
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};

/// Password hashing service
#[derive(Clone)]
pub struct PasswordService {
    argon2: Argon2<'static>,
    /// Verified against when the account does not exist, so an unknown email
    /// costs the same as a wrong password.
    dummy_hash: String,
}

impl PasswordService {
    /// Service with the default Argon2id work factor
    pub fn new() -> Result<Self> {
        Self::with_params(
            Params::DEFAULT_M_COST,
            Params::DEFAULT_T_COST,
            Params::DEFAULT_P_COST,
        )
    }

    /// Service with an explicit work factor: memory in KiB, iterations, lanes
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| anyhow!("Invalid Argon2 parameters: {e}"))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut service = Self {
            argon2,
            dummy_hash: String::new(),
        };
        service.dummy_hash = service.hash("not-a-real-password")?;
        Ok(service)
    }

    /// Hash a plaintext password into a PHC string
    pub fn hash(&self, plaintext: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| anyhow!("Failed to hash password: {e}"))?;
        Ok(hash.to_string())
    }

    /// `true` when `plaintext` matches `hash`. A malformed hash is a mismatch.
    pub fn verify(&self, plaintext: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => self
                .argon2
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::warn!("Stored password hash could not be parsed: {}", e);
                false
            }
        }
    }

    /// Spend the same work as [`verify`](Self::verify) and return `false`
    pub fn verify_dummy(&self, plaintext: &str) -> bool {
        let _ = self.verify(plaintext, &self.dummy_hash);
        false
    }
}

#[cfg(test)]
pub(crate) fn fast_password_service() -> PasswordService {
    PasswordService::with_params(Params::MIN_M_COST, Params::MIN_T_COST, Params::MIN_P_COST)
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let service = fast_password_service();
        let hash = service.hash("correct horse battery staple").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("correct horse"));
        assert!(service.verify("correct horse battery staple", &hash));
    }

    #[test]
    fn test_wrong_password_is_rejected() {
        let service = fast_password_service();
        let hash = service.hash("hunter2").unwrap();

        assert!(!service.verify("hunter3", &hash));
        assert!(!service.verify("", &hash));
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let service = fast_password_service();
        let a = service.hash("hunter2").unwrap();
        let b = service.hash("hunter2").unwrap();

        assert_ne!(a, b);
        assert!(service.verify("hunter2", &a));
        assert!(service.verify("hunter2", &b));
    }

    #[test]
    fn test_malformed_hash_is_a_mismatch() {
        let service = fast_password_service();
        assert!(!service.verify("hunter2", "plaintext-in-the-db"));
        assert!(!service.verify("hunter2", ""));
    }

    #[test]
    fn test_verify_dummy_never_admits() {
        let service = fast_password_service();
        assert!(!service.verify_dummy("not-a-real-password"));
    }

    #[test]
    fn test_hashes_verify_across_work_factors() {
        let fast = fast_password_service();
        let hash = fast.hash("hunter2").unwrap();

        let slower = PasswordService::with_params(64, 2, 1).unwrap();
        assert!(slower.verify("hunter2", &hash));
    }

    #[test]
    fn test_invalid_params_are_rejected() {
        assert!(PasswordService::with_params(0, 0, 0).is_err());
    }
}
