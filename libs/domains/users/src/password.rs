//! Argon2 password hashing.
//!
//! A [`HashedPassword`] can only come out of [`PasswordHashing::hash`] or be
//! read back from the store; nothing builds one from arbitrary text.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{UserError, UserResult};

/// PHC-format Argon2 hash (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashedPassword(String);

impl HashedPassword {
    /// Check `plaintext` against this hash.
    ///
    /// Cost parameters are read from the PHC string, so hashes made with any
    /// [`PasswordHashing`] configuration verify here. A malformed stored value
    /// never matches.
    pub fn verify(&self, plaintext: &str) -> bool {
        match PasswordHash::new(&self.0) {
            Ok(parsed) => Argon2::default()
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::warn!(error = %e, "Stored password hash is not valid PHC");
                false
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashedPassword(..)")
    }
}

/// Salted one-way hashing with a fixed Argon2id cost.
#[derive(Clone)]
pub struct PasswordHashing {
    argon2: Argon2<'static>,
}

impl PasswordHashing {
    /// Argon2id with explicit memory (KiB), iteration and parallelism costs.
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> UserResult<Self> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| UserError::PasswordHash(e.to_string()))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash `plaintext` with a fresh random salt.
    pub fn hash(&self, plaintext: &str) -> UserResult<HashedPassword> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| HashedPassword(hash.to_string()))
            .map_err(|e| UserError::PasswordHash(e.to_string()))
    }
}

impl Default for PasswordHashing {
    /// Argon2id with the crate's recommended parameters (19 MiB, t=2, p=1).
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}

#[cfg(test)]
pub(crate) fn cheap_hashing() -> PasswordHashing {
    PasswordHashing::with_params(Params::MIN_M_COST, 1, 1).unwrap()
}
