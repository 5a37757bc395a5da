// src/utils/hash.rs

use argon2::{
    Argon2,
    password_hash::{
        self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use crate::error::StoreError;

fn hash_error(err: password_hash::Error) -> StoreError {
    StoreError::Hash(err.to_string())
}

/// Produces the PHC string kept in `User.Password`.
pub fn hash_password(password: &str) -> Result<String, StoreError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(hash_error)
}

/// A wrong password is `Ok(false)`. A stored value that is not a usable
/// argon2 hash (for instance a legacy cleartext password) is an error.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, StoreError> {
    let parsed = PasswordHash::new(stored).map_err(hash_error)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(hash_error(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_salted_and_verifies() {
        let a = hash_password("hunter2").unwrap();
        let b = hash_password("hunter2").unwrap();

        assert_ne!(a, b);
        assert!(a.starts_with("$argon2"));
        assert!(!a.contains("hunter2"));
        assert!(verify_password("hunter2", &a).unwrap());
        assert!(verify_password("hunter2", &b).unwrap());
        assert!(!verify_password("hunter3", &a).unwrap());
    }

    #[test]
    fn cleartext_stored_value_is_an_error() {
        assert!(matches!(
            verify_password("plaintext", "plaintext"),
            Err(StoreError::Hash(_))
        ));
    }
}
