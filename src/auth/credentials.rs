use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use super::AuthError;

/// Roles a seeded user can hold.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Admin,
    Moderator,
}

/// A user record held by the in-memory credential store.
#[derive(Debug, Clone)]
pub struct SeedUser {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

/// In-memory credential store. Users are seeded once at startup with Argon2
/// password hashes and are never created or updated at runtime.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    users: Vec<SeedUser>,
    /// Hash verified against when the username is unknown, so lookup misses
    /// and password mismatches take comparable time.
    fallback_hash: String,
}

/// Default seed accounts. Plaintext passwords exist only long enough to be
/// hashed during store construction.
const DEFAULT_SEEDS: &[(&str, &str, Role)] = &[
    ("admin1", "adminpass", Role::Admin),
    ("buyer1", "buyerpass", Role::User),
    ("mod1", "modpass", Role::Moderator),
];

impl CredentialStore {
    /// Build a store from explicit (username, password, role) seeds.
    pub fn with_users(seeds: &[(&str, &str, Role)]) -> Result<Self, AuthError> {
        let users = seeds
            .iter()
            .map(|(username, password, role)| {
                Ok(SeedUser {
                    id: Uuid::new_v4(),
                    username: (*username).to_string(),
                    password_hash: hash_password(password)?,
                    role: *role,
                })
            })
            .collect::<Result<Vec<_>, AuthError>>()?;

        Ok(Self {
            users,
            fallback_hash: hash_password("fallback-comparison-input")?,
        })
    }

    /// Build the store with the default seed accounts.
    pub fn seeded() -> Result<Self, AuthError> {
        Self::with_users(DEFAULT_SEEDS)
    }

    pub fn find(&self, username: &str) -> Option<&SeedUser> {
        self.users.iter().find(|u| u.username == username)
    }

    pub fn find_by_id(&self, id: Uuid) -> Option<&SeedUser> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Verify a username/password pair. Unknown usernames and wrong passwords
    /// fail with the identical error so callers cannot enumerate accounts.
    pub fn verify(&self, username: &str, password: &str) -> Result<&SeedUser, AuthError> {
        match self.find(username) {
            Some(user) => {
                if verify_password(&user.password_hash, password) {
                    Ok(user)
                } else {
                    Err(AuthError::InvalidCredentials)
                }
            }
            None => {
                let _ = verify_password(&self.fallback_hash, password);
                Err(AuthError::InvalidCredentials)
            }
        }
    }
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::InternalError(format!("Password hashing failed: {}", e)))
}

fn verify_password(hash: &str, password: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}
