//! Credential checks and account registration.

use std::sync::Arc;

use domains::{DomainError, NewUser, PasswordHasher, Permission, Result, User, UserRepo};
use tracing::{debug, instrument};

use crate::validation::{required, single_line};

/// Input for [`AuthService::register`]; the password is hashed before storage.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub permissions: Vec<Permission>,
}

pub struct AuthService {
    users: Arc<dyn UserRepo>,
    hasher: Arc<dyn PasswordHasher>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepo>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }

    /// Resolves credentials to a user. Unknown users and wrong passwords are
    /// indistinguishable to the caller.
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        let user = self.users.find_user_by_username(username).await?;
        if let Some(user) = user {
            if self.verify(password, &user.password_hash).await? {
                return Ok(user);
            }
        }
        debug!("credential check failed");
        Err(DomainError::Unauthorized("invalid username or password".into()))
    }

    /// Runs the hash comparison on the blocking pool.
    async fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(DomainError::internal)
    }

    #[instrument(skip(self, registration), fields(username = %registration.username))]
    pub async fn register(&self, registration: Registration) -> Result<User> {
        required("username", &registration.username)?;
        required("password", &registration.password)?;
        single_line("email", &registration.email)?;
        if !registration.email.contains('@') {
            return Err(DomainError::validation("email must be an address"));
        }
        let hasher = Arc::clone(&self.hasher);
        let password = registration.password;
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(DomainError::internal)??;
        self.users
            .create_user(NewUser {
                username: registration.username,
                email: registration.email,
                password_hash,
                permissions: registration.permissions,
            })
            .await
    }
}
