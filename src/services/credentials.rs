//! Domain service for registration and login.
//!
//! Drives the two credential state machines over the user repository; the
//! web layer renders the resulting errors back into the submitted form.

use thiserror::Error;
use tokio::task;

use crate::db::repositories::user::hash_password;
use crate::db::{Store, User};

/// Credential failures surfaced back to the submitting form. Every variant
/// except `Internal` is a user-input failure and renders with HTTP 200.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Username is required")]
    UsernameRequired,

    #[error("Password is required")]
    PasswordRequired,

    #[error("User {0} is already registered.")]
    AlreadyRegistered(String),

    #[error("Incorrect Username")]
    IncorrectUsername,

    #[error("Incorrect Password")]
    IncorrectPassword,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CredentialError {
    /// Whether the failure should be shown to the user in the form rather
    /// than escalating to the generic server-error response.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        !matches!(self, Self::Internal(_))
    }
}

#[derive(Clone)]
pub struct CredentialService {
    store: Store,
}

impl CredentialService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Register a new user: validate, pre-check uniqueness, hash, insert.
    ///
    /// The unique constraint on `username` backstops the pre-check, so two
    /// concurrent registrations of the same name both report
    /// [`CredentialError::AlreadyRegistered`].
    pub async fn register(&self, username: &str, password: &str) -> Result<User, CredentialError> {
        if username.is_empty() {
            return Err(CredentialError::UsernameRequired);
        }
        if password.is_empty() {
            return Err(CredentialError::PasswordRequired);
        }

        if self.store.find_user_by_name(username).await?.is_some() {
            return Err(CredentialError::AlreadyRegistered(username.to_string()));
        }

        // Argon2 hashing is CPU-intensive; keep it off the async runtime.
        let plaintext = password.to_string();
        let password_hash = task::spawn_blocking(move || hash_password(&plaintext))
            .await
            .map_err(|e| anyhow::anyhow!("Password hashing task panicked: {e}"))??;

        let user = self
            .store
            .insert_user(username, &password_hash)
            .await?
            .ok_or_else(|| CredentialError::AlreadyRegistered(username.to_string()))?;

        tracing::info!("Registered user {}", user.username);

        Ok(user)
    }

    /// Verify a username/password pair and return the matching user.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<User, CredentialError> {
        let Some(user) = self.store.find_user_by_name(username).await? else {
            return Err(CredentialError::IncorrectUsername);
        };

        if !self.store.verify_user_password(username, password).await? {
            return Err(CredentialError::IncorrectPassword);
        }

        Ok(user)
    }
}
