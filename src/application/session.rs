//! Sign-in state, delegated to the hosted auth service.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::application::repos::{AccessToken, AuthGateway, RepoError};
use crate::domain::entities::SessionUser;
use crate::domain::error::{DomainError, require_text};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Invalid(#[from] DomainError),
    #[error("email or password is incorrect")]
    InvalidCredentials,
    #[error("sign-up rejected: {0}")]
    Rejected(String),
    #[error(transparent)]
    Repo(RepoError),
}

#[derive(Debug, Clone, Default)]
pub struct CredentialsCommand {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Clone)]
pub struct SessionService {
    auth: Arc<dyn AuthGateway>,
}

impl SessionService {
    pub fn new(auth: Arc<dyn AuthGateway>) -> Self {
        Self { auth }
    }

    /// Resolve the visitor behind a session token. Lookup failures are
    /// treated as anonymous.
    pub async fn current_user(&self, token: Option<&str>) -> Option<SessionUser> {
        let token = token.filter(|token| !token.is_empty())?;

        match self.auth.current_user(token).await {
            Ok(user) => user,
            Err(err) => {
                warn!(
                    target = "minblog::session",
                    error = %err,
                    "session lookup failed; treating visitor as anonymous"
                );
                None
            }
        }
    }

    pub async fn login(&self, command: CredentialsCommand) -> Result<AccessToken, SessionError> {
        let (email, password) = credentials(command)?;

        let token = self
            .auth
            .sign_in(email.trim(), &password)
            .await
            .map_err(|err| match err {
                RepoError::Unauthorized | RepoError::InvalidInput { .. } => {
                    SessionError::InvalidCredentials
                }
                other => SessionError::Repo(other),
            })?;

        info!(target = "minblog::session", "user signed in");
        Ok(token)
    }

    pub async fn register(&self, command: CredentialsCommand) -> Result<(), SessionError> {
        let (email, password) = credentials(command)?;

        self.auth
            .sign_up(email.trim(), &password)
            .await
            .map_err(|err| match err {
                RepoError::InvalidInput { message } => SessionError::Rejected(message),
                RepoError::Duplicate { .. } => {
                    SessionError::Rejected("an account with this email already exists".into())
                }
                other => SessionError::Repo(other),
            })?;

        info!(target = "minblog::session", "user registered");
        Ok(())
    }

    /// Revoke the token upstream. Failures are logged; the caller clears the
    /// local session either way.
    pub async fn logout(&self, token: Option<&str>) {
        let Some(token) = token.filter(|token| !token.is_empty()) else {
            return;
        };

        if let Err(err) = self.auth.sign_out(token).await {
            warn!(target = "minblog::session", error = %err, "sign-out request failed");
        }
    }
}

fn credentials(command: CredentialsCommand) -> Result<(String, String), DomainError> {
    let email = require_text(command.email, "email")?;
    let password = require_text(command.password, "password")?;
    Ok((email, password))
}
