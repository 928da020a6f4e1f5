use std::error::Error as StdError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    application::{
        posts::PostServiceError, profile::ProfileServiceError, repos::RepoError,
        session::SessionError,
    },
    infra::error::InfraError,
};

#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = vec![error.to_string()];
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

/// Failure of an HTML route: a status, a short public message and the full
/// report for the response logger.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    public_message: &'static str,
    report: ErrorReport,
}

impl HttpError {
    pub fn new(
        source: &'static str,
        status: StatusCode,
        public_message: &'static str,
        detail: impl Into<String>,
    ) -> Self {
        let report = ErrorReport::from_message(source, status, detail);
        Self {
            status,
            public_message,
            report,
        }
    }

    pub fn from_error(
        source: &'static str,
        status: StatusCode,
        public_message: &'static str,
        error: &dyn StdError,
    ) -> Self {
        let report = ErrorReport::from_error(source, status, error);
        Self {
            status,
            public_message,
            report,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn public_message(&self) -> &'static str {
        self.public_message
    }

    pub fn into_report(self) -> ErrorReport {
        self.report
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.public_message).into_response();
        self.report.attach(&mut response);
        response
    }
}

const REPO_SOURCE: &str = "application::error::repo_error_to_http";

impl From<RepoError> for HttpError {
    fn from(error: RepoError) -> Self {
        let (status, message) = match &error {
            RepoError::NotFound => (StatusCode::NOT_FOUND, "Not found"),
            RepoError::Duplicate { .. } => (StatusCode::CONFLICT, "Resource already exists"),
            RepoError::InvalidInput { .. } => {
                (StatusCode::BAD_REQUEST, "Request could not be processed")
            }
            RepoError::Unauthorized => (StatusCode::UNAUTHORIZED, "Not signed in"),
            RepoError::Timeout => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Service temporarily unavailable",
            ),
            RepoError::Unconfigured { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Backend is not configured",
            ),
            RepoError::Persistence(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };
        HttpError::from_error(REPO_SOURCE, status, message, &error)
    }
}

impl From<PostServiceError> for HttpError {
    fn from(error: PostServiceError) -> Self {
        const SOURCE: &str = "application::error::post_error_to_http";
        match error {
            PostServiceError::NotFound => HttpError::new(
                SOURCE,
                StatusCode::NOT_FOUND,
                "Post not found",
                "no post matches the requested slug",
            ),
            PostServiceError::Invalid(err) => HttpError::from_error(
                SOURCE,
                StatusCode::BAD_REQUEST,
                "Request could not be processed",
                &err,
            ),
            err @ (PostServiceError::UnsluggableTitle | PostServiceError::SlugExhausted(_)) => {
                HttpError::from_error(
                    SOURCE,
                    StatusCode::BAD_REQUEST,
                    "Title cannot be used as a post address",
                    &err,
                )
            }
            PostServiceError::Repo(err) => HttpError::from(err),
        }
    }
}

impl From<ProfileServiceError> for HttpError {
    fn from(error: ProfileServiceError) -> Self {
        match error {
            ProfileServiceError::Invalid(err) => HttpError::from_error(
                "application::error::profile_error_to_http",
                StatusCode::BAD_REQUEST,
                "Request could not be processed",
                &err,
            ),
            ProfileServiceError::Repo(err) => HttpError::from(err),
        }
    }
}

impl From<SessionError> for HttpError {
    fn from(error: SessionError) -> Self {
        const SOURCE: &str = "application::error::session_error_to_http";
        match error {
            SessionError::Invalid(err) => HttpError::from_error(
                SOURCE,
                StatusCode::BAD_REQUEST,
                "Email and password are required",
                &err,
            ),
            SessionError::InvalidCredentials => HttpError::new(
                SOURCE,
                StatusCode::UNAUTHORIZED,
                "Email or password is incorrect",
                "credentials rejected by the auth service",
            ),
            err @ SessionError::Rejected(_) => HttpError::from_error(
                SOURCE,
                StatusCode::BAD_REQUEST,
                "Registration was rejected",
                &err,
            ),
            SessionError::Repo(err) => HttpError::from(err),
        }
    }
}

/// Process-level failure reported by `main` before exiting.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}
