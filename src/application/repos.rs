//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use time::Date;

use crate::domain::entities::{FollowerRecord, PostRecord, ProfileRecord, SessionUser};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("credentials rejected")]
    Unauthorized,
    #[error("backend timeout")]
    Timeout,
    #[error("backend is not configured: {message}")]
    Unconfigured { message: String },
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct CreatePostParams {
    pub slug: String,
    pub title: String,
    pub content: String,
    pub date: Date,
}

#[derive(Debug, Clone)]
pub struct UpdatePostParams {
    pub slug: String,
    pub title: String,
    pub content: String,
    pub date: Date,
}

#[async_trait]
pub trait PostsRepo: Send + Sync {
    /// Every stored post, newest first as far as the store can tell.
    async fn list_posts(&self) -> Result<Vec<PostRecord>, RepoError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<PostRecord>, RepoError>;
}

#[async_trait]
pub trait PostsWriteRepo: Send + Sync {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError>;

    /// Overwrite title, content and date of the post with the given slug.
    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError>;

    /// Remove every post carrying `slug`, returning how many were removed.
    async fn delete_post(&self, slug: &str) -> Result<u64, RepoError>;
}

#[async_trait]
pub trait ProfileRepo: Send + Sync {
    async fn load_profile(&self, id: i64) -> Result<Option<ProfileRecord>, RepoError>;

    /// Write the full field set of the profile keyed by `id`, creating it if absent.
    async fn save_profile(
        &self,
        id: i64,
        profile: &ProfileRecord,
    ) -> Result<ProfileRecord, RepoError>;

    async fn update_avatar(&self, id: i64, url: &str) -> Result<ProfileRecord, RepoError>;
}

#[async_trait]
pub trait FollowersRepo: Send + Sync {
    async fn list_followers(&self, profile_id: i64) -> Result<Vec<FollowerRecord>, RepoError>;
}

/// Access token issued by the hosted auth service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(pub String);

#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Resolve a token to its user. Expired or unknown tokens yield `Ok(None)`.
    async fn current_user(&self, token: &str) -> Result<Option<SessionUser>, RepoError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AccessToken, RepoError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<(), RepoError>;

    async fn sign_out(&self, token: &str) -> Result<(), RepoError>;
}
