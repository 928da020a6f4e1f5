use async_trait::async_trait;

use crate::application::repos::{
    AccessToken, AuthGateway, CreatePostParams, FollowersRepo, PostsRepo, PostsWriteRepo,
    ProfileRepo, RepoError, UpdatePostParams,
};
use crate::domain::entities::{FollowerRecord, PostRecord, ProfileRecord, SessionUser};

/// Stand-in used when the backend coordinates are not configured. Every call
/// fails with [`RepoError::Unconfigured`] without touching the network.
#[derive(Debug, Clone)]
pub struct MissingBackend {
    missing: Vec<&'static str>,
}

impl MissingBackend {
    pub fn new(missing: Vec<&'static str>) -> Self {
        Self { missing }
    }

    fn error(&self) -> RepoError {
        RepoError::Unconfigured {
            message: format!("missing {}", self.missing.join(", ")),
        }
    }
}

#[async_trait]
impl PostsRepo for MissingBackend {
    async fn list_posts(&self) -> Result<Vec<PostRecord>, RepoError> {
        Err(self.error())
    }

    async fn find_by_slug(&self, _slug: &str) -> Result<Option<PostRecord>, RepoError> {
        Err(self.error())
    }
}

#[async_trait]
impl PostsWriteRepo for MissingBackend {
    async fn create_post(&self, _params: CreatePostParams) -> Result<PostRecord, RepoError> {
        Err(self.error())
    }

    async fn update_post(&self, _params: UpdatePostParams) -> Result<PostRecord, RepoError> {
        Err(self.error())
    }

    async fn delete_post(&self, _slug: &str) -> Result<u64, RepoError> {
        Err(self.error())
    }
}

#[async_trait]
impl ProfileRepo for MissingBackend {
    async fn load_profile(&self, _id: i64) -> Result<Option<ProfileRecord>, RepoError> {
        Err(self.error())
    }

    async fn save_profile(
        &self,
        _id: i64,
        _profile: &ProfileRecord,
    ) -> Result<ProfileRecord, RepoError> {
        Err(self.error())
    }

    async fn update_avatar(&self, _id: i64, _url: &str) -> Result<ProfileRecord, RepoError> {
        Err(self.error())
    }
}

#[async_trait]
impl FollowersRepo for MissingBackend {
    async fn list_followers(&self, _profile_id: i64) -> Result<Vec<FollowerRecord>, RepoError> {
        Err(self.error())
    }
}

#[async_trait]
impl AuthGateway for MissingBackend {
    async fn current_user(&self, _token: &str) -> Result<Option<SessionUser>, RepoError> {
        Err(self.error())
    }

    async fn sign_in(&self, _email: &str, _password: &str) -> Result<AccessToken, RepoError> {
        Err(self.error())
    }

    async fn sign_up(&self, _email: &str, _password: &str) -> Result<(), RepoError> {
        Err(self.error())
    }

    async fn sign_out(&self, _token: &str) -> Result<(), RepoError> {
        Err(self.error())
    }
}
