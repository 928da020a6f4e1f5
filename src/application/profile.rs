use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::application::repos::{ProfileRepo, RepoError};
use crate::domain::entities::ProfileRecord;
use crate::domain::error::DomainError;
use crate::domain::profile::fallback_profile;

#[derive(Debug, Error)]
pub enum ProfileServiceError {
    #[error(transparent)]
    Invalid(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Where a loaded profile came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileSource {
    Stored,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct LoadedProfile {
    pub profile: ProfileRecord,
    pub source: ProfileSource,
}

#[derive(Clone)]
pub struct ProfileService {
    repo: Arc<dyn ProfileRepo>,
    profile_id: i64,
}

impl ProfileService {
    pub fn new(repo: Arc<dyn ProfileRepo>, profile_id: i64) -> Self {
        Self { repo, profile_id }
    }

    /// Load the singleton profile, substituting the fallback record when the
    /// stored one is missing or unreachable.
    pub async fn load(&self) -> LoadedProfile {
        match self.repo.load_profile(self.profile_id).await {
            Ok(Some(profile)) => LoadedProfile {
                profile,
                source: ProfileSource::Stored,
            },
            Ok(None) => {
                warn!(
                    target = "minblog::profile",
                    profile_id = self.profile_id,
                    "profile row missing; serving fallback"
                );
                Self::fallback()
            }
            Err(err) => {
                warn!(
                    target = "minblog::profile",
                    profile_id = self.profile_id,
                    error = %err,
                    "failed to load profile; serving fallback"
                );
                Self::fallback()
            }
        }
    }

    pub async fn save(&self, profile: ProfileRecord) -> Result<ProfileRecord, ProfileServiceError> {
        if profile.name.trim().is_empty() {
            return Err(DomainError::missing("name").into());
        }
        if let Some(url) = profile.avatar_url.as_deref() {
            validate_avatar_url(url)?;
        }

        let stored = self.repo.save_profile(self.profile_id, &profile).await?;
        info!(
            target = "minblog::profile",
            profile_id = self.profile_id,
            "profile saved"
        );
        Ok(stored)
    }

    /// Store the URL handed back by the upload endpoint as the avatar.
    pub async fn set_avatar(&self, url: &str) -> Result<ProfileRecord, ProfileServiceError> {
        let url = url.trim();
        validate_avatar_url(url)?;

        let stored = self.repo.update_avatar(self.profile_id, url).await?;
        info!(
            target = "minblog::profile",
            profile_id = self.profile_id,
            avatar_url = url,
            "avatar updated"
        );
        Ok(stored)
    }

    fn fallback() -> LoadedProfile {
        LoadedProfile {
            profile: fallback_profile(),
            source: ProfileSource::Fallback,
        }
    }
}

/// Accept absolute URLs and site-relative paths.
fn validate_avatar_url(url: &str) -> Result<(), DomainError> {
    if url.is_empty() {
        return Err(DomainError::missing("avatar_url"));
    }
    if url.starts_with('/') && !url.starts_with("//") {
        return Ok(());
    }

    Url::parse(url)
        .map(|_| ())
        .map_err(|err| DomainError::invalid("avatar_url", err.to_string()))
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct MemoryProfiles {
        stored: Mutex<Option<ProfileRecord>>,
        writes: Mutex<u32>,
        fail_reads: bool,
    }

    #[async_trait]
    impl ProfileRepo for MemoryProfiles {
        async fn load_profile(&self, _id: i64) -> Result<Option<ProfileRecord>, RepoError> {
            if self.fail_reads {
                return Err(RepoError::Persistence("connection refused".into()));
            }
            Ok(self.stored.lock().await.clone())
        }

        async fn save_profile(
            &self,
            _id: i64,
            profile: &ProfileRecord,
        ) -> Result<ProfileRecord, RepoError> {
            *self.writes.lock().await += 1;
            *self.stored.lock().await = Some(profile.clone());
            Ok(profile.clone())
        }

        async fn update_avatar(&self, _id: i64, url: &str) -> Result<ProfileRecord, RepoError> {
            *self.writes.lock().await += 1;
            let mut stored = self.stored.lock().await;
            let profile = stored.as_mut().ok_or(RepoError::NotFound)?;
            profile.avatar_url = Some(url.to_string());
            Ok(profile.clone())
        }
    }

    #[tokio::test]
    async fn failed_load_serves_fallback_without_writing() {
        let repo = Arc::new(MemoryProfiles {
            fail_reads: true,
            ..Default::default()
        });
        let service = ProfileService::new(repo.clone(), 1);

        let loaded = service.load().await;

        assert_eq!(loaded.source, ProfileSource::Fallback);
        assert_eq!(loaded.profile.name, "Fiqri Pramana");
        assert_eq!(*repo.writes.lock().await, 0);
        assert!(repo.stored.lock().await.is_none());
    }

    #[tokio::test]
    async fn missing_row_serves_fallback() {
        let service = ProfileService::new(Arc::new(MemoryProfiles::default()), 1);
        assert_eq!(service.load().await.source, ProfileSource::Fallback);
    }

    #[tokio::test]
    async fn saved_profile_is_loaded_back() {
        let repo = Arc::new(MemoryProfiles::default());
        let service = ProfileService::new(repo.clone(), 1);

        let mut profile = fallback_profile();
        profile.name = "Ada Lovelace".into();
        service.save(profile).await.expect("saved");

        let loaded = service.load().await;
        assert_eq!(loaded.source, ProfileSource::Stored);
        assert_eq!(loaded.profile.name, "Ada Lovelace");
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let repo = Arc::new(MemoryProfiles::default());
        let service = ProfileService::new(repo.clone(), 1);

        let mut profile = fallback_profile();
        profile.name = "  ".into();
        let err = service.save(profile).await.expect_err("invalid");

        assert!(matches!(err, ProfileServiceError::Invalid(_)));
        assert_eq!(*repo.writes.lock().await, 0);
    }

    #[tokio::test]
    async fn avatar_accepts_absolute_and_site_relative_urls() {
        let repo = Arc::new(MemoryProfiles::default());
        *repo.stored.lock().await = Some(fallback_profile());
        let service = ProfileService::new(repo, 1);

        let profile = service
            .set_avatar("https://cdn.example.com/a.png")
            .await
            .expect("absolute");
        assert_eq!(
            profile.avatar_url.as_deref(),
            Some("https://cdn.example.com/a.png")
        );

        service
            .set_avatar("/uploads/a.png")
            .await
            .expect("site relative");

        let err = service.set_avatar("not a url").await.expect_err("invalid");
        assert!(matches!(err, ProfileServiceError::Invalid(_)));
    }
}
