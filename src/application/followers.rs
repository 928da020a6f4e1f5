use std::sync::Arc;

use crate::application::repos::{FollowersRepo, RepoError};
use crate::domain::entities::FollowerRecord;

#[derive(Clone)]
pub struct FollowerService {
    repo: Arc<dyn FollowersRepo>,
    profile_id: i64,
}

impl FollowerService {
    pub fn new(repo: Arc<dyn FollowersRepo>, profile_id: i64) -> Self {
        Self { repo, profile_id }
    }

    /// Followers of the profile, most recent first.
    pub async fn list(&self) -> Result<Vec<FollowerRecord>, RepoError> {
        let mut followers = self.repo.list_followers(self.profile_id).await?;
        followers.sort_by(|a, b| b.followed_at.cmp(&a.followed_at));
        Ok(followers)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use time::macros::datetime;

    use super::*;

    struct FixedFollowers(Vec<FollowerRecord>);

    #[async_trait]
    impl FollowersRepo for FixedFollowers {
        async fn list_followers(&self, profile_id: i64) -> Result<Vec<FollowerRecord>, RepoError> {
            assert_eq!(profile_id, 7);
            Ok(self.0.clone())
        }
    }

    fn follower(id: i64, followed_at: time::OffsetDateTime) -> FollowerRecord {
        FollowerRecord {
            id,
            follower_name: format!("follower {id}"),
            follower_email: None,
            followed_at,
        }
    }

    #[tokio::test]
    async fn lists_most_recent_followers_first() {
        let repo = FixedFollowers(vec![
            follower(1, datetime!(2024-01-01 10:00 UTC)),
            follower(2, datetime!(2024-03-01 10:00 UTC)),
            follower(3, datetime!(2024-02-01 10:00 UTC)),
        ]);
        let service = FollowerService::new(Arc::new(repo), 7);

        let ids: Vec<_> = service
            .list()
            .await
            .expect("listed")
            .iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(ids, [2, 3, 1]);
    }
}
