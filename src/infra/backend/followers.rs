use async_trait::async_trait;
use reqwest::Method;

use crate::application::repos::{FollowersRepo, RepoError};
use crate::domain::entities::FollowerRecord;

use super::RestRepositories;
use super::rows::FollowerRow;

#[async_trait]
impl FollowersRepo for RestRepositories {
    async fn list_followers(&self, profile_id: i64) -> Result<Vec<FollowerRecord>, RepoError> {
        let url = self.table_url(
            "followers",
            &[
                ("select", "*".to_string()),
                ("profile_id", format!("eq.{profile_id}")),
                ("order", "followed_at.desc".to_string()),
            ],
        )?;
        let rows: Vec<FollowerRow> = self.fetch_rows(self.request(Method::GET, url)).await?;
        rows.into_iter().map(FollowerRecord::try_from).collect()
    }
}
