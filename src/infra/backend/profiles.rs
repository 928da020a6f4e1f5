use async_trait::async_trait;
use reqwest::Method;

use crate::application::repos::{ProfileRepo, RepoError};
use crate::domain::entities::ProfileRecord;

use super::RestRepositories;
use super::prefer_representation;
use super::rows::{AvatarPatch, ProfileRow, ProfileUpsert};

const TABLE: &str = "profiles";

fn id_filter(id: i64) -> (&'static str, String) {
    ("id", format!("eq.{id}"))
}

#[async_trait]
impl ProfileRepo for RestRepositories {
    async fn load_profile(&self, id: i64) -> Result<Option<ProfileRecord>, RepoError> {
        let url = self.table_url(
            TABLE,
            &[
                ("select", "*".to_string()),
                id_filter(id),
                ("limit", "1".to_string()),
            ],
        )?;
        let row: Option<ProfileRow> = self.fetch_first(self.request(Method::GET, url)).await?;
        Ok(row.map(ProfileRecord::from))
    }

    async fn save_profile(
        &self,
        id: i64,
        profile: &ProfileRecord,
    ) -> Result<ProfileRecord, RepoError> {
        let url = self.table_url(TABLE, &[("on_conflict", "id".to_string())])?;
        let request = self
            .request(Method::POST, url)
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&ProfileUpsert::new(id, profile));

        let row: Option<ProfileRow> = self.fetch_first(request).await?;
        Ok(row.map(ProfileRecord::from).unwrap_or_else(|| profile.clone()))
    }

    async fn update_avatar(&self, id: i64, url: &str) -> Result<ProfileRecord, RepoError> {
        let endpoint = self.table_url(TABLE, &[id_filter(id)])?;
        let request = prefer_representation(self.request(Method::PATCH, endpoint))
            .json(&AvatarPatch { avatar_url: url });

        let row: Option<ProfileRow> = self.fetch_first(request).await?;
        row.map(ProfileRecord::from).ok_or(RepoError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use httpmock::prelude::*;
    use reqwest::Url;
    use serde_json::json;

    use super::*;
    use crate::domain::profile::fallback_profile;

    fn repositories(server: &MockServer) -> RestRepositories {
        let base = Url::parse(&server.base_url()).expect("base url");
        RestRepositories::new(&base, "anon-key", Duration::from_secs(5)).expect("client")
    }

    #[tokio::test]
    async fn missing_profile_row_is_none() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/rest/v1/profiles")
                    .query_param("id", "eq.1");
                then.status(200).json_body(json!([]));
            })
            .await;

        let profile = repositories(&server).load_profile(1).await.expect("load");
        assert!(profile.is_none());
    }

    #[tokio::test]
    async fn save_upserts_on_the_profile_id() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/rest/v1/profiles")
                    .query_param("on_conflict", "id")
                    .header(
                        "prefer",
                        "resolution=merge-duplicates,return=representation",
                    );
                then.status(201).json_body(json!([{
                    "id": 1,
                    "name": "Fiqri Pramana",
                    "expertise": [{"category": "Database", "description": "PostgreSQL"}]
                }]));
            })
            .await;

        let stored = repositories(&server)
            .save_profile(1, &fallback_profile())
            .await
            .expect("saved");

        mock.assert_async().await;
        assert_eq!(stored.name, "Fiqri Pramana");
        assert_eq!(stored.expertise.len(), 1);
    }
}
