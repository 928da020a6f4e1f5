use async_trait::async_trait;
use reqwest::Method;

use crate::application::repos::{AccessToken, AuthGateway, RepoError};
use crate::domain::entities::SessionUser;

use super::rows::{AuthUserRow, CredentialsBody, TokenRow};
use super::{RestRepositories, read_json};

#[async_trait]
impl AuthGateway for RestRepositories {
    async fn current_user(&self, token: &str) -> Result<Option<SessionUser>, RepoError> {
        let url = self.auth_url(&["user"], &[])?;
        match self.send(self.request_as(Method::GET, url, token)).await {
            Ok(response) => {
                let row: AuthUserRow = read_json(response).await?;
                Ok(Some(row.into()))
            }
            Err(RepoError::Unauthorized | RepoError::NotFound) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AccessToken, RepoError> {
        let url = self.auth_url(&["token"], &[("grant_type", "password")])?;
        let request = self
            .request(Method::POST, url)
            .json(&CredentialsBody { email, password });

        let response = self.send(request).await?;
        let token: TokenRow = read_json(response).await?;
        Ok(AccessToken(token.access_token))
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<(), RepoError> {
        let url = self.auth_url(&["signup"], &[])?;
        let request = self
            .request(Method::POST, url)
            .json(&CredentialsBody { email, password });

        self.send(request).await.map(|_| ())
    }

    async fn sign_out(&self, token: &str) -> Result<(), RepoError> {
        let url = self.auth_url(&["logout"], &[])?;
        self.send(self.request_as(Method::POST, url, token))
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use httpmock::prelude::*;
    use reqwest::Url;
    use serde_json::json;

    use super::*;

    fn repositories(server: &MockServer) -> RestRepositories {
        let base = Url::parse(&server.base_url()).expect("base url");
        RestRepositories::new(&base, "anon-key", Duration::from_secs(5)).expect("client")
    }

    #[tokio::test]
    async fn current_user_sends_the_user_token() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/auth/v1/user")
                    .header("apikey", "anon-key")
                    .header("authorization", "Bearer user-token");
                then.status(200)
                    .json_body(json!({"id": "user-1", "email": "ada@example.com"}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/auth/v1/user")
                    .header("authorization", "Bearer stale-token");
                then.status(401).json_body(json!({"msg": "invalid JWT"}));
            })
            .await;

        let repos = repositories(&server);
        let user = repos.current_user("user-token").await.expect("lookup");
        assert_eq!(user.map(|u| u.id).as_deref(), Some("user-1"));

        let stale = repos.current_user("stale-token").await.expect("lookup");
        assert!(stale.is_none());
    }

    #[tokio::test]
    async fn sign_in_uses_password_grant() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/auth/v1/token")
                    .query_param("grant_type", "password")
                    .json_body(json!({"email": "ada@example.com", "password": "secret"}));
                then.status(200).json_body(json!({
                    "access_token": "user-token",
                    "token_type": "bearer",
                    "expires_in": 3600
                }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/auth/v1/token")
                    .json_body(json!({"email": "ada@example.com", "password": "wrong"}));
                then.status(400).json_body(json!({
                    "error": "invalid_grant",
                    "error_description": "Invalid login credentials"
                }));
            })
            .await;

        let repos = repositories(&server);
        let token = repos
            .sign_in("ada@example.com", "secret")
            .await
            .expect("signed in");
        assert_eq!(token, AccessToken("user-token".into()));

        let err = repos
            .sign_in("ada@example.com", "wrong")
            .await
            .expect_err("rejected");
        assert!(matches!(err, RepoError::Unauthorized));
    }
}
