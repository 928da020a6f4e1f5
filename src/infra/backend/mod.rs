//! Repository implementations backed by the hosted table store and auth
//! service, reached over their REST interfaces.

mod auth;
mod followers;
mod missing;
mod posts;
mod profiles;
mod rows;

pub use missing::MissingBackend;

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::application::repos::{
    AuthGateway, FollowersRepo, PostsRepo, PostsWriteRepo, ProfileRepo, RepoError,
};
use crate::config::BackendSettings;
use crate::infra::error::InfraError;

const REST_PREFIX: [&str; 2] = ["rest", "v1"];
const AUTH_PREFIX: [&str; 2] = ["auth", "v1"];
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone, Debug)]
pub struct RestRepositories {
    client: Client,
    base: Url,
    key: String,
}

impl RestRepositories {
    pub fn new(base: &Url, key: impl Into<String>, timeout: Duration) -> Result<Self, InfraError> {
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(timeout)
            .build()
            .map_err(|err| InfraError::backend(format!("failed to build http client: {err}")))?;

        Ok(Self {
            client,
            base: base.clone(),
            key: key.into(),
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("minblog/", env!("CARGO_PKG_VERSION"))
    }

    fn endpoint(&self, prefix: [&str; 2], path: &[&str]) -> Result<Url, RepoError> {
        let mut url = self.base.clone();
        url.set_query(None);
        url.path_segments_mut()
            .map_err(|_| RepoError::Unconfigured {
                message: format!("backend url `{}` cannot carry a path", self.base),
            })?
            .pop_if_empty()
            .extend(prefix)
            .extend(path);
        Ok(url)
    }

    /// URL of a table endpoint with PostgREST-style query parameters.
    fn table_url(&self, table: &str, query: &[(&str, String)]) -> Result<Url, RepoError> {
        let mut url = self.endpoint(REST_PREFIX, &[table])?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn auth_url(&self, path: &[&str], query: &[(&str, &str)]) -> Result<Url, RepoError> {
        let mut url = self.endpoint(AUTH_PREFIX, path)?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Request carrying the project key as both `apikey` and bearer token.
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.request_as(method, url, &self.key)
    }

    /// Request on behalf of a signed-in user: the project key identifies the
    /// project, the user's token authorizes the call.
    fn request_as(&self, method: Method, url: Url, bearer: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.key)
            .bearer_auth(bearer)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, RepoError> {
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        debug!(
            target = "minblog::backend",
            url = %response.url().path(),
            status = status.as_u16(),
            "backend responded"
        );

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(map_status_error(status, &body))
    }

    async fn fetch_rows<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Vec<T>, RepoError> {
        let response = self.send(request).await?;
        read_json(response).await
    }

    async fn fetch_first<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Option<T>, RepoError> {
        Ok(self.fetch_rows(request).await?.into_iter().next())
    }

    pub async fn health_check(&self) -> Result<(), RepoError> {
        let url = self.table_url(
            "posts",
            &[("select", "slug".to_string()), ("limit", "1".to_string())],
        )?;
        self.send(self.request(Method::GET, url)).await.map(|_| ())
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, RepoError> {
    let bytes = response.bytes().await.map_err(map_transport_error)?;
    serde_json::from_slice(&bytes)
        .map_err(|err| RepoError::from_persistence(format!("failed to parse backend body: {err}")))
}

fn prefer_representation(request: RequestBuilder) -> RequestBuilder {
    request.header("Prefer", "return=representation")
}

fn map_transport_error(err: reqwest::Error) -> RepoError {
    if err.is_timeout() {
        RepoError::Timeout
    } else {
        RepoError::from_persistence(err)
    }
}

/// Error body shapes returned by the table store and the auth service.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BackendErrorBody {
    code: Option<serde_json::Value>,
    message: Option<String>,
    msg: Option<String>,
    error: Option<String>,
    error_code: Option<String>,
    error_description: Option<String>,
    details: Option<String>,
}

impl BackendErrorBody {
    fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    fn code(&self) -> Option<String> {
        match self.code.as_ref()? {
            serde_json::Value::String(code) => Some(code.clone()),
            serde_json::Value::Number(code) => Some(code.to_string()),
            _ => None,
        }
    }

    fn message(&self) -> Option<String> {
        self.message
            .clone()
            .or_else(|| self.msg.clone())
            .or_else(|| self.error_description.clone())
            .or_else(|| self.error.clone())
    }

    fn constraint(&self) -> String {
        self.message
            .as_deref()
            .and_then(|message| message.split('"').nth(1))
            .or(self.error_code.as_deref())
            .unwrap_or("unknown")
            .to_string()
    }
}

pub(crate) fn map_status_error(status: StatusCode, body: &str) -> RepoError {
    let parsed = BackendErrorBody::parse(body);
    let message = parsed
        .message()
        .unwrap_or_else(|| format!("backend responded with status {status}"));

    let duplicate = status == StatusCode::CONFLICT
        || parsed.code().as_deref() == Some(UNIQUE_VIOLATION)
        || parsed.error_code.as_deref() == Some("user_already_exists");
    if duplicate {
        return RepoError::Duplicate {
            constraint: parsed.constraint(),
        };
    }

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RepoError::Unauthorized,
        StatusCode::NOT_FOUND => RepoError::NotFound,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => RepoError::Timeout,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            if parsed.error.as_deref() == Some("invalid_grant") {
                return RepoError::Unauthorized;
            }
            let message = match parsed.details.as_deref() {
                Some(details) => format!("{message} ({details})"),
                None => message,
            };
            RepoError::InvalidInput { message }
        }
        _ => RepoError::from_persistence(format!("status {status}: {message}")),
    }
}

/// Every repository seam the application needs, backed by one data source.
#[derive(Clone)]
pub struct Repositories {
    pub posts: Arc<dyn PostsRepo>,
    pub posts_write: Arc<dyn PostsWriteRepo>,
    pub profile: Arc<dyn ProfileRepo>,
    pub followers: Arc<dyn FollowersRepo>,
    pub auth: Arc<dyn AuthGateway>,
}

impl Repositories {
    pub fn from_source<R>(source: Arc<R>) -> Self
    where
        R: PostsRepo + PostsWriteRepo + ProfileRepo + FollowersRepo + AuthGateway + 'static,
    {
        Self {
            posts: source.clone(),
            posts_write: source.clone(),
            profile: source.clone(),
            followers: source.clone(),
            auth: source,
        }
    }
}

/// Build the repositories for the configured backend. Missing coordinates
/// yield a stand-in that fails every call instead of aborting start-up.
pub fn connect(settings: &BackendSettings) -> Result<Repositories, InfraError> {
    match settings.credentials() {
        Some((url, key)) => {
            let rest = RestRepositories::new(url, key, settings.timeout)?;
            debug!(target = "minblog::backend", base = %url, "backend client ready");
            Ok(Repositories::from_source(Arc::new(rest)))
        }
        None => {
            let missing = settings.missing_keys();
            warn!(
                target = "minblog::backend",
                missing = ?missing,
                "backend is not configured; data operations will fail"
            );
            Ok(Repositories::from_source(Arc::new(MissingBackend::new(
                missing,
            ))))
        }
    }
}
