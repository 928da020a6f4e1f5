pub mod api;
mod middleware;
mod public;
pub mod session;

pub use api::{ApiState, build_api_router};
pub use public::HttpState;

use std::sync::Arc;

use axum::extract::FromRef;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Router, middleware as axum_middleware, routing::get};

use crate::application::chrome::{ChromeService, SiteIdentity};
use crate::application::followers::FollowerService;
use crate::application::posts::PostService;
use crate::application::profile::ProfileService;
use crate::application::session::SessionService;
use crate::config::Settings;
use crate::infra::backend::Repositories;

use self::middleware::{log_responses, set_request_context};

#[derive(Clone)]
pub struct RouterState {
    pub http: HttpState,
    pub api: ApiState,
}

impl RouterState {
    /// Wire the application services over one set of repositories.
    pub fn new(repositories: Repositories, settings: &Settings) -> Self {
        let posts = Arc::new(PostService::new(
            repositories.posts.clone(),
            repositories.posts_write.clone(),
        ));
        let profile = Arc::new(ProfileService::new(
            repositories.profile.clone(),
            settings.profile.id,
        ));
        let followers = Arc::new(FollowerService::new(
            repositories.followers.clone(),
            settings.profile.id,
        ));
        let sessions = Arc::new(SessionService::new(repositories.auth.clone()));
        let chrome = Arc::new(ChromeService::new(
            sessions.clone(),
            SiteIdentity {
                title: settings.site.title.clone(),
                tagline: settings.site.tagline.clone(),
            },
        ));

        Self {
            http: HttpState {
                posts: posts.clone(),
                profile: profile.clone(),
                followers: followers.clone(),
                sessions,
                chrome: chrome.clone(),
            },
            api: ApiState {
                posts,
                profile,
                followers,
                chrome,
            },
        }
    }
}

impl FromRef<RouterState> for HttpState {
    fn from_ref(state: &RouterState) -> Self {
        state.http.clone()
    }
}

impl FromRef<RouterState> for ApiState {
    fn from_ref(state: &RouterState) -> Self {
        state.api.clone()
    }
}

/// Pages, JSON API and health probe behind the shared request logging.
pub fn build_router(state: RouterState) -> Router {
    Router::new()
        .route("/_health", get(health))
        .merge(build_api_router())
        .merge(public::build_router())
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}

async fn health() -> Response {
    StatusCode::NO_CONTENT.into_response()
}
