#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use time::macros::{date, datetime};
use tokio::sync::Mutex;
use tower::ServiceExt;

use minblog::application::repos::{
    AccessToken, AuthGateway, CreatePostParams, FollowersRepo, PostsRepo, PostsWriteRepo,
    ProfileRepo, RepoError, UpdatePostParams,
};
use minblog::config::Settings;
use minblog::domain::entities::{FollowerRecord, PostRecord, ProfileRecord, SessionUser};
use minblog::infra::backend::{MissingBackend, Repositories};
use minblog::infra::http::{RouterState, build_router};

pub const VALID_TOKEN: &str = "token-ada";
pub const PASSWORD: &str = "secret";

/// Hosted backend stand-in keeping every table in memory.
#[derive(Default)]
pub struct MemoryBackend {
    pub posts: Mutex<Vec<PostRecord>>,
    pub profile: Mutex<Option<ProfileRecord>>,
    pub followers: Mutex<Vec<FollowerRecord>>,
    pub profile_writes: Mutex<usize>,
    pub signed_out: Mutex<Vec<String>>,
}

impl MemoryBackend {
    pub fn with_posts(posts: Vec<PostRecord>) -> Self {
        Self {
            posts: Mutex::new(posts),
            ..Self::default()
        }
    }

    pub fn seeded() -> Self {
        Self {
            posts: Mutex::new(vec![
                post("first-post", "First Post", "Hello there.\n\nSecond paragraph.", date!(2023 - 10 - 01)),
                post("third-post", "Third Post", "Newest entry.", date!(2023 - 10 - 03)),
            ]),
            followers: Mutex::new(vec![
                FollowerRecord {
                    id: 1,
                    follower_name: "Alan".into(),
                    follower_email: None,
                    followed_at: datetime!(2024-01-01 10:00 UTC),
                },
                FollowerRecord {
                    id: 2,
                    follower_name: "Grace".into(),
                    follower_email: Some("grace@example.com".into()),
                    followed_at: datetime!(2024-03-01 10:00 UTC),
                },
            ]),
            ..Self::default()
        }
    }
}

pub fn post(slug: &str, title: &str, content: &str, date: time::Date) -> PostRecord {
    PostRecord {
        slug: slug.into(),
        title: title.into(),
        content: content.into(),
        date,
    }
}

#[async_trait]
impl PostsRepo for MemoryBackend {
    async fn list_posts(&self) -> Result<Vec<PostRecord>, RepoError> {
        Ok(self.posts.lock().await.clone())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<PostRecord>, RepoError> {
        Ok(self
            .posts
            .lock()
            .await
            .iter()
            .find(|post| post.slug == slug)
            .cloned())
    }
}

#[async_trait]
impl PostsWriteRepo for MemoryBackend {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let mut posts = self.posts.lock().await;
        if posts.iter().any(|post| post.slug == params.slug) {
            return Err(RepoError::Duplicate {
                constraint: "posts_slug_key".into(),
            });
        }
        let record = PostRecord {
            slug: params.slug,
            title: params.title,
            content: params.content,
            date: params.date,
        };
        posts.push(record.clone());
        Ok(record)
    }

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError> {
        let mut posts = self.posts.lock().await;
        let post = posts
            .iter_mut()
            .find(|post| post.slug == params.slug)
            .ok_or(RepoError::NotFound)?;
        post.title = params.title;
        post.content = params.content;
        post.date = params.date;
        Ok(post.clone())
    }

    async fn delete_post(&self, slug: &str) -> Result<u64, RepoError> {
        let mut posts = self.posts.lock().await;
        let before = posts.len();
        posts.retain(|post| post.slug != slug);
        Ok((before - posts.len()) as u64)
    }
}

#[async_trait]
impl ProfileRepo for MemoryBackend {
    async fn load_profile(&self, _id: i64) -> Result<Option<ProfileRecord>, RepoError> {
        Ok(self.profile.lock().await.clone())
    }

    async fn save_profile(
        &self,
        _id: i64,
        profile: &ProfileRecord,
    ) -> Result<ProfileRecord, RepoError> {
        *self.profile_writes.lock().await += 1;
        *self.profile.lock().await = Some(profile.clone());
        Ok(profile.clone())
    }

    async fn update_avatar(&self, _id: i64, url: &str) -> Result<ProfileRecord, RepoError> {
        let mut stored = self.profile.lock().await;
        let profile = stored.as_mut().ok_or(RepoError::NotFound)?;
        profile.avatar_url = Some(url.to_string());
        *self.profile_writes.lock().await += 1;
        Ok(profile.clone())
    }
}

#[async_trait]
impl FollowersRepo for MemoryBackend {
    async fn list_followers(&self, _profile_id: i64) -> Result<Vec<FollowerRecord>, RepoError> {
        Ok(self.followers.lock().await.clone())
    }
}

#[async_trait]
impl AuthGateway for MemoryBackend {
    async fn current_user(&self, token: &str) -> Result<Option<SessionUser>, RepoError> {
        if token == VALID_TOKEN {
            Ok(Some(SessionUser {
                id: "user-ada".into(),
                email: Some("ada@example.com".into()),
            }))
        } else {
            Ok(None)
        }
    }

    async fn sign_in(&self, _email: &str, password: &str) -> Result<AccessToken, RepoError> {
        if password == PASSWORD {
            Ok(AccessToken(VALID_TOKEN.into()))
        } else {
            Err(RepoError::Unauthorized)
        }
    }

    async fn sign_up(&self, email: &str, _password: &str) -> Result<(), RepoError> {
        if email == "ada@example.com" {
            Err(RepoError::Duplicate {
                constraint: "user_already_exists".into(),
            })
        } else {
            Ok(())
        }
    }

    async fn sign_out(&self, token: &str) -> Result<(), RepoError> {
        self.signed_out.lock().await.push(token.to_string());
        Ok(())
    }
}

pub fn app(backend: Arc<MemoryBackend>) -> Router {
    build_router(RouterState::new(
        Repositories::from_source(backend),
        &Settings::default(),
    ))
}

pub fn unconfigured_app() -> Router {
    let missing = MissingBackend::new(vec!["backend.url", "backend.key"]);
    build_router(RouterState::new(
        Repositories::from_source(Arc::new(missing)),
        &Settings::default(),
    ))
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.expect("router response")
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_text(response).await).expect("json body")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("request")
}

pub fn get_with_session(uri: &str) -> Request<Body> {
    Request::get(uri)
        .header("cookie", format!("minblog_session={VALID_TOKEN}"))
        .body(Body::empty())
        .expect("request")
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn form_request(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .expect("request")
}
