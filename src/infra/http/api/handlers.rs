use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum_extra::extract::cookie::CookieJar;
use minblog_api_types::{
    AvatarRequest, DeletePostQuery, DeleteResponse, PostCreateRequest, PostCreatedResponse,
    PostUpdateRequest, ProfilePayload,
};

use crate::application::posts::{CreatePostCommand, UpdatePostCommand};
use crate::infra::http::session::session_token;

use super::error::ApiError;
use super::models::*;
use super::state::ApiState;

/// -------- Posts --------
pub async fn list_posts(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let posts = state.posts.list_posts().await?;
    Ok(Json(posts.into_iter().map(post_response).collect::<Vec<_>>()))
}

pub async fn get_post(
    State(state): State<ApiState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state.posts.find_post(&slug).await?;
    Ok(Json(post_response(post)))
}

pub async fn create_post(
    State(state): State<ApiState>,
    payload: Result<Json<PostCreateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;

    let command = CreatePostCommand {
        title: payload.title,
        content: payload.content,
        date: payload.date,
    };
    let post = state.posts.create_post(command).await?;

    Ok((
        StatusCode::CREATED,
        Json(PostCreatedResponse { slug: post.slug }),
    ))
}

pub async fn update_post(
    State(state): State<ApiState>,
    Path(slug): Path<String>,
    payload: Result<Json<PostUpdateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;

    let command = UpdatePostCommand {
        slug,
        title: payload.title,
        content: payload.content,
        date: payload.date,
    };
    let post = state.posts.update_post(command).await?;

    Ok(Json(post_response(post)))
}

/// `DELETE /api/posts?slug=...`
pub async fn delete_post_by_query(
    State(state): State<ApiState>,
    Query(query): Query<DeletePostQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let slug = query
        .slug
        .filter(|slug| !slug.trim().is_empty())
        .ok_or_else(|| {
            ApiError::bad_request("Slug is required", Some("pass ?slug=<slug>".to_string()))
        })?;

    delete_post_inner(&state, &slug).await
}

pub async fn delete_post(
    State(state): State<ApiState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    delete_post_inner(&state, &slug).await
}

async fn delete_post_inner(state: &ApiState, slug: &str) -> Result<Json<DeleteResponse>, ApiError> {
    state.posts.delete_post(slug).await?;
    Ok(Json(DeleteResponse { success: true }))
}

/// -------- Profile --------
pub async fn get_profile(State(state): State<ApiState>) -> impl IntoResponse {
    Json(profile_response(state.profile.load().await))
}

pub async fn put_profile(
    State(state): State<ApiState>,
    payload: Result<Json<ProfilePayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let stored = state.profile.save(profile_record(payload)).await?;
    Ok(Json(stored_profile_response(stored)))
}

pub async fn put_avatar(
    State(state): State<ApiState>,
    payload: Result<Json<AvatarRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let stored = state.profile.set_avatar(&payload.url).await?;
    Ok(Json(stored_profile_response(stored)))
}

/// -------- Followers --------
pub async fn list_followers(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let followers = state.followers.list().await?;
    Ok(Json(
        followers
            .into_iter()
            .map(follower_response)
            .collect::<Vec<_>>(),
    ))
}

/// -------- Session --------
pub async fn get_session(State(state): State<ApiState>, jar: CookieJar) -> impl IntoResponse {
    let token = session_token(&jar);
    let navigation = state.chrome.navigation(token.as_deref()).await;
    Json(session_response(navigation))
}
