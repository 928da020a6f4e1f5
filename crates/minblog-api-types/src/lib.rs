//! Request and response payloads exchanged over the minblog JSON API.
//!
//! Dates travel as `YYYY-MM-DD` strings and timestamps as RFC 3339 strings so
//! that clients do not need a date library to talk to the service.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/posts`.
///
/// Every field is optional on the wire so that a missing field is reported as
/// a validation failure rather than a deserialization rejection.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PostCreateRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PostCreatedResponse {
    pub slug: String,
}

/// Body of `PATCH /api/posts/{slug}`. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PostUpdateRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PostResponse {
    pub slug: String,
    pub title: String,
    pub content: String,
    pub date: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeletePostQuery {
    pub slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExpertisePayload {
    pub category: String,
    pub description: String,
}

/// Full profile field set, used both for reads and for wholesale saves.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProfilePayload {
    pub name: String,
    pub title: String,
    pub bio: String,
    pub current_focus: String,
    #[serde(default)]
    pub expertise: Vec<ExpertisePayload>,
    pub email: String,
    pub linkedin: String,
    pub github: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub profile: ProfilePayload,
    /// `true` when the stored record could not be loaded and defaults were served.
    pub fallback: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AvatarRequest {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FollowerResponse {
    pub id: i64,
    pub follower_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follower_email: Option<String>,
    pub followed_at: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionUserResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MenuEntryResponse {
    pub label: String,
    pub href: String,
    /// HTTP method the entry must be submitted with (`GET` links, `POST` forms).
    pub method: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionResponse {
    pub user: Option<SessionUserResponse>,
    pub menu: Vec<MenuEntryResponse>,
}
