//! Domain entities mirrored from the hosted table store.

use serde::Serialize;
use time::{Date, OffsetDateTime};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostRecord {
    pub slug: String,
    pub title: String,
    pub content: String,
    #[serde(with = "crate::domain::posts::iso_date")]
    pub date: Date,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpertiseEntry {
    pub category: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileRecord {
    pub name: String,
    pub title: String,
    pub bio: String,
    pub current_focus: String,
    pub expertise: Vec<ExpertiseEntry>,
    pub email: String,
    pub linkedin: String,
    pub github: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FollowerRecord {
    pub id: i64,
    pub follower_name: String,
    pub follower_email: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub followed_at: OffsetDateTime,
}

/// Identity reported by the hosted auth service for a valid session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionUser {
    pub id: String,
    pub email: Option<String>,
}
