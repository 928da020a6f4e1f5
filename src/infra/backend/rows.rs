//! Wire rows of the hosted tables and their conversion into domain records.

use serde::{Deserialize, Serialize};
use time::{
    OffsetDateTime, PrimitiveDateTime,
    format_description::well_known::{Iso8601, Rfc3339},
};

use crate::application::repos::RepoError;
use crate::domain::entities::{
    ExpertiseEntry, FollowerRecord, PostRecord, ProfileRecord, SessionUser,
};
use crate::domain::posts::{format_post_date, parse_post_date};

#[derive(Debug, Deserialize)]
pub(crate) struct PostRow {
    pub(crate) slug: String,
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) content: Option<String>,
    pub(crate) date: String,
}

impl TryFrom<PostRow> for PostRecord {
    type Error = RepoError;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        // Date columns may come back with a time part.
        let day = row.date.get(..10).unwrap_or(&row.date);
        let date = parse_post_date(day).map_err(|err| {
            RepoError::from_persistence(format!("post `{}` has a bad date: {err}", row.slug))
        })?;

        Ok(Self {
            slug: row.slug,
            title: row.title,
            content: row.content.unwrap_or_default(),
            date,
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PostInsert<'a> {
    pub(crate) slug: &'a str,
    pub(crate) title: &'a str,
    pub(crate) content: &'a str,
    pub(crate) date: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct PostPatch<'a> {
    pub(crate) title: &'a str,
    pub(crate) content: &'a str,
    pub(crate) date: String,
}

impl<'a> PostPatch<'a> {
    pub(crate) fn new(title: &'a str, content: &'a str, date: time::Date) -> Self {
        Self {
            title,
            content,
            date: format_post_date(date),
        }
    }
}

/// Expertise column value: current rows hold `{category, description}`
/// objects, older rows hold `"Category: Description"` strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ExpertiseCell {
    Pair {
        category: String,
        #[serde(default)]
        description: String,
    },
    Legacy(String),
}

impl From<ExpertiseCell> for ExpertiseEntry {
    fn from(cell: ExpertiseCell) -> Self {
        match cell {
            ExpertiseCell::Pair {
                category,
                description,
            } => ExpertiseEntry::new(category, description),
            ExpertiseCell::Legacy(raw) => ExpertiseEntry::from_legacy(&raw),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProfileRow {
    #[serde(default)]
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) bio: Option<String>,
    #[serde(default)]
    pub(crate) current_focus: Option<String>,
    #[serde(default)]
    pub(crate) expertise: Option<Vec<ExpertiseCell>>,
    #[serde(default)]
    pub(crate) email: Option<String>,
    #[serde(default)]
    pub(crate) linkedin: Option<String>,
    #[serde(default)]
    pub(crate) github: Option<String>,
    #[serde(default)]
    pub(crate) avatar_url: Option<String>,
}

impl From<ProfileRow> for ProfileRecord {
    fn from(row: ProfileRow) -> Self {
        Self {
            name: row.name.unwrap_or_default(),
            title: row.title.unwrap_or_default(),
            bio: row.bio.unwrap_or_default(),
            current_focus: row.current_focus.unwrap_or_default(),
            expertise: row
                .expertise
                .unwrap_or_default()
                .into_iter()
                .map(ExpertiseEntry::from)
                .filter(|entry| !entry.category.is_empty())
                .collect(),
            email: row.email.unwrap_or_default(),
            linkedin: row.linkedin.unwrap_or_default(),
            github: row.github.unwrap_or_default(),
            avatar_url: row.avatar_url.filter(|url| !url.trim().is_empty()),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ProfileUpsert<'a> {
    pub(crate) id: i64,
    pub(crate) name: &'a str,
    pub(crate) title: &'a str,
    pub(crate) bio: &'a str,
    pub(crate) current_focus: &'a str,
    pub(crate) expertise: &'a [ExpertiseEntry],
    pub(crate) email: &'a str,
    pub(crate) linkedin: &'a str,
    pub(crate) github: &'a str,
    pub(crate) avatar_url: Option<&'a str>,
}

impl<'a> ProfileUpsert<'a> {
    pub(crate) fn new(id: i64, profile: &'a ProfileRecord) -> Self {
        Self {
            id,
            name: &profile.name,
            title: &profile.title,
            bio: &profile.bio,
            current_focus: &profile.current_focus,
            expertise: &profile.expertise,
            email: &profile.email,
            linkedin: &profile.linkedin,
            github: &profile.github,
            avatar_url: profile.avatar_url.as_deref(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AvatarPatch<'a> {
    pub(crate) avatar_url: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FollowerRow {
    pub(crate) id: i64,
    pub(crate) follower_name: String,
    #[serde(default)]
    pub(crate) follower_email: Option<String>,
    pub(crate) followed_at: String,
}

impl TryFrom<FollowerRow> for FollowerRecord {
    type Error = RepoError;

    fn try_from(row: FollowerRow) -> Result<Self, Self::Error> {
        let followed_at = parse_timestamp(&row.followed_at).map_err(|err| {
            RepoError::from_persistence(format!(
                "follower {} has a bad timestamp: {err}",
                row.id
            ))
        })?;

        Ok(Self {
            id: row.id,
            follower_name: row.follower_name,
            follower_email: row.follower_email.filter(|email| !email.is_empty()),
            followed_at,
        })
    }
}

/// `timestamptz` columns carry an offset; plain `timestamp` columns do not and
/// are read as UTC.
fn parse_timestamp(value: &str) -> Result<OffsetDateTime, time::error::Parse> {
    OffsetDateTime::parse(value, &Rfc3339).or_else(|err| {
        PrimitiveDateTime::parse(value, &Iso8601::DEFAULT)
            .map(PrimitiveDateTime::assume_utc)
            .map_err(|_| err)
    })
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthUserRow {
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) email: Option<String>,
}

impl From<AuthUserRow> for SessionUser {
    fn from(row: AuthUserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CredentialsBody<'a> {
    pub(crate) email: &'a str,
    pub(crate) password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenRow {
    pub(crate) access_token: String,
}
