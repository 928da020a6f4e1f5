//! Post-level rules: calendar dates, feed ordering and edit merging.

use time::{Date, macros::format_description};

use super::entities::PostRecord;
use super::error::DomainError;

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_post_date(raw: &str) -> Result<Date, DomainError> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|err| DomainError::invalid("date", format!("expected YYYY-MM-DD: {err}")))
}

pub fn format_post_date(date: Date) -> String {
    date.to_string()
}

/// Order posts newest first. The sort is stable, so posts sharing a date keep
/// the order the store returned them in.
pub fn sort_newest_first(posts: &mut [PostRecord]) {
    posts.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Field-level edit of a stored post. The slug is not part of the edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostEdit {
    pub title: Option<String>,
    pub content: Option<String>,
    pub date: Option<Date>,
}

impl PostEdit {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.date.is_none()
    }

    pub fn apply(self, mut post: PostRecord) -> PostRecord {
        if let Some(title) = self.title {
            post.title = title;
        }
        if let Some(content) = self.content {
            post.content = content;
        }
        if let Some(date) = self.date {
            post.date = date;
        }
        post
    }
}

/// Serde adapter for `YYYY-MM-DD` dates.
pub mod iso_date {
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};
    use time::Date;

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_post_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_post_date(&raw).map_err(D::Error::custom)
    }
}
