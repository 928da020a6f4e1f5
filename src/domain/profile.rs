//! Author profile defaults and expertise handling.

use super::entities::{ExpertiseEntry, ProfileRecord};

/// Avatar shown when the profile has no uploaded image.
pub const DEFAULT_AVATAR_URL: &str = "/avatar.jpg";

impl ExpertiseEntry {
    pub fn new(category: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            description: description.into(),
        }
    }

    /// Convert a legacy `"Category: Description"` string. Only the first colon
    /// separates the two parts; a string without a colon is all category.
    pub fn from_legacy(raw: &str) -> Self {
        match raw.split_once(':') {
            Some((category, description)) => Self::new(category.trim(), description.trim()),
            None => Self::new(raw.trim(), ""),
        }
    }
}

impl ProfileRecord {
    pub fn avatar_or_default(&self) -> &str {
        self.avatar_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(DEFAULT_AVATAR_URL)
    }

    /// Bio paragraphs, split on blank lines.
    pub fn bio_paragraphs(&self) -> Vec<String> {
        self.bio
            .split("\n\n")
            .map(str::trim)
            .filter(|para| !para.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Profile served when the stored record cannot be loaded. Never persisted.
pub fn fallback_profile() -> ProfileRecord {
    ProfileRecord {
        name: "Fiqri Pramana".to_string(),
        title: "Software Developer & Blogger".to_string(),
        bio: "Hello! I'm Fiqri Pramana, a software developer who writes about building for the web."
            .to_string(),
        current_focus: "I'm currently focusing on backend services and developer tooling."
            .to_string(),
        expertise: vec![
            ExpertiseEntry::new("Frontend Development", "React, Next.js, TypeScript"),
            ExpertiseEntry::new("Backend Development", "Node.js, REST APIs"),
            ExpertiseEntry::new("Database", "PostgreSQL, Supabase"),
            ExpertiseEntry::new("DevOps", "Docker, CI/CD"),
            ExpertiseEntry::new("Programming Languages", "JavaScript, TypeScript, Python"),
        ],
        email: "fiqri@example.com".to_string(),
        linkedin: "https://linkedin.com/in/fiqripramana".to_string(),
        github: "https://github.com/fiqripram".to_string(),
        avatar_url: None,
    }
}

/// Strip the scheme from a profile link for display.
pub fn display_link(url: &str) -> &str {
    url.strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_expertise_splits_on_first_colon() {
        let entry = ExpertiseEntry::from_legacy("Backend: Rust: async services");
        assert_eq!(entry.category, "Backend");
        assert_eq!(entry.description, "Rust: async services");

        let bare = ExpertiseEntry::from_legacy("DevOps");
        assert_eq!(bare.category, "DevOps");
        assert_eq!(bare.description, "");
    }

    #[test]
    fn fallback_profile_uses_default_avatar() {
        let profile = fallback_profile();
        assert_eq!(profile.name, "Fiqri Pramana");
        assert_eq!(profile.avatar_or_default(), DEFAULT_AVATAR_URL);
        assert_eq!(profile.expertise.len(), 5);
    }

    #[test]
    fn bio_paragraphs_skip_blank_blocks() {
        let mut profile = fallback_profile();
        profile.bio = "First.\n\n\n\nSecond.\n\n".to_string();
        assert_eq!(profile.bio_paragraphs(), ["First.", "Second."]);
    }

    #[test]
    fn display_link_strips_scheme() {
        assert_eq!(display_link("https://github.com/x"), "github.com/x");
        assert_eq!(display_link("github.com/x"), "github.com/x");
    }
}
