//! Conversions between domain records and the JSON payloads of
//! `minblog-api-types`.

use minblog_api_types::{
    ExpertisePayload, FollowerResponse, MenuEntryResponse, PostResponse, ProfilePayload,
    ProfileResponse, SessionResponse, SessionUserResponse,
};
use time::format_description::well_known::Rfc3339;

use crate::application::chrome::NavigationContext;
use crate::application::profile::{LoadedProfile, ProfileSource};
use crate::domain::entities::{ExpertiseEntry, FollowerRecord, PostRecord, ProfileRecord};
use crate::domain::posts::format_post_date;

pub fn post_response(post: PostRecord) -> PostResponse {
    PostResponse {
        date: format_post_date(post.date),
        slug: post.slug,
        title: post.title,
        content: post.content,
    }
}

pub fn profile_payload(profile: ProfileRecord) -> ProfilePayload {
    ProfilePayload {
        name: profile.name,
        title: profile.title,
        bio: profile.bio,
        current_focus: profile.current_focus,
        expertise: profile
            .expertise
            .into_iter()
            .map(|entry| ExpertisePayload {
                category: entry.category,
                description: entry.description,
            })
            .collect(),
        email: profile.email,
        linkedin: profile.linkedin,
        github: profile.github,
        avatar_url: profile.avatar_url,
    }
}

pub fn profile_response(loaded: LoadedProfile) -> ProfileResponse {
    ProfileResponse {
        fallback: loaded.source == ProfileSource::Fallback,
        profile: profile_payload(loaded.profile),
    }
}

pub fn stored_profile_response(profile: ProfileRecord) -> ProfileResponse {
    ProfileResponse {
        profile: profile_payload(profile),
        fallback: false,
    }
}

pub fn profile_record(payload: ProfilePayload) -> ProfileRecord {
    ProfileRecord {
        name: payload.name,
        title: payload.title,
        bio: payload.bio,
        current_focus: payload.current_focus,
        expertise: payload
            .expertise
            .into_iter()
            .map(|entry| ExpertiseEntry::new(entry.category, entry.description))
            .collect(),
        email: payload.email,
        linkedin: payload.linkedin,
        github: payload.github,
        avatar_url: payload.avatar_url.filter(|url| !url.trim().is_empty()),
    }
}

pub fn follower_response(follower: FollowerRecord) -> FollowerResponse {
    let followed_at = follower
        .followed_at
        .format(&Rfc3339)
        .unwrap_or_else(|_| follower.followed_at.to_string());

    FollowerResponse {
        id: follower.id,
        follower_name: follower.follower_name,
        follower_email: follower.follower_email,
        followed_at,
    }
}

pub fn session_response(navigation: NavigationContext) -> SessionResponse {
    SessionResponse {
        user: navigation.user.map(|user| SessionUserResponse {
            id: user.id,
            email: user.email,
        }),
        menu: navigation
            .menu
            .into_iter()
            .map(|entry| MenuEntryResponse {
                label: entry.label.to_string(),
                href: entry.href.to_string(),
                method: entry.method.as_str().to_string(),
            })
            .collect(),
    }
}
