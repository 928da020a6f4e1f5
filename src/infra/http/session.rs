//! Session cookie handling for the HTML and JSON surfaces.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::application::repos::AccessToken;

pub const SESSION_COOKIE: &str = "minblog_session";

/// Access token carried by the request, if any.
pub fn session_token(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

pub fn with_session(jar: CookieJar, token: AccessToken) -> CookieJar {
    let cookie = Cookie::build((SESSION_COOKIE, token.0))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/");
    jar.add(cookie)
}

pub fn without_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}
