use std::sync::Arc;

use crate::application::session::SessionService;
use crate::domain::entities::SessionUser;
use crate::presentation::views::{BrandView, LayoutChrome, NavigationLinkView, NavigationView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuMethod {
    Get,
    Post,
}

impl MenuMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            MenuMethod::Get => "GET",
            MenuMethod::Post => "POST",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub label: &'static str,
    pub href: &'static str,
    pub method: MenuMethod,
}

const fn link(label: &'static str, href: &'static str) -> MenuEntry {
    MenuEntry {
        label,
        href,
        method: MenuMethod::Get,
    }
}

const SIGNED_IN_MENU: [MenuEntry; 4] = [
    link("Profile", "/profile"),
    link("Settings", "/profile/edit"),
    link("Followers", "/followers"),
    MenuEntry {
        label: "Logout",
        href: "/logout",
        method: MenuMethod::Post,
    },
];

const ANONYMOUS_MENU: [MenuEntry; 2] = [link("Login", "/login"), link("Register", "/register")];

/// Per-request navigation state: who is signed in and which menu entries
/// they get.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationContext {
    pub user: Option<SessionUser>,
    pub menu: Vec<MenuEntry>,
}

impl NavigationContext {
    pub fn for_user(user: Option<SessionUser>) -> Self {
        let menu = match user {
            Some(_) => SIGNED_IN_MENU.to_vec(),
            None => ANONYMOUS_MENU.to_vec(),
        };
        Self { user, menu }
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct SiteIdentity {
    pub title: String,
    pub tagline: String,
}

#[derive(Clone)]
pub struct ChromeService {
    sessions: Arc<SessionService>,
    site: SiteIdentity,
}

impl ChromeService {
    pub fn new(sessions: Arc<SessionService>, site: SiteIdentity) -> Self {
        Self { sessions, site }
    }

    pub async fn navigation(&self, token: Option<&str>) -> NavigationContext {
        NavigationContext::for_user(self.sessions.current_user(token).await)
    }

    pub async fn load(&self, token: Option<&str>) -> LayoutChrome {
        let navigation = self.navigation(token).await;
        self.chrome_for(&navigation)
    }

    pub fn chrome_for(&self, navigation: &NavigationContext) -> LayoutChrome {
        let entries = navigation
            .menu
            .iter()
            .map(|entry| NavigationLinkView {
                label: entry.label.to_string(),
                href: entry.href.to_string(),
                is_form: entry.method == MenuMethod::Post,
            })
            .collect();

        let signed_in_as = navigation
            .user
            .as_ref()
            .map(|user| user.email.clone().unwrap_or_else(|| user.id.clone()))
            .unwrap_or_default();

        LayoutChrome {
            brand: BrandView {
                title: self.site.title.clone(),
                tagline: self.site.tagline.clone(),
                href: "/".to_string(),
            },
            navigation: NavigationView {
                entries,
                signed_in: navigation.is_signed_in(),
                signed_in_as,
            },
        }
    }
}
