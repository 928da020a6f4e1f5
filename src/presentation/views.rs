use crate::application::error::{ErrorReport, HttpError};
use crate::domain::entities::{FollowerRecord, PostRecord, ProfileRecord};
use crate::domain::posts::format_post_date;
use crate::domain::profile::display_link;
use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;
use time::macros::format_description;

const EXCERPT_CHARS: usize = 160;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn render_not_found_response(chrome: LayoutChrome) -> Response {
    let view = LayoutContext::new(chrome, ErrorPageView::not_found());
    let mut response = render_template_response(ErrorTemplate { view }, StatusCode::NOT_FOUND);
    ErrorReport::from_message(
        "presentation::views::render_not_found_response",
        StatusCode::NOT_FOUND,
        "Resource not found",
    )
    .attach(&mut response);
    response
}

/// Render a failed page request inside the site layout, keeping the error
/// report for the response logger.
pub fn render_error_response(chrome: LayoutChrome, error: HttpError) -> Response {
    let status = error.status();
    let content = ErrorPageView {
        title: status
            .canonical_reason()
            .unwrap_or("Something went wrong")
            .to_string(),
        message: error.public_message().to_string(),
    };
    let view = LayoutContext::new(chrome, content);
    let mut response = render_template_response(ErrorTemplate { view }, status);
    error.into_report().attach(&mut response);
    response
}

#[derive(Clone)]
pub struct BrandView {
    pub title: String,
    pub tagline: String,
    pub href: String,
}

#[derive(Clone)]
pub struct NavigationLinkView {
    pub label: String,
    pub href: String,
    /// Entries that change state are rendered as POST forms.
    pub is_form: bool,
}

#[derive(Clone)]
pub struct NavigationView {
    pub entries: Vec<NavigationLinkView>,
    pub signed_in: bool,
    pub signed_in_as: String,
}

#[derive(Clone)]
pub struct LayoutChrome {
    pub brand: BrandView,
    pub navigation: NavigationView,
}

#[derive(Clone)]
pub struct LayoutContext<T> {
    pub brand: BrandView,
    pub navigation: NavigationView,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(chrome: LayoutChrome, content: T) -> Self {
        Self {
            brand: chrome.brand,
            navigation: chrome.navigation,
            content,
        }
    }
}

#[derive(Clone)]
pub struct PostCard {
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub date: String,
}

impl From<&PostRecord> for PostCard {
    fn from(post: &PostRecord) -> Self {
        Self {
            slug: post.slug.clone(),
            title: post.title.clone(),
            excerpt: excerpt(&post.content),
            date: format_post_date(post.date),
        }
    }
}

pub struct PostListView {
    pub posts: Vec<PostCard>,
}

impl PostListView {
    pub fn new(posts: &[PostRecord]) -> Self {
        Self {
            posts: posts.iter().map(PostCard::from).collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub view: LayoutContext<PostListView>,
}

pub struct PostDetailView {
    pub slug: String,
    pub title: String,
    pub date: String,
    pub paragraphs: Vec<String>,
}

impl From<PostRecord> for PostDetailView {
    fn from(post: PostRecord) -> Self {
        Self {
            paragraphs: paragraphs(&post.content),
            date: format_post_date(post.date),
            slug: post.slug,
            title: post.title,
        }
    }
}

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostTemplate {
    pub view: LayoutContext<PostDetailView>,
}

/// Shared by the write page and the post editor.
pub struct PostFormView {
    pub heading: String,
    pub action: String,
    pub submit_label: String,
    pub cancel_href: String,
    pub title: String,
    pub content: String,
    pub date: String,
    pub error: String,
}

impl PostFormView {
    pub fn write() -> Self {
        Self {
            heading: "Write a Post".to_string(),
            action: "/write".to_string(),
            submit_label: "Publish Post".to_string(),
            cancel_href: "/".to_string(),
            title: String::new(),
            content: String::new(),
            date: String::new(),
            error: String::new(),
        }
    }

    pub fn edit(post: &PostRecord) -> Self {
        Self {
            heading: "Edit Post".to_string(),
            action: format!("/posts/{}/edit", post.slug),
            submit_label: "Save".to_string(),
            cancel_href: format!("/posts/{}", post.slug),
            title: post.title.clone(),
            content: post.content.clone(),
            date: format_post_date(post.date),
            error: String::new(),
        }
    }

    pub fn with_values(self, title: &str, content: &str, date: &str) -> Self {
        Self {
            title: title.to_string(),
            content: content.to_string(),
            date: date.to_string(),
            ..self
        }
    }

    pub fn with_error(self, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            ..self
        }
    }

    pub fn has_error(&self) -> bool {
        !self.error.is_empty()
    }
}

#[derive(Template)]
#[template(path = "post_form.html")]
pub struct PostFormTemplate {
    pub view: LayoutContext<PostFormView>,
}

pub struct DeleteConfirmView {
    pub slug: String,
    pub title: String,
}

#[derive(Template)]
#[template(path = "post_delete.html")]
pub struct DeleteConfirmTemplate {
    pub view: LayoutContext<DeleteConfirmView>,
}

#[derive(Clone)]
pub struct ExpertiseView {
    pub category: String,
    pub description: String,
}

pub struct ProfileView {
    pub name: String,
    pub title: String,
    pub bio: Vec<String>,
    pub current_focus: String,
    pub expertise: Vec<ExpertiseView>,
    pub email: String,
    pub linkedin: String,
    pub linkedin_label: String,
    pub github: String,
    pub github_label: String,
    pub avatar_url: String,
    pub is_fallback: bool,
}

impl ProfileView {
    pub fn new(profile: &ProfileRecord, is_fallback: bool) -> Self {
        Self {
            name: profile.name.clone(),
            title: profile.title.clone(),
            bio: profile.bio_paragraphs(),
            current_focus: profile.current_focus.clone(),
            expertise: profile
                .expertise
                .iter()
                .map(|entry| ExpertiseView {
                    category: entry.category.clone(),
                    description: entry.description.clone(),
                })
                .collect(),
            email: profile.email.clone(),
            linkedin: profile.linkedin.clone(),
            linkedin_label: display_link(&profile.linkedin).to_string(),
            github: profile.github.clone(),
            github_label: display_link(&profile.github).to_string(),
            avatar_url: profile.avatar_or_default().to_string(),
            is_fallback,
        }
    }
}

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub view: LayoutContext<ProfileView>,
}

/// Profile editor. Expertise is edited as one `Category: Description` line
/// per entry.
pub struct ProfileFormView {
    pub name: String,
    pub title: String,
    pub bio: String,
    pub current_focus: String,
    pub expertise: String,
    pub email: String,
    pub linkedin: String,
    pub github: String,
    pub avatar_url: String,
    pub error: String,
}

impl ProfileFormView {
    pub fn new(profile: &ProfileRecord) -> Self {
        Self {
            name: profile.name.clone(),
            title: profile.title.clone(),
            bio: profile.bio.clone(),
            current_focus: profile.current_focus.clone(),
            expertise: profile
                .expertise
                .iter()
                .map(|entry| format!("{}: {}", entry.category, entry.description))
                .collect::<Vec<_>>()
                .join("\n"),
            email: profile.email.clone(),
            linkedin: profile.linkedin.clone(),
            github: profile.github.clone(),
            avatar_url: profile.avatar_url.clone().unwrap_or_default(),
            error: String::new(),
        }
    }

    pub fn with_error(self, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            ..self
        }
    }

    pub fn has_error(&self) -> bool {
        !self.error.is_empty()
    }
}

#[derive(Template)]
#[template(path = "profile_edit.html")]
pub struct ProfileFormTemplate {
    pub view: LayoutContext<ProfileFormView>,
}

pub struct FollowerView {
    pub name: String,
    pub email: String,
    pub followed_on: String,
}

impl From<&FollowerRecord> for FollowerView {
    fn from(follower: &FollowerRecord) -> Self {
        let followed_on = follower
            .followed_at
            .format(format_description!("[month repr:short] [day padding:none], [year]"))
            .unwrap_or_else(|_| follower.followed_at.date().to_string());

        Self {
            name: follower.follower_name.clone(),
            email: follower.follower_email.clone().unwrap_or_default(),
            followed_on,
        }
    }
}

pub struct FollowersView {
    pub followers: Vec<FollowerView>,
}

#[derive(Template)]
#[template(path = "followers.html")]
pub struct FollowersTemplate {
    pub view: LayoutContext<FollowersView>,
}

/// Login and registration forms.
pub struct CredentialsFormView {
    pub heading: String,
    pub action: String,
    pub submit_label: String,
    pub email: String,
    pub error: String,
    pub notice: String,
    pub alternate_href: String,
    pub alternate_label: String,
}

impl CredentialsFormView {
    pub fn login() -> Self {
        Self {
            heading: "Login".to_string(),
            action: "/login".to_string(),
            submit_label: "Sign in".to_string(),
            email: String::new(),
            error: String::new(),
            notice: String::new(),
            alternate_href: "/register".to_string(),
            alternate_label: "Create an account".to_string(),
        }
    }

    pub fn register() -> Self {
        Self {
            heading: "Register".to_string(),
            action: "/register".to_string(),
            submit_label: "Create account".to_string(),
            email: String::new(),
            error: String::new(),
            notice: String::new(),
            alternate_href: "/login".to_string(),
            alternate_label: "Already registered? Sign in".to_string(),
        }
    }

    pub fn with_email(self, email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..self
        }
    }

    pub fn with_error(self, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            ..self
        }
    }

    pub fn with_notice(self, notice: impl Into<String>) -> Self {
        Self {
            notice: notice.into(),
            ..self
        }
    }

    pub fn has_error(&self) -> bool {
        !self.error.is_empty()
    }

    pub fn has_notice(&self) -> bool {
        !self.notice.is_empty()
    }
}

#[derive(Template)]
#[template(path = "credentials.html")]
pub struct CredentialsTemplate {
    pub view: LayoutContext<CredentialsFormView>,
}

pub struct ErrorPageView {
    pub title: String,
    pub message: String,
}

impl ErrorPageView {
    pub fn not_found() -> Self {
        Self {
            title: "Page Not Found".to_string(),
            message: "The page you requested does not exist.".to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<ErrorPageView>,
}

/// Non-empty paragraphs of a post body, split on blank lines.
pub fn paragraphs(content: &str) -> Vec<String> {
    content
        .replace("\r\n", "\n")
        .split("\n\n")
        .map(str::trim)
        .filter(|para| !para.is_empty())
        .map(str::to_string)
        .collect()
}

/// First paragraph of a post body, cut at a character boundary.
pub fn excerpt(content: &str) -> String {
    let paragraphs = paragraphs(content);
    let first = paragraphs.first().map(String::as_str).unwrap_or("");

    if first.chars().count() <= EXCERPT_CHARS {
        return first.to_string();
    }

    let mut cut: String = first.chars().take(EXCERPT_CHARS).collect();
    if let Some(space) = cut.rfind(char::is_whitespace) {
        cut.truncate(space);
    }
    cut.push('…');
    cut
}
