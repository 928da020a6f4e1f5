use std::sync::Arc;

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    application::{
        chrome::ChromeService,
        error::HttpError,
        followers::FollowerService,
        posts::{CreatePostCommand, PostService, UpdatePostCommand},
        profile::{ProfileService, ProfileSource},
        session::{CredentialsCommand, SessionService},
    },
    domain::{
        entities::{ExpertiseEntry, ProfileRecord},
        posts::format_post_date,
    },
    presentation::views::{
        CredentialsFormView, CredentialsTemplate, DeleteConfirmTemplate, DeleteConfirmView,
        FollowerView, FollowersTemplate, FollowersView, IndexTemplate, LayoutChrome,
        LayoutContext, PostDetailView, PostFormTemplate, PostFormView, PostListView, PostTemplate,
        ProfileFormTemplate, ProfileFormView, ProfileTemplate, ProfileView,
        render_error_response, render_not_found_response, render_template_response,
    },
};

use super::{
    RouterState,
    session::{session_token, with_session, without_session},
};

#[derive(Clone)]
pub struct HttpState {
    pub posts: Arc<PostService>,
    pub profile: Arc<ProfileService>,
    pub followers: Arc<FollowerService>,
    pub sessions: Arc<SessionService>,
    pub chrome: Arc<ChromeService>,
}

impl HttpState {
    async fn chrome(&self, jar: &CookieJar) -> LayoutChrome {
        let token = session_token(jar);
        self.chrome.load(token.as_deref()).await
    }
}

pub fn build_router() -> Router<RouterState> {
    Router::new()
        .route("/", get(index))
        .route("/posts/{slug}", get(post_detail))
        .route("/posts/{slug}/edit", get(edit_form).post(edit_submit))
        .route("/posts/{slug}/delete", get(delete_confirm).post(delete_submit))
        .route("/write", get(write_form).post(write_submit))
        .route("/profile", get(profile))
        .route("/profile/edit", get(profile_form).post(profile_submit))
        .route("/followers", get(followers))
        .route("/login", get(login_form).post(login_submit))
        .route("/register", get(register_form).post(register_submit))
        .route("/logout", post(logout))
        .fallback(not_found)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PostForm {
    title: String,
    content: String,
    date: String,
}

impl PostForm {
    /// Browsers submit textarea line breaks as CRLF.
    fn content(&self) -> String {
        self.content.replace("\r\n", "\n")
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProfileForm {
    name: String,
    title: String,
    bio: String,
    current_focus: String,
    expertise: String,
    email: String,
    linkedin: String,
    github: String,
    avatar_url: String,
}

impl ProfileForm {
    fn into_record(self) -> ProfileRecord {
        let avatar_url = self.avatar_url.trim();
        ProfileRecord {
            name: self.name.trim().to_string(),
            title: self.title.trim().to_string(),
            bio: self.bio.replace("\r\n", "\n"),
            current_focus: self.current_focus.trim().to_string(),
            expertise: self
                .expertise
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(ExpertiseEntry::from_legacy)
                .collect(),
            email: self.email.trim().to_string(),
            linkedin: self.linkedin.trim().to_string(),
            github: self.github.trim().to_string(),
            avatar_url: (!avatar_url.is_empty()).then(|| avatar_url.to_string()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CredentialsForm {
    email: String,
    password: String,
}

impl CredentialsForm {
    fn command(&self) -> CredentialsCommand {
        CredentialsCommand {
            email: Some(self.email.clone()),
            password: Some(self.password.clone()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LoginQuery {
    registered: Option<String>,
}

/// Re-render a form with the error's public message and status.
fn form_error<T: Template>(render: impl FnOnce(&'static str) -> T, error: HttpError) -> Response {
    let status = error.status();
    let mut response = render_template_response(render(error.public_message()), status);
    error.into_report().attach(&mut response);
    response
}

/// Validation failures go back to the form; everything else gets the error page.
fn is_form_error(error: &HttpError) -> bool {
    let status = error.status();
    status.is_client_error() && status != StatusCode::NOT_FOUND
}

async fn index(State(state): State<HttpState>, jar: CookieJar) -> Response {
    let chrome = state.chrome(&jar).await;

    match state.posts.list_posts().await {
        Ok(posts) => {
            let view = LayoutContext::new(chrome, PostListView::new(&posts));
            render_template_response(IndexTemplate { view }, StatusCode::OK)
        }
        Err(err) => render_error_response(chrome, err.into()),
    }
}

async fn post_detail(
    State(state): State<HttpState>,
    jar: CookieJar,
    Path(slug): Path<String>,
) -> Response {
    let chrome = state.chrome(&jar).await;

    match state.posts.find_post(&slug).await {
        Ok(post) => {
            let view = LayoutContext::new(chrome, PostDetailView::from(post));
            render_template_response(PostTemplate { view }, StatusCode::OK)
        }
        Err(err) => render_error_response(chrome, err.into()),
    }
}

async fn write_form(State(state): State<HttpState>, jar: CookieJar) -> Response {
    let chrome = state.chrome(&jar).await;
    let today = format_post_date(OffsetDateTime::now_utc().date());
    let view = LayoutContext::new(chrome, PostFormView::write().with_values("", "", &today));
    render_template_response(PostFormTemplate { view }, StatusCode::OK)
}

async fn write_submit(
    State(state): State<HttpState>,
    jar: CookieJar,
    Form(form): Form<PostForm>,
) -> Response {
    let command = CreatePostCommand {
        title: Some(form.title.trim().to_string()),
        content: Some(form.content()),
        date: Some(form.date.trim().to_string()),
    };

    match state.posts.create_post(command).await {
        Ok(post) => Redirect::to(&format!("/posts/{}", post.slug)).into_response(),
        Err(err) => {
            let chrome = state.chrome(&jar).await;
            let error = HttpError::from(err);
            if !is_form_error(&error) {
                return render_error_response(chrome, error);
            }
            form_error(
                |message| PostFormTemplate {
                    view: LayoutContext::new(
                        chrome,
                        PostFormView::write()
                            .with_values(&form.title, &form.content, &form.date)
                            .with_error(message),
                    ),
                },
                error,
            )
        }
    }
}

async fn edit_form(
    State(state): State<HttpState>,
    jar: CookieJar,
    Path(slug): Path<String>,
) -> Response {
    let chrome = state.chrome(&jar).await;

    match state.posts.find_post(&slug).await {
        Ok(post) => {
            let view = LayoutContext::new(chrome, PostFormView::edit(&post));
            render_template_response(PostFormTemplate { view }, StatusCode::OK)
        }
        Err(err) => render_error_response(chrome, err.into()),
    }
}

async fn edit_submit(
    State(state): State<HttpState>,
    jar: CookieJar,
    Path(slug): Path<String>,
    Form(form): Form<PostForm>,
) -> Response {
    let command = UpdatePostCommand {
        slug: slug.clone(),
        title: Some(form.title.trim().to_string()),
        content: Some(form.content()),
        date: Some(form.date.trim().to_string()),
    };

    match state.posts.update_post(command).await {
        Ok(post) => Redirect::to(&format!("/posts/{}", post.slug)).into_response(),
        Err(err) => {
            let chrome = state.chrome(&jar).await;
            let error = HttpError::from(err);
            if !is_form_error(&error) {
                return render_error_response(chrome, error);
            }
            let base = PostFormView {
                action: format!("/posts/{slug}/edit"),
                cancel_href: format!("/posts/{slug}"),
                heading: "Edit Post".to_string(),
                submit_label: "Save".to_string(),
                ..PostFormView::write()
            };
            form_error(
                |message| PostFormTemplate {
                    view: LayoutContext::new(
                        chrome,
                        base.with_values(&form.title, &form.content, &form.date)
                            .with_error(message),
                    ),
                },
                error,
            )
        }
    }
}

async fn delete_confirm(
    State(state): State<HttpState>,
    jar: CookieJar,
    Path(slug): Path<String>,
) -> Response {
    let chrome = state.chrome(&jar).await;

    match state.posts.find_post(&slug).await {
        Ok(post) => {
            let content = DeleteConfirmView {
                slug: post.slug,
                title: post.title,
            };
            let view = LayoutContext::new(chrome, content);
            render_template_response(DeleteConfirmTemplate { view }, StatusCode::OK)
        }
        Err(err) => render_error_response(chrome, err.into()),
    }
}

async fn delete_submit(
    State(state): State<HttpState>,
    jar: CookieJar,
    Path(slug): Path<String>,
) -> Response {
    match state.posts.delete_post(&slug).await {
        Ok(_) => Redirect::to("/").into_response(),
        Err(err) => render_error_response(state.chrome(&jar).await, err.into()),
    }
}

async fn profile(State(state): State<HttpState>, jar: CookieJar) -> Response {
    let chrome = state.chrome(&jar).await;
    let loaded = state.profile.load().await;
    let content = ProfileView::new(&loaded.profile, loaded.source == ProfileSource::Fallback);
    let view = LayoutContext::new(chrome, content);
    render_template_response(ProfileTemplate { view }, StatusCode::OK)
}

async fn profile_form(State(state): State<HttpState>, jar: CookieJar) -> Response {
    let chrome = state.chrome(&jar).await;
    let loaded = state.profile.load().await;
    let view = LayoutContext::new(chrome, ProfileFormView::new(&loaded.profile));
    render_template_response(ProfileFormTemplate { view }, StatusCode::OK)
}

async fn profile_submit(
    State(state): State<HttpState>,
    jar: CookieJar,
    Form(form): Form<ProfileForm>,
) -> Response {
    let record = form.into_record();

    match state.profile.save(record.clone()).await {
        Ok(_) => Redirect::to("/profile").into_response(),
        Err(err) => {
            let chrome = state.chrome(&jar).await;
            let error = HttpError::from(err);
            if !is_form_error(&error) {
                return render_error_response(chrome, error);
            }
            form_error(
                |message| ProfileFormTemplate {
                    view: LayoutContext::new(
                        chrome,
                        ProfileFormView::new(&record).with_error(message),
                    ),
                },
                error,
            )
        }
    }
}

async fn followers(State(state): State<HttpState>, jar: CookieJar) -> Response {
    let chrome = state.chrome(&jar).await;

    match state.followers.list().await {
        Ok(followers) => {
            let content = FollowersView {
                followers: followers.iter().map(FollowerView::from).collect(),
            };
            let view = LayoutContext::new(chrome, content);
            render_template_response(FollowersTemplate { view }, StatusCode::OK)
        }
        Err(err) => render_error_response(chrome, err.into()),
    }
}

async fn login_form(
    State(state): State<HttpState>,
    jar: CookieJar,
    Query(query): Query<LoginQuery>,
) -> Response {
    let chrome = state.chrome(&jar).await;
    let mut content = CredentialsFormView::login();
    if query.registered.is_some() {
        content = content.with_notice("Account created. Please sign in.");
    }
    let view = LayoutContext::new(chrome, content);
    render_template_response(CredentialsTemplate { view }, StatusCode::OK)
}

async fn login_submit(
    State(state): State<HttpState>,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> Response {
    match state.sessions.login(form.command()).await {
        Ok(token) => (with_session(jar, token), Redirect::to("/")).into_response(),
        Err(err) => {
            let chrome = state.chrome(&jar).await;
            form_error(
                |message| CredentialsTemplate {
                    view: LayoutContext::new(
                        chrome,
                        CredentialsFormView::login()
                            .with_email(form.email.trim())
                            .with_error(message),
                    ),
                },
                err.into(),
            )
        }
    }
}

async fn register_form(State(state): State<HttpState>, jar: CookieJar) -> Response {
    let chrome = state.chrome(&jar).await;
    let view = LayoutContext::new(chrome, CredentialsFormView::register());
    render_template_response(CredentialsTemplate { view }, StatusCode::OK)
}

async fn register_submit(
    State(state): State<HttpState>,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> Response {
    match state.sessions.register(form.command()).await {
        Ok(()) => Redirect::to("/login?registered=1").into_response(),
        Err(err) => {
            let chrome = state.chrome(&jar).await;
            form_error(
                |message| CredentialsTemplate {
                    view: LayoutContext::new(
                        chrome,
                        CredentialsFormView::register()
                            .with_email(form.email.trim())
                            .with_error(message),
                    ),
                },
                err.into(),
            )
        }
    }
}

async fn logout(State(state): State<HttpState>, jar: CookieJar) -> Response {
    let token = session_token(&jar);
    state.sessions.logout(token.as_deref()).await;
    (without_session(jar), Redirect::to("/login")).into_response()
}

async fn not_found(State(state): State<HttpState>, jar: CookieJar) -> Response {
    render_not_found_response(state.chrome(&jar).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_form_parses_expertise_lines() {
        let form = ProfileForm {
            name: " Ada ".into(),
            expertise: "Backend: Rust, SQL\r\n\r\nWriting\n".into(),
            avatar_url: "  ".into(),
            ..ProfileForm::default()
        };

        let record = form.into_record();
        assert_eq!(record.name, "Ada");
        assert_eq!(
            record.expertise,
            [
                ExpertiseEntry::new("Backend", "Rust, SQL"),
                ExpertiseEntry::new("Writing", ""),
            ]
        );
        assert_eq!(record.avatar_url, None);
    }

    #[test]
    fn post_form_content_uses_unix_line_breaks() {
        let form = PostForm {
            content: "One.\r\n\r\nTwo.".into(),
            ..PostForm::default()
        };
        assert_eq!(form.content(), "One.\n\nTwo.");
    }
}
