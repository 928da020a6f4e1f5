mod support;

use std::sync::Arc;

use axum::http::{StatusCode, header};

use support::*;

#[tokio::test]
async fn home_lists_posts_with_anonymous_menu() {
    let app = app(Arc::new(MemoryBackend::seeded()));

    let response = send(&app, get("/")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    let newest = html.find("Third Post").expect("newest post");
    let oldest = html.find("First Post").expect("oldest post");
    assert!(newest < oldest);
    assert!(html.contains("href=\"/posts/third-post\""));
    assert!(html.contains("href=\"/login\""));
    assert!(html.contains("href=\"/register\""));
    assert!(!html.contains("action=\"/logout\""));
}

#[tokio::test]
async fn signed_in_visitors_get_account_menu() {
    let app = app(Arc::new(MemoryBackend::seeded()));

    let html = body_text(send(&app, get_with_session("/")).await).await;
    assert!(html.contains("href=\"/profile\""));
    assert!(html.contains("href=\"/profile/edit\""));
    assert!(html.contains("href=\"/followers\""));
    assert!(html.contains("action=\"/logout\""));
    assert!(html.contains("Signed in as ada@example.com"));
    assert!(!html.contains("href=\"/register\""));
}

#[tokio::test]
async fn post_page_renders_paragraphs() {
    let app = app(Arc::new(MemoryBackend::seeded()));

    let response = send(&app, get("/posts/first-post")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("<p>Hello there.</p>"));
    assert!(html.contains("<p>Second paragraph.</p>"));
    assert!(html.contains("2023-10-01"));
}

#[tokio::test]
async fn unknown_pages_render_not_found() {
    let app = app(Arc::new(MemoryBackend::seeded()));

    let response = send(&app, get("/posts/missing")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("Post not found"));

    let response = send(&app, get("/no/such/page")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("Page Not Found"));
}

#[tokio::test]
async fn write_form_publishes_and_redirects() {
    let backend = Arc::new(MemoryBackend::default());
    let app = app(backend.clone());

    let response = send(&app, get("/write")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Publish Post"));

    let response = send(
        &app,
        form_request("/write", "title=Second+Post&content=x&date=2023-10-02"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).expect("location"),
        "/posts/second-post"
    );
    assert_eq!(backend.posts.lock().await.len(), 1);
}

#[tokio::test]
async fn posts_written_in_the_browser_keep_their_paragraphs() {
    let backend = Arc::new(MemoryBackend::default());
    let app = app(backend.clone());

    let response = send(
        &app,
        form_request(
            "/write",
            "title=Two+Paras&content=First+para.%0D%0A%0D%0ASecond+para.&date=2023-10-02",
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        backend.posts.lock().await[0].content,
        "First para.\n\nSecond para."
    );

    let html = body_text(send(&app, get("/posts/two-paras")).await).await;
    assert!(html.contains("<p>First para.</p>"), "{html}");
    assert!(html.contains("<p>Second para.</p>"), "{html}");
}

#[tokio::test]
async fn invalid_write_form_is_shown_again() {
    let backend = Arc::new(MemoryBackend::default());
    let app = app(backend.clone());

    let response = send(&app, form_request("/write", "title=Draft&content=&date=2023-10-02")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let html = body_text(response).await;
    assert!(html.contains("role=\"alert\""));
    assert!(html.contains("value=\"Draft\""));
    assert!(backend.posts.lock().await.is_empty());
}

#[tokio::test]
async fn edit_form_updates_the_post() {
    let backend = Arc::new(MemoryBackend::seeded());
    let app = app(backend.clone());

    let html = body_text(send(&app, get("/posts/first-post/edit")).await).await;
    assert!(html.contains("value=\"First Post\""));
    assert!(html.contains("action=\"/posts/first-post/edit\""));

    let response = send(
        &app,
        form_request(
            "/posts/first-post/edit",
            "title=Renamed&content=Updated+body&date=2023-10-05",
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).expect("location"),
        "/posts/first-post"
    );

    let posts = backend.posts.lock().await;
    let post = posts
        .iter()
        .find(|post| post.slug == "first-post")
        .expect("post kept its slug");
    assert_eq!(post.title, "Renamed");
    assert_eq!(post.content, "Updated body");
}

#[tokio::test]
async fn delete_asks_for_confirmation_first() {
    let backend = Arc::new(MemoryBackend::seeded());
    let app = app(backend.clone());

    let response = send(&app, get("/posts/first-post/delete")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Are you sure"));
    assert_eq!(backend.posts.lock().await.len(), 2);

    let response = send(&app, form_request("/posts/first-post/delete", "")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(backend.posts.lock().await.len(), 1);

    let response = send(&app, form_request("/posts/first-post/delete", "")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn profile_page_shows_fallback_and_default_avatar() {
    let app = app(Arc::new(MemoryBackend::default()));

    let response = send(&app, get("/profile")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Fiqri Pramana"));
    assert!(html.contains("src=\"/avatar.jpg\""));
    assert!(html.contains("Frontend Development"));
    assert!(html.contains("default profile"));
}

#[tokio::test]
async fn profile_form_saves_expertise_lines() {
    let backend = Arc::new(MemoryBackend::default());
    let app = app(backend.clone());

    let response = send(
        &app,
        form_request(
            "/profile/edit",
            "name=Ada&title=Analyst&bio=Hi&current_focus=Engines&expertise=Maths%3A+Analysis%0AWriting&email=ada%40example.com&linkedin=&github=&avatar_url=",
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let stored = backend.profile.lock().await.clone().expect("saved profile");
    assert_eq!(stored.name, "Ada");
    assert_eq!(stored.expertise.len(), 2);
    assert_eq!(stored.expertise[0].category, "Maths");
    assert_eq!(stored.expertise[0].description, "Analysis");
    assert_eq!(stored.avatar_url, None);

    let response = send(&app, form_request("/profile/edit", "name=&title=x")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn followers_page_lists_names() {
    let app = app(Arc::new(MemoryBackend::seeded()));

    let html = body_text(send(&app, get_with_session("/followers")).await).await;
    let grace = html.find("Grace").expect("grace");
    let alan = html.find("Alan").expect("alan");
    assert!(grace < alan);
    assert!(html.contains("Mar 1, 2024"));
}

#[tokio::test]
async fn login_sets_the_session_cookie() {
    let app = app(Arc::new(MemoryBackend::default()));

    let response = send(
        &app,
        form_request("/login", "email=ada%40example.com&password=secret"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .expect("session cookie");
    assert!(cookie.starts_with(&format!("minblog_session={VALID_TOKEN}")));
    assert!(cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn wrong_password_re_renders_the_login_form() {
    let app = app(Arc::new(MemoryBackend::default()));

    let response = send(
        &app,
        form_request("/login", "email=ada%40example.com&password=nope"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());

    let html = body_text(response).await;
    assert!(html.contains("Email or password is incorrect"));
    assert!(html.contains("value=\"ada@example.com\""));
}

#[tokio::test]
async fn register_redirects_to_login_with_notice() {
    let app = app(Arc::new(MemoryBackend::default()));

    let response = send(
        &app,
        form_request("/register", "email=grace%40example.com&password=secret"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .expect("location")
        .to_string();
    assert!(location.starts_with("/login"));

    let html = body_text(send(&app, get(&location)).await).await;
    assert!(html.contains("Account created"));

    let response = send(
        &app,
        form_request("/register", "email=ada%40example.com&password=secret"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn logout_clears_the_cookie() {
    let backend = Arc::new(MemoryBackend::default());
    let app = app(backend.clone());

    let request = axum::http::Request::post("/logout")
        .header("cookie", format!("minblog_session={VALID_TOKEN}"))
        .body(axum::body::Body::empty())
        .expect("request");
    let response = send(&app, request).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).expect("location"),
        "/login"
    );
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .expect("removal cookie");
    assert!(cookie.starts_with("minblog_session="));
    assert!(cookie.contains("Max-Age=0"));
    assert_eq!(*backend.signed_out.lock().await, [VALID_TOKEN]);
}

#[tokio::test]
async fn unconfigured_backend_renders_error_pages() {
    let app = unconfigured_app();

    let response = send(&app, get("/")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let html = body_text(response).await;
    assert!(html.contains("Backend is not configured"));
    assert!(html.contains("href=\"/login\""));

    let response = send(&app, get("/profile")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Fiqri Pramana"));
}
