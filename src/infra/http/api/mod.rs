pub mod error;
pub mod handlers;
pub mod models;
pub mod state;

pub use state::ApiState;

use axum::{
    Router,
    routing::{get, put},
};

use crate::infra::http::RouterState;

pub fn build_api_router() -> Router<RouterState> {
    Router::new()
        .route(
            "/api/posts",
            get(handlers::list_posts)
                .post(handlers::create_post)
                .delete(handlers::delete_post_by_query),
        )
        .route(
            "/api/posts/{slug}",
            get(handlers::get_post)
                .patch(handlers::update_post)
                .delete(handlers::delete_post),
        )
        .route(
            "/api/profile",
            get(handlers::get_profile).put(handlers::put_profile),
        )
        .route("/api/profile/avatar", put(handlers::put_avatar))
        .route("/api/followers", get(handlers::list_followers))
        .route("/api/session", get(handlers::get_session))
}
