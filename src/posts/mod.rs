use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

mod dto;
pub mod fixtures;
pub mod handlers;
pub mod repo;
pub mod services;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload", post(handlers::upload))
        .layer(DefaultBodyLimit::max(50 * 1024 * 1024)) // images and videos
        .route("/feed", get(handlers::feed))
        .route(
            "/posts",
            get(fixtures::list_text_posts).post(fixtures::create_text_post),
        )
        .route(
            "/posts/:id",
            get(fixtures::get_text_post).delete(handlers::delete_post),
        )
        .route("/hello-world", get(fixtures::hello_world))
}
