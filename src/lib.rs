pub mod auth;
pub mod comments;
pub mod db;
pub mod error;
pub mod feed;
pub mod profiles;
pub mod res;
pub mod session;

use axum::{extract::FromRef, routing::get, Router};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};

pub use error::{AppError, AppResult};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
}

pub fn app(state: AppState) -> Router {
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(30)));

    Router::new()
        .route("/", get(feed::index))
        .route("/scripts.js", get(res::scripts))

        .merge(auth::router())
        .merge(comments::router())
        .merge(profiles::router())

        .with_state(state)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
}
