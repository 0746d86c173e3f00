mod login;
mod logout;
mod password;
mod register;

pub use password::{hash_password, verify_password};

use axum::{routing::get, Router};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{db::User, session::USER_ID, AppError, AppResult, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/register",
            get(register::register_page).post(register::register),
        )
        .route("/login", get(login::login_page).post(login::login))
        .route("/logout", get(logout::logout))
}

/// Resolves the session to a user, once per request. A missing key or a key
/// pointing at a row that no longer exists both come back as `None`.
pub async fn current_user(db_pool: &SqlitePool, session: &Session) -> AppResult<Option<User>> {
    let Some(user_id) = session.get::<i64>(USER_ID).await? else {
        return Ok(None);
    };

    sqlx::query_as::<_, User>(
        "SELECT id,username,password_hash,university,department,city,country \
         FROM users WHERE id=?",
    )
    .bind(user_id)
    .fetch_optional(db_pool)
    .await
    .map_err(AppError::storage("Error resolving session"))
}
