use axum::{
    debug_handler,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{db::User, include_res, res, session::USER_ID, AppError, AppResult};

use super::password::verify_password;

#[derive(Debug, Deserialize)]
pub(crate) struct LoginForm {
    username: String,
    password: String,
}

fn page(error: &str) -> Response {
    let banner = if error.is_empty() {
        String::new()
    } else {
        res::error_banner(error)
    };
    Html(include_res!(str, "/pages/login.html").replace("{error}", &banner)).into_response()
}

#[debug_handler]
pub(crate) async fn login_page() -> impl IntoResponse {
    page("")
}

#[debug_handler]
pub(crate) async fn login(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Form(LoginForm { username, password }): Form<LoginForm>,
) -> AppResult<Response> {
    let user: Option<User> = sqlx::query_as(
        "SELECT id,username,password_hash,university,department,city,country \
         FROM users WHERE username=?",
    )
    .bind(&username)
    .fetch_optional(&db_pool)
    .await
    .map_err(AppError::storage("Error during login"))?;

    // Unknown handle and wrong password take the same path out, so the
    // response never says which one it was.
    let Some(user) = user.filter(|u| verify_password(&password, &u.password_hash)) else {
        return Ok(page("Incorrect username or password"));
    };

    session.insert(USER_ID, user.id).await?;
    tracing::info!(user_id = user.id, "login");
    Ok(Redirect::to("/").into_response())
}
