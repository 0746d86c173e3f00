use axum::{
    debug_handler,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{db, include_res, res, AppError, AppResult};

use super::password::hash_password;

#[derive(Debug, Deserialize)]
pub(crate) struct RegisterForm {
    username: String,
    password: String,
    university: String,
    department: String,
    city: String,
    country: String,
}

fn page(error: &str) -> Response {
    let banner = if error.is_empty() {
        String::new()
    } else {
        res::error_banner(error)
    };
    Html(include_res!(str, "/pages/register.html").replace("{error}", &banner)).into_response()
}

#[debug_handler]
pub(crate) async fn register_page() -> impl IntoResponse {
    page("")
}

#[debug_handler]
pub(crate) async fn register(
    State(db_pool): State<SqlitePool>,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    let RegisterForm {
        username,
        password,
        university,
        department,
        city,
        country,
    } = form;

    if [&username, &password, &university, &department, &city, &country]
        .iter()
        .any(|field| field.trim().is_empty())
    {
        return Ok(page("Please fill all fields"));
    }

    let taken: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE username=?")
        .bind(&username)
        .fetch_optional(&db_pool)
        .await
        .map_err(AppError::storage("Error during registration"))?;
    if taken.is_some() {
        return Ok(page("Username already taken"));
    }

    let password_hash = match hash_password(&password) {
        Ok(hash) => hash,
        Err(err) => {
            tracing::error!(error = %err, "password hash failed");
            return Ok(page("Error during registration"));
        }
    };

    let inserted = sqlx::query(
        "INSERT INTO users (username,password_hash,university,department,city,country) \
         VALUES (?,?,?,?,?,?)",
    )
    .bind(&username)
    .bind(&password_hash)
    .bind(&university)
    .bind(&department)
    .bind(&city)
    .bind(&country)
    .execute(&db_pool)
    .await;

    match inserted {
        Ok(_) => {
            tracing::info!(%username, "registered");
            Ok(Redirect::to("/login").into_response())
        }
        // The UNIQUE constraint catches a duplicate that raced past the
        // lookup above.
        Err(err) if db::is_unique_violation(&err) => Ok(page("Username already taken")),
        Err(err) => {
            tracing::error!(error = %err, "registration insert failed");
            Ok(page("Error during registration"))
        }
    }
}
