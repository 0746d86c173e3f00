use axum::{
    debug_handler,
    extract::{Path, State},
    response::{Html, IntoResponse, Response},
};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    auth, comments,
    db::{CommentRow, ReplyRow, User},
    include_res, res, AppError, AppResult,
};

#[debug_handler]
pub(crate) async fn profile(
    Path(profile_id): Path<i64>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let viewer = auth::current_user(&db_pool, &session).await?;

    let profile_user: Option<User> = sqlx::query_as(
        "SELECT id,username,password_hash,university,department,city,country \
         FROM users WHERE id=?",
    )
    .bind(profile_id)
    .fetch_optional(&db_pool)
    .await
    .map_err(AppError::storage("Error loading profile"))?;

    let Some(profile_user) = profile_user else {
        return res::sorry("profile");
    };

    let comment_rows: Vec<CommentRow> = sqlx::query_as(
        "SELECT c.id, c.content, c.created_at, c.user_id, u.username, \
         (SELECT COUNT(*) FROM likes l WHERE l.comment_id = c.id) AS likes, \
         (SELECT COUNT(*) FROM replies r WHERE r.comment_id = c.id) AS replies \
         FROM comments c JOIN users u ON u.id = c.user_id \
         WHERE c.user_id=? ORDER BY c.created_at DESC, c.id DESC",
    )
    .bind(profile_id)
    .fetch_all(&db_pool)
    .await
    .map_err(AppError::storage("Error loading profile"))?;

    let reply_rows: Vec<ReplyRow> = sqlx::query_as(
        "SELECT r.id, r.content, r.created_at, r.user_id, r.comment_id, u.username \
         FROM replies r JOIN users u ON u.id = r.user_id \
         WHERE r.user_id=? ORDER BY r.created_at DESC, r.id DESC",
    )
    .bind(profile_id)
    .fetch_all(&db_pool)
    .await
    .map_err(AppError::storage("Error loading profile"))?;

    let mut comment_items = String::new();
    for row in &comment_rows {
        comment_items += &comments::comment_item(row, viewer.as_ref());
    }
    let mut reply_items = String::new();
    for row in &reply_rows {
        reply_items += &comments::reply_item(row, viewer.as_ref());
    }

    let body = include_res!(str, "/pages/profile.html")
        .replace("{nav}", &res::nav(viewer.as_ref()))
        .replace("{username}", &res::escape(&profile_user.username))
        .replace("{university}", &res::escape(&profile_user.university))
        .replace("{department}", &res::escape(&profile_user.department))
        .replace("{city}", &res::escape(&profile_user.city))
        .replace("{country}", &res::escape(&profile_user.country))
        .replace("{comments}", &comment_items)
        .replace("{replies}", &reply_items);

    Ok(Html(body).into_response())
}
