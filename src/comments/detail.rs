use axum::{
    debug_handler,
    extract::{Path, State},
    response::{Html, IntoResponse, Response},
};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    auth,
    db::{CommentRow, ReplyRow},
    include_res, res, AppError, AppResult,
};

use super::{comment_item, reply_item};

#[debug_handler]
pub(crate) async fn comment_detail(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(comment_id): Path<i64>,
) -> AppResult<Response> {
    let user = auth::current_user(&db_pool, &session).await?;

    let comment: Option<CommentRow> = sqlx::query_as(
        "SELECT c.id, c.content, c.created_at, c.user_id, u.username, \
         (SELECT COUNT(*) FROM likes l WHERE l.comment_id = c.id) AS likes, \
         (SELECT COUNT(*) FROM replies r WHERE r.comment_id = c.id) AS replies \
         FROM comments c JOIN users u ON u.id = c.user_id WHERE c.id=?",
    )
    .bind(comment_id)
    .fetch_optional(&db_pool)
    .await
    .map_err(AppError::storage("Error loading comment"))?;

    let Some(comment) = comment else {
        return res::sorry("comment");
    };

    // Replies read top to bottom, oldest first.
    let replies: Vec<ReplyRow> = sqlx::query_as(
        "SELECT r.id, r.content, r.created_at, r.user_id, r.comment_id, u.username \
         FROM replies r JOIN users u ON u.id = r.user_id \
         WHERE r.comment_id=? ORDER BY r.created_at ASC, r.id ASC",
    )
    .bind(comment_id)
    .fetch_all(&db_pool)
    .await
    .map_err(AppError::storage("Error loading comment"))?;

    let mut reply_items = String::new();
    for row in &replies {
        reply_items += &reply_item(row, user.as_ref());
    }

    let body = include_res!(str, "/pages/comment.html")
        .replace("{nav}", &res::nav(user.as_ref()))
        .replace("{comment}", &comment_item(&comment, user.as_ref()))
        .replace("{replies}", &reply_items)
        .replace("{id}", &comment_id.to_string());

    Ok(Html(body).into_response())
}
