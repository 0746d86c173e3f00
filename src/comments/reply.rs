use axum::{
    debug_handler,
    extract::{Path, State},
    Form, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{auth, db, AppError, AppResult};

#[derive(Debug, Deserialize)]
pub(crate) struct ReplyForm {
    #[serde(default)]
    content: String,
}

#[debug_handler]
pub(crate) async fn add_reply(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(comment_id): Path<i64>,
    Form(ReplyForm { content }): Form<ReplyForm>,
) -> AppResult<Json<Value>> {
    // A missing target is reported before the login gate; the write itself is
    // still gated on the session.
    let target: Option<i64> = sqlx::query_scalar("SELECT id FROM comments WHERE id=?")
        .bind(comment_id)
        .fetch_optional(&db_pool)
        .await
        .map_err(AppError::storage("Error occurred while adding reply"))?;
    if target.is_none() {
        return Err(AppError::NotFound("Comment"));
    }

    let Some(user) = auth::current_user(&db_pool, &session).await? else {
        return Err(AppError::AuthRequired);
    };

    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::Validation("Reply cannot be empty"));
    }

    let result =
        sqlx::query("INSERT INTO replies (content, created_at, user_id, comment_id) VALUES (?,?,?,?)")
            .bind(content)
            .bind(db::now())
            .bind(user.id)
            .bind(comment_id)
            .execute(&db_pool)
            .await
            .map_err(AppError::storage("Error occurred while adding reply"))?;

    let reply_id = result.last_insert_rowid();
    tracing::info!(user_id = user.id, comment_id, reply_id, "reply added");
    Ok(Json(json!({ "success": true, "reply_id": reply_id })))
}
