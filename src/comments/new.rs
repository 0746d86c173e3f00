use axum::{debug_handler, extract::State, Form, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{auth, db, AppError, AppResult};

#[derive(Debug, Deserialize)]
pub(crate) struct CommentForm {
    #[serde(default)]
    content: String,
}

#[debug_handler]
pub(crate) async fn add_comment(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Form(CommentForm { content }): Form<CommentForm>,
) -> AppResult<Json<Value>> {
    let Some(user) = auth::current_user(&db_pool, &session).await? else {
        return Err(AppError::AuthRequired);
    };

    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::Validation("Comment cannot be empty"));
    }

    let result = sqlx::query("INSERT INTO comments (content, created_at, user_id) VALUES (?,?,?)")
        .bind(content)
        .bind(db::now())
        .bind(user.id)
        .execute(&db_pool)
        .await
        .map_err(AppError::storage("Error occurred while adding comment"))?;

    let comment_id = result.last_insert_rowid();
    tracing::info!(user_id = user.id, comment_id, "comment added");
    Ok(Json(json!({ "success": true, "comment_id": comment_id })))
}
