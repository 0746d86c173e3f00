use axum::{
    debug_handler,
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{auth, AppError, AppResult};

const DELETE_FAILED: &str = "Error occurred during deletion";

#[debug_handler]
pub(crate) async fn delete_comment(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(comment_id): Path<i64>,
) -> AppResult<Json<Value>> {
    let Some(user) = auth::current_user(&db_pool, &session).await? else {
        return Err(AppError::AuthRequired);
    };

    let owner: Option<i64> = sqlx::query_scalar("SELECT user_id FROM comments WHERE id=?")
        .bind(comment_id)
        .fetch_optional(&db_pool)
        .await
        .map_err(AppError::storage(DELETE_FAILED))?;
    let Some(owner_id) = owner else {
        return Err(AppError::NotFound("Comment"));
    };
    if owner_id != user.id {
        return Err(AppError::NotOwner);
    }

    // Children go first, all inside one transaction: either the comment and
    // everything hanging off it disappear together or nothing does.
    let mut tx = db_pool.begin().await.map_err(AppError::storage(DELETE_FAILED))?;
    sqlx::query("DELETE FROM likes WHERE comment_id=?")
        .bind(comment_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::storage(DELETE_FAILED))?;
    sqlx::query("DELETE FROM replies WHERE comment_id=?")
        .bind(comment_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::storage(DELETE_FAILED))?;
    sqlx::query("DELETE FROM comments WHERE id=?")
        .bind(comment_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::storage(DELETE_FAILED))?;
    tx.commit().await.map_err(AppError::storage(DELETE_FAILED))?;

    tracing::info!(user_id = user.id, comment_id, "comment deleted");
    Ok(Json(json!({ "success": true })))
}

#[debug_handler]
pub(crate) async fn delete_reply(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(reply_id): Path<i64>,
) -> AppResult<Json<Value>> {
    let Some(user) = auth::current_user(&db_pool, &session).await? else {
        return Err(AppError::AuthRequired);
    };

    let owner: Option<i64> = sqlx::query_scalar("SELECT user_id FROM replies WHERE id=?")
        .bind(reply_id)
        .fetch_optional(&db_pool)
        .await
        .map_err(AppError::storage(DELETE_FAILED))?;
    let Some(owner_id) = owner else {
        return Err(AppError::NotFound("Reply"));
    };
    if owner_id != user.id {
        return Err(AppError::NotOwner);
    }

    sqlx::query("DELETE FROM replies WHERE id=?")
        .bind(reply_id)
        .execute(&db_pool)
        .await
        .map_err(AppError::storage(DELETE_FAILED))?;

    tracing::info!(user_id = user.id, reply_id, "reply deleted");
    Ok(Json(json!({ "success": true })))
}
