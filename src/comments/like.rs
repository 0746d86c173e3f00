use axum::{
    debug_handler,
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{auth, db, AppError, AppResult};

const LIKE_FAILED: &str = "Error occurred during like process";

/// Idempotent toggle: an existing (user, comment) like is removed, a missing
/// one is created. The UNIQUE(user_id, comment_id) constraint backstops two
/// toggles racing through the lookup.
#[debug_handler]
pub(crate) async fn like(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(comment_id): Path<i64>,
) -> AppResult<Json<Value>> {
    let Some(user) = auth::current_user(&db_pool, &session).await? else {
        return Err(AppError::AuthRequired);
    };

    let existing: Option<i64> =
        sqlx::query_scalar("SELECT id FROM likes WHERE user_id=? AND comment_id=?")
            .bind(user.id)
            .bind(comment_id)
            .fetch_optional(&db_pool)
            .await
            .map_err(AppError::storage(LIKE_FAILED))?;

    let liked = match existing {
        Some(like_id) => {
            sqlx::query("DELETE FROM likes WHERE id=?")
                .bind(like_id)
                .execute(&db_pool)
                .await
                .map_err(AppError::storage(LIKE_FAILED))?;
            false
        }
        None => {
            sqlx::query("INSERT INTO likes (user_id, comment_id) VALUES (?,?)")
                .bind(user.id)
                .bind(comment_id)
                .execute(&db_pool)
                .await
                .map_err(AppError::storage(LIKE_FAILED))?;
            true
        }
    };

    let likes = db::like_count(&db_pool, comment_id)
        .await
        .map_err(AppError::storage(LIKE_FAILED))?;

    Ok(Json(json!({ "success": true, "likes": likes, "liked": liked })))
}
