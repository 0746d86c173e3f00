use axum::{
    debug_handler,
    extract::{Query, State},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tower_sessions::Session;

use crate::{auth, comments, db::CommentRow, include_res, res, AppError, AppResult};

#[derive(Debug, Deserialize)]
pub(crate) struct FeedFilters {
    university: Option<String>,
    department: Option<String>,
    city_country: Option<String>,
}

fn present(filter: &Option<String>) -> Option<&str> {
    filter.as_deref().filter(|s| !s.is_empty())
}

/// Comments joined to their authors, newest first. Each non-empty filter ANDs
/// in a case-insensitive substring match; `city_country` matches either
/// column.
fn feed_query<'a>(filters: &'a FeedFilters) -> QueryBuilder<'a, Sqlite> {
    let mut qb = QueryBuilder::new(
        "SELECT c.id, c.content, c.created_at, c.user_id, u.username, \
         (SELECT COUNT(*) FROM likes l WHERE l.comment_id = c.id) AS likes, \
         (SELECT COUNT(*) FROM replies r WHERE r.comment_id = c.id) AS replies \
         FROM comments c JOIN users u ON u.id = c.user_id WHERE 1=1",
    );
    if let Some(university) = present(&filters.university) {
        qb.push(" AND lower(u.university) LIKE '%' || lower(");
        qb.push_bind(university);
        qb.push(") || '%'");
    }
    if let Some(department) = present(&filters.department) {
        qb.push(" AND lower(u.department) LIKE '%' || lower(");
        qb.push_bind(department);
        qb.push(") || '%'");
    }
    if let Some(city_country) = present(&filters.city_country) {
        qb.push(" AND (lower(u.city) LIKE '%' || lower(");
        qb.push_bind(city_country);
        qb.push(") || '%' OR lower(u.country) LIKE '%' || lower(");
        qb.push_bind(city_country);
        qb.push(") || '%')");
    }
    qb.push(" ORDER BY c.created_at DESC, c.id DESC");
    qb
}

#[debug_handler]
pub async fn index(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Query(filters): Query<FeedFilters>,
) -> AppResult<Response> {
    let user = auth::current_user(&db_pool, &session).await?;

    let mut qb = feed_query(&filters);
    let rows: Vec<CommentRow> = qb
        .build_query_as()
        .fetch_all(&db_pool)
        .await
        .map_err(AppError::storage("Error loading feed"))?;

    let mut items = String::new();
    for row in &rows {
        items += &comments::comment_item(row, user.as_ref());
    }

    let body = include_res!(str, "/pages/index.html")
        .replace("{nav}", &res::nav(user.as_ref()))
        .replace(
            "{university}",
            &res::escape(filters.university.as_deref().unwrap_or("")),
        )
        .replace(
            "{department}",
            &res::escape(filters.department.as_deref().unwrap_or("")),
        )
        .replace(
            "{city_country}",
            &res::escape(filters.city_country.as_deref().unwrap_or("")),
        )
        .replace("{comments}", &items);

    Ok(Html(body).into_response())
}
