use sqlx::SqlitePool;
use time::OffsetDateTime;

// users.username and likes(user_id, comment_id) are unique at the storage
// level; the handlers treat those constraints as the backstop for their
// check-then-act windows.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    university TEXT NOT NULL,
    department TEXT NOT NULL,
    city TEXT NOT NULL,
    country TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS comments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    content TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    user_id INTEGER NOT NULL REFERENCES users(id)
);

CREATE TABLE IF NOT EXISTS replies (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    content TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    user_id INTEGER NOT NULL REFERENCES users(id),
    comment_id INTEGER NOT NULL REFERENCES comments(id)
);

CREATE TABLE IF NOT EXISTS likes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id),
    comment_id INTEGER NOT NULL REFERENCES comments(id),
    UNIQUE(user_id, comment_id)
);
";

pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    Ok(())
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub university: String,
    pub department: String,
    pub city: String,
    pub country: String,
}

/// A comment joined to its author, with like/reply counts, as the pages
/// display it.
#[derive(Debug, sqlx::FromRow)]
pub struct CommentRow {
    pub id: i64,
    pub content: String,
    pub created_at: i64,
    pub user_id: i64,
    pub username: String,
    pub likes: i64,
    pub replies: i64,
}

#[derive(Debug, sqlx::FromRow)]
pub struct ReplyRow {
    pub id: i64,
    pub content: String,
    pub created_at: i64,
    pub user_id: i64,
    pub comment_id: i64,
    pub username: String,
}

pub fn now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

pub async fn like_count(pool: &SqlitePool, comment_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE comment_id=?")
        .bind(comment_id)
        .fetch_one(pool)
        .await
}

pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}
