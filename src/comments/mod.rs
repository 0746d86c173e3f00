mod delete;
mod detail;
mod like;
mod new;
mod reply;

use axum::{
    routing::{get, post},
    Router,
};

use crate::{
    db::{CommentRow, ReplyRow, User},
    include_res, res, AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/add_comment", post(new::add_comment))
        .route("/comment/{id}", get(detail::comment_detail))
        .route("/reply/{id}", post(reply::add_reply))
        .route("/like/{id}", post(like::like))
        .route("/delete_comment/{id}", post(delete::delete_comment))
        .route("/delete_reply/{id}", post(delete::delete_reply))
}

/// One feed/detail/profile entry. Delete controls render only for the owner.
pub(crate) fn comment_item(row: &CommentRow, viewer: Option<&User>) -> String {
    let owner_controls = if viewer.is_some_and(|u| u.id == row.user_id) {
        format!(
            "<button class=\"delete-btn\" data-comment-id=\"{}\">Delete</button>",
            row.id
        )
    } else {
        String::new()
    };

    include_res!(str, "/pages/comment_item.html")
        .replace("{id}", &row.id.to_string())
        .replace("{user_id}", &row.user_id.to_string())
        .replace("{username}", &res::escape(&row.username))
        .replace("{timestamp}", &res::format_timestamp(row.created_at))
        .replace("{content}", &res::markdown(&row.content))
        .replace("{likes}", &row.likes.to_string())
        .replace("{replies}", &row.replies.to_string())
        .replace("{owner_controls}", &owner_controls)
}

pub(crate) fn reply_item(row: &ReplyRow, viewer: Option<&User>) -> String {
    let owner_controls = if viewer.is_some_and(|u| u.id == row.user_id) {
        format!(
            "<button class=\"delete-reply-btn\" data-reply-id=\"{}\">Delete</button>",
            row.id
        )
    } else {
        String::new()
    };

    include_res!(str, "/pages/reply_item.html")
        .replace("{id}", &row.id.to_string())
        .replace("{user_id}", &row.user_id.to_string())
        .replace("{username}", &res::escape(&row.username))
        .replace("{timestamp}", &res::format_timestamp(row.created_at))
        .replace("{content}", &res::markdown(&row.content))
        .replace("{owner_controls}", &owner_controls)
}
