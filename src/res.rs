use axum::{
    debug_handler,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};

use crate::AppResult;

#[macro_export]
macro_rules! include_res {
    (bytes, $p:expr) => {
        include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
    (str, $p:expr) => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
}

#[debug_handler]
pub async fn scripts() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        include_res!(str, "/scripts.js"),
    )
}

/// 404 page for the HTML routes. The JSON routes go through `AppError`
/// instead.
pub(crate) fn sorry(what: &str) -> AppResult<Response> {
    Ok((
        StatusCode::NOT_FOUND,
        Html(include_res!(str, "/pages/sorry.html").replace("{what}", &escape(what))),
    )
        .into_response())
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub(crate) fn markdown(content: &str) -> String {
    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, pulldown_cmark::Parser::new(content));
    html
}

pub(crate) fn format_timestamp(ts: i64) -> String {
    use time::{format_description::BorrowedFormatItem, macros::format_description, OffsetDateTime};

    const FORMAT: &[BorrowedFormatItem<'_>] =
        format_description!("[year]-[month]-[day] [hour]:[minute]");
    OffsetDateTime::from_unix_timestamp(ts)
        .ok()
        .and_then(|t| t.format(FORMAT).ok())
        .unwrap_or_default()
}

pub(crate) fn error_banner(msg: &str) -> String {
    format!("<p class=\"error\">{}</p>", escape(msg))
}

pub(crate) fn nav(user: Option<&crate::db::User>) -> String {
    match user {
        Some(user) => format!(
            "<a href=\"/profile/{}\">{}</a> | <a href=\"/logout\">Log out</a>",
            user.id,
            escape(&user.username)
        ),
        None => "<a href=\"/login\">Log in</a> | <a href=\"/register\">Register</a>".to_owned(),
    }
}
