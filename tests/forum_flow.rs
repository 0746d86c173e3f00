use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use campusboard::{app, db, AppState};

async fn test_app() -> Router {
    // One connection: every request in a test sees the same in-memory
    // database.
    let db_pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    db::migrate(&db_pool).await.expect("schema");
    app(AppState { db_pool })
}

async fn send(app: &Router, req: Request<Body>) -> Response<Body> {
    app.clone().oneshot(req).await.unwrap()
}

fn form_request(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie.to_owned());
    }
    builder.body(Body::from(body.to_owned())).unwrap()
}

fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie.to_owned());
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn register(
    app: &Router,
    username: &str,
    password: &str,
    university: &str,
    department: &str,
    city: &str,
    country: &str,
) -> Response<Body> {
    let body = format!(
        "username={username}&password={password}&university={university}\
         &department={department}&city={city}&country={country}"
    );
    send(app, form_request("/register", &body, None)).await
}

async fn login(app: &Router, username: &str, password: &str) -> String {
    let response = send(
        app,
        form_request(
            "/login",
            &format!("username={username}&password={password}"),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER, "login should redirect");
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_owned()
}

#[tokio::test]
async fn duplicate_handle_is_rejected_and_first_record_wins() {
    let app = test_app().await;

    let first = register(&app, "alice", "pw1", "MIT", "CS", "Boston", "US").await;
    assert_eq!(first.status(), StatusCode::SEE_OTHER);

    let second = register(&app, "alice", "pw2", "Oxford", "Math", "Oxford", "UK").await;
    assert_eq!(second.status(), StatusCode::OK);
    assert!(body_text(second).await.contains("Username already taken"));

    // The surviving row carries the first registrant's credential.
    login(&app, "alice", "pw1").await;
    let with_second_password = send(
        &app,
        form_request("/login", "username=alice&password=pw2", None),
    )
    .await;
    assert!(body_text(with_second_password)
        .await
        .contains("Incorrect username or password"));
}

#[tokio::test]
async fn registration_requires_every_field() {
    let app = test_app().await;
    let response = register(&app, "alice", "pw1", "", "CS", "Boston", "US").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Please fill all fields"));

    // Nothing was persisted, so the handle is still free.
    let retry = register(&app, "alice", "pw1", "MIT", "CS", "Boston", "US").await;
    assert_eq!(retry.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn login_failure_never_says_which_field_was_wrong() {
    let app = test_app().await;
    register(&app, "alice", "pw1", "MIT", "CS", "Boston", "US").await;

    let wrong_password = body_text(
        send(
            &app,
            form_request("/login", "username=alice&password=nope", None),
        )
        .await,
    )
    .await;
    let unknown_handle = body_text(
        send(
            &app,
            form_request("/login", "username=ghost&password=nope", None),
        )
        .await,
    )
    .await;

    assert!(wrong_password.contains("Incorrect username or password"));
    assert_eq!(wrong_password, unknown_handle);
}

#[tokio::test]
async fn comments_require_login_and_nonempty_content() {
    let app = test_app().await;
    register(&app, "alice", "pw1", "MIT", "CS", "Boston", "US").await;
    let cookie = login(&app, "alice", "pw1").await;

    let anonymous = send(&app, form_request("/add_comment", "content=hi", None)).await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(anonymous).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "You must be logged in");

    let blank = send(
        &app,
        form_request("/add_comment", "content=+++", Some(&cookie)),
    )
    .await;
    assert_eq!(blank.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(blank).await["error"], "Comment cannot be empty");

    let posted = send(
        &app,
        form_request("/add_comment", "content=hello", Some(&cookie)),
    )
    .await;
    assert_eq!(posted.status(), StatusCode::OK);
    let body = body_json(posted).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["comment_id"], 1);
}

#[tokio::test]
async fn feed_lists_newest_first() {
    let app = test_app().await;
    register(&app, "alice", "pw1", "MIT", "CS", "Boston", "US").await;
    let cookie = login(&app, "alice", "pw1").await;

    send(
        &app,
        form_request("/add_comment", "content=older", Some(&cookie)),
    )
    .await;
    send(
        &app,
        form_request("/add_comment", "content=newer", Some(&cookie)),
    )
    .await;

    let feed = body_text(send(&app, get_request("/", None)).await).await;
    let newer = feed.find("newer").expect("newer comment in feed");
    let older = feed.find("older").expect("older comment in feed");
    assert!(newer < older, "newest comment should render first");
}

#[tokio::test]
async fn feed_filters_and_across_fields_or_within_city_country() {
    let app = test_app().await;
    register(&app, "alice", "pw1", "MIT", "CS", "Boston", "US").await;
    register(&app, "carol", "pw2", "Oxford", "Math", "Oxfordtown", "UK").await;

    let alice = login(&app, "alice", "pw1").await;
    send(&app, form_request("/add_comment", "content=hello", Some(&alice))).await;
    let carol = login(&app, "carol", "pw2").await;
    send(&app, form_request("/add_comment", "content=cheers", Some(&carol))).await;

    let by_university = body_text(send(&app, get_request("/?university=MIT", None)).await).await;
    assert!(by_university.contains("hello"));
    assert!(!by_university.contains("cheers"));

    // Substring match is case-insensitive.
    let lowercase = body_text(send(&app, get_request("/?university=mit", None)).await).await;
    assert!(lowercase.contains("hello"));

    // Filters AND together: no user is both at MIT and in Math.
    let conjunction = body_text(
        send(&app, get_request("/?university=MIT&department=Math", None)).await,
    )
    .await;
    assert!(!conjunction.contains("hello"));
    assert!(!conjunction.contains("cheers"));

    // city_country hits the country column...
    let by_country = body_text(send(&app, get_request("/?city_country=UK", None)).await).await;
    assert!(by_country.contains("cheers"));
    assert!(!by_country.contains("hello"));

    // ...and the city column.
    let by_city = body_text(send(&app, get_request("/?city_country=Boston", None)).await).await;
    assert!(by_city.contains("hello"));
    assert!(!by_city.contains("cheers"));

    // An empty filter is a no-op, not match-nothing.
    let unfiltered = body_text(send(&app, get_request("/?university=", None)).await).await;
    assert!(unfiltered.contains("hello"));
    assert!(unfiltered.contains("cheers"));
}

#[tokio::test]
async fn like_toggles_on_and_off() {
    let app = test_app().await;
    register(&app, "alice", "pw1", "MIT", "CS", "Boston", "US").await;
    register(&app, "bob", "pw2", "MIT", "EE", "Boston", "US").await;

    let alice = login(&app, "alice", "pw1").await;
    send(&app, form_request("/add_comment", "content=hello", Some(&alice))).await;

    let anonymous = send(&app, form_request("/like/1", "", None)).await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let bob = login(&app, "bob", "pw2").await;
    let first = body_json(send(&app, form_request("/like/1", "", Some(&bob))).await).await;
    assert_eq!(first["success"], true);
    assert_eq!(first["likes"], 1);
    assert_eq!(first["liked"], true);

    let second = body_json(send(&app, form_request("/like/1", "", Some(&bob))).await).await;
    assert_eq!(second["success"], true);
    assert_eq!(second["likes"], 0);
    assert_eq!(second["liked"], false);
}

#[tokio::test]
async fn reply_reports_missing_comment_before_the_login_gate() {
    let app = test_app().await;
    register(&app, "alice", "pw1", "MIT", "CS", "Boston", "US").await;
    let cookie = login(&app, "alice", "pw1").await;
    send(&app, form_request("/add_comment", "content=hello", Some(&cookie))).await;

    // Missing target wins over missing session.
    let anonymous_missing = send(&app, form_request("/reply/99", "content=hi", None)).await;
    assert_eq!(anonymous_missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(anonymous_missing).await["error"], "Comment not found");

    let anonymous_existing = send(&app, form_request("/reply/1", "content=hi", None)).await;
    assert_eq!(anonymous_existing.status(), StatusCode::UNAUTHORIZED);

    let blank = send(&app, form_request("/reply/1", "content=", Some(&cookie))).await;
    assert_eq!(blank.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(blank).await["error"], "Reply cannot be empty");

    let posted = send(&app, form_request("/reply/1", "content=welcome", Some(&cookie))).await;
    assert_eq!(posted.status(), StatusCode::OK);
    let body = body_json(posted).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["reply_id"], 1);

    let detail = body_text(send(&app, get_request("/comment/1", None)).await).await;
    assert!(detail.contains("welcome"));
}

#[tokio::test]
async fn deletion_is_owner_only() {
    let app = test_app().await;
    register(&app, "alice", "pw1", "MIT", "CS", "Boston", "US").await;
    register(&app, "bob", "pw2", "MIT", "EE", "Boston", "US").await;

    let alice = login(&app, "alice", "pw1").await;
    send(&app, form_request("/add_comment", "content=hello", Some(&alice))).await;
    let bob = login(&app, "bob", "pw2").await;
    send(&app, form_request("/reply/1", "content=welcome", Some(&bob))).await;

    let forbidden = send(&app, form_request("/delete_comment/1", "", Some(&bob))).await;
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
    let body = body_json(forbidden).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "You are not authorized for this action");

    let reply_forbidden = send(&app, form_request("/delete_reply/1", "", Some(&alice))).await;
    assert_eq!(reply_forbidden.status(), StatusCode::FORBIDDEN);

    // Both records survived.
    let detail = body_text(send(&app, get_request("/comment/1", None)).await).await;
    assert!(detail.contains("hello"));
    assert!(detail.contains("welcome"));

    let missing = send(&app, form_request("/delete_comment/99", "", Some(&alice))).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    let missing_reply = send(&app, form_request("/delete_reply/99", "", Some(&alice))).await;
    assert_eq!(missing_reply.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_comment_takes_its_replies_and_likes_with_it() {
    let app = test_app().await;
    register(&app, "alice", "pw1", "MIT", "CS", "Boston", "US").await;
    register(&app, "bob", "pw2", "MIT", "EE", "Boston", "US").await;

    let alice = login(&app, "alice", "pw1").await;
    send(&app, form_request("/add_comment", "content=hello", Some(&alice))).await;
    let bob = login(&app, "bob", "pw2").await;
    send(&app, form_request("/reply/1", "content=welcome", Some(&bob))).await;
    send(&app, form_request("/like/1", "", Some(&bob))).await;

    let deleted = send(&app, form_request("/delete_comment/1", "", Some(&alice))).await;
    assert_eq!(deleted.status(), StatusCode::OK);
    assert_eq!(body_json(deleted).await["success"], true);

    let detail = send(&app, get_request("/comment/1", None)).await;
    assert_eq!(detail.status(), StatusCode::NOT_FOUND);

    let feed = body_text(send(&app, get_request("/", None)).await).await;
    assert!(!feed.contains("hello"));

    // Bob's profile no longer shows the orphaned reply.
    let profile = body_text(send(&app, get_request("/profile/2", None)).await).await;
    assert!(!profile.contains("welcome"));
}

#[tokio::test]
async fn reply_owner_can_delete_their_reply() {
    let app = test_app().await;
    register(&app, "alice", "pw1", "MIT", "CS", "Boston", "US").await;
    register(&app, "bob", "pw2", "MIT", "EE", "Boston", "US").await;

    let alice = login(&app, "alice", "pw1").await;
    send(&app, form_request("/add_comment", "content=hello", Some(&alice))).await;
    let bob = login(&app, "bob", "pw2").await;
    send(&app, form_request("/reply/1", "content=welcome", Some(&bob))).await;

    let deleted = send(&app, form_request("/delete_reply/1", "", Some(&bob))).await;
    assert_eq!(deleted.status(), StatusCode::OK);

    let detail = body_text(send(&app, get_request("/comment/1", None)).await).await;
    assert!(detail.contains("hello"));
    assert!(!detail.contains("welcome"));
}

#[tokio::test]
async fn profile_shows_activity_or_404s() {
    let app = test_app().await;
    register(&app, "alice", "pw1", "MIT", "CS", "Boston", "US").await;
    let alice = login(&app, "alice", "pw1").await;
    send(&app, form_request("/add_comment", "content=hello", Some(&alice))).await;
    send(&app, form_request("/reply/1", "content=selfreply", Some(&alice))).await;

    let profile = body_text(send(&app, get_request("/profile/1", None)).await).await;
    assert!(profile.contains("alice"));
    assert!(profile.contains("MIT"));
    assert!(profile.contains("hello"));
    assert!(profile.contains("selfreply"));

    let missing = send(&app, get_request("/profile/99", None)).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn logout_ends_the_session() {
    let app = test_app().await;
    register(&app, "alice", "pw1", "MIT", "CS", "Boston", "US").await;
    let cookie = login(&app, "alice", "pw1").await;

    let logout = send(&app, get_request("/logout", Some(&cookie))).await;
    assert_eq!(logout.status(), StatusCode::SEE_OTHER);

    let after = send(&app, form_request("/add_comment", "content=hi", Some(&cookie))).await;
    assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
}
