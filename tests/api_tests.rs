use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use reviewmdb::api::{AppState, create_app_state, router};
use reviewmdb::config::Config;
use reviewmdb::db::UserChanges;
use reviewmdb::services::{MailError, Mailer, SystemClock};
use reviewmdb::state::SharedState;

async fn spawn_app() -> (Router, Arc<AppState>) {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    // In-memory sqlite must stay on a single connection.
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;

    let shared = SharedState::new(config)
        .await
        .expect("Failed to create app state");
    let state = create_app_state(Arc::new(shared));
    (router(state.clone()), state)
}

/// Creates an account directly in the store and issues a bearer token for it.
async fn create_user(state: &AppState, username: &str, role: &str) -> (i32, String) {
    let now = chrono::Utc::now().to_rfc3339();
    let user = state
        .store()
        .users()
        .create(
            username,
            &format!("{username}@example.com"),
            UserChanges {
                role: Some(role.to_string()),
                ..Default::default()
            },
            &now,
        )
        .await
        .expect("Failed to create user");
    let token = state
        .tokens()
        .issue_access_token(user.id)
        .expect("Failed to issue token");
    (user.id, token)
}

/// Bearer token for the admin account seeded by the initial migration.
async fn admin_token(state: &AppState) -> String {
    let admin = state
        .store()
        .users()
        .get_by_username("admin")
        .await
        .unwrap()
        .expect("Seeded admin missing");
    state.tokens().issue_access_token(admin.id).unwrap()
}

async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create_title(app: &Router, admin: &str, name: &str, year: i32) -> i64 {
    let (status, body) = request(
        app,
        "POST",
        "/v1/titles",
        Some(admin),
        Some(json!({"name": name, "year": year})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_signup_validation_and_idempotency() {
    let (app, _state) = spawn_app().await;

    let (status, body) = request(
        &app,
        "POST",
        "/v1/auth/signup",
        None,
        Some(json!({"username": "marmot", "email": "marmot@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "marmot");

    // Same pair again is fine: the code is simply re-issued.
    let (status, _) = request(
        &app,
        "POST",
        "/v1/auth/signup",
        None,
        Some(json!({"username": "marmot", "email": "marmot@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Same username with a different email is a collision.
    let (status, _) = request(
        &app,
        "POST",
        "/v1/auth/signup",
        None,
        Some(json!({"username": "marmot", "email": "other@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Same email under a different username too.
    let (status, _) = request(
        &app,
        "POST",
        "/v1/auth/signup",
        None,
        Some(json!({"username": "weasel", "email": "marmot@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // "me" is reserved.
    let (status, _) = request(
        &app,
        "POST",
        "/v1/auth/signup",
        None,
        Some(json!({"username": "me", "email": "me@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// Mailer standing in for an unreachable SMTP relay.
struct DownMailer;

#[async_trait::async_trait]
impl Mailer for DownMailer {
    async fn send_confirmation_code(&self, _to: &str, _code: &str) -> Result<(), MailError> {
        Err(MailError::Transport("connection refused".to_string()))
    }
}

#[tokio::test]
async fn test_signup_answers_502_when_mail_delivery_fails() {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;

    let shared = SharedState::with_services(config, Arc::new(DownMailer), Arc::new(SystemClock))
        .await
        .expect("Failed to create app state");
    let app = router(create_app_state(Arc::new(shared)));

    let (status, body) = request(
        &app,
        "POST",
        "/v1/auth/signup",
        None,
        Some(json!({"username": "ferret", "email": "ferret@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Could not deliver the confirmation code");
}

#[tokio::test]
async fn test_token_exchange_is_single_use() {
    let (app, state) = spawn_app().await;

    let (status, _) = request(
        &app,
        "POST",
        "/v1/auth/signup",
        None,
        Some(json!({"username": "marmot", "email": "marmot@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let user = state
        .store()
        .users()
        .get_by_username("marmot")
        .await
        .unwrap()
        .unwrap();
    let code = state.tokens().confirmation_code(&user);

    // Unknown account answers 404, not 400.
    let (status, _) = request(
        &app,
        "POST",
        "/v1/auth/token",
        None,
        Some(json!({"username": "nobody", "confirmation_code": &code})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = request(
        &app,
        "POST",
        "/v1/auth/token",
        None,
        Some(json!({"username": "marmot", "confirmation_code": "garbage"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = request(
        &app,
        "POST",
        "/v1/auth/token",
        None,
        Some(json!({"username": "marmot", "confirmation_code": &code})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["data"]["token"].as_str().unwrap().to_string();

    // The issued token works.
    let (status, body) = request(&app, "GET", "/v1/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "marmot");

    // The exchange bumped the code epoch, so the code is spent.
    let (status, _) = request(
        &app,
        "POST",
        "/v1/auth/token",
        None,
        Some(json!({"username": "marmot", "confirmation_code": &code})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rating_is_mean_of_review_scores() {
    let (app, state) = spawn_app().await;
    let admin = admin_token(&state).await;

    let title_id = create_title(&app, &admin, "Dune", 2021).await;

    // No reviews yet: rating is null, not zero.
    let (status, body) = request(&app, "GET", &format!("/v1/titles/{title_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["rating"].is_null());

    let (_, alice) = create_user(&state, "alice", "user").await;
    let (_, bob) = create_user(&state, "bob", "user").await;

    let (status, _) = request(
        &app,
        "POST",
        &format!("/v1/titles/{title_id}/reviews"),
        Some(&alice),
        Some(json!({"text": "Loved it", "score": 8})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = request(&app, "GET", &format!("/v1/titles/{title_id}"), None, None).await;
    assert!((body["data"]["rating"].as_f64().unwrap() - 8.0).abs() < f64::EPSILON);

    let (status, _) = request(
        &app,
        "POST",
        &format!("/v1/titles/{title_id}/reviews"),
        Some(&bob),
        Some(json!({"text": "Decent", "score": 6})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = request(&app, "GET", &format!("/v1/titles/{title_id}"), None, None).await;
    assert!((body["data"]["rating"].as_f64().unwrap() - 7.0).abs() < f64::EPSILON);

    // Second review from the same author is rejected.
    let (status, _) = request(
        &app,
        "POST",
        &format!("/v1/titles/{title_id}/reviews"),
        Some(&alice),
        Some(json!({"text": "Changed my mind", "score": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Score bounds are enforced.
    let (status, _) = request(
        &app,
        "POST",
        &format!("/v1/titles/{title_id}/reviews"),
        Some(&admin),
        Some(json!({"text": "Off the scale", "score": 11})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reads_are_public_and_writes_are_gated() {
    let (app, state) = spawn_app().await;
    let (_, user) = create_user(&state, "plain", "user").await;

    let (status, _) = request(&app, "GET", "/v1/titles", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = request(&app, "GET", "/v1/categories", None, None).await;
    assert_eq!(status, StatusCode::OK);

    // Anonymous writes answer 401.
    let (status, _) = request(
        &app,
        "POST",
        "/v1/titles",
        None,
        Some(json!({"name": "Dune", "year": 2021})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Authenticated non-admin writes answer 403.
    let (status, _) = request(
        &app,
        "POST",
        "/v1/titles",
        Some(&user),
        Some(json!({"name": "Dune", "year": 2021})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = request(
        &app,
        "POST",
        "/v1/categories",
        Some(&user),
        Some(json!({"name": "Films", "slug": "films"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // User listing is admin-only.
    let (status, _) = request(&app, "GET", "/v1/users", Some(&user), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_review_edit_permissions() {
    let (app, state) = spawn_app().await;
    let admin = admin_token(&state).await;
    let title_id = create_title(&app, &admin, "Dune", 2021).await;

    let (_, author) = create_user(&state, "author", "user").await;
    let (_, other) = create_user(&state, "bystander", "user").await;
    let (_, moderator) = create_user(&state, "modo", "moderator").await;

    let (status, body) = request(
        &app,
        "POST",
        &format!("/v1/titles/{title_id}/reviews"),
        Some(&author),
        Some(json!({"text": "Great", "score": 9})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let review_id = body["data"]["id"].as_i64().unwrap();
    let review_uri = format!("/v1/titles/{title_id}/reviews/{review_id}");

    // A different plain user cannot edit or delete.
    let (status, _) = request(
        &app,
        "PATCH",
        &review_uri,
        Some(&other),
        Some(json!({"score": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = request(&app, "DELETE", &review_uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The author can edit their own review.
    let (status, body) = request(
        &app,
        "PATCH",
        &review_uri,
        Some(&author),
        Some(json!({"score": 10})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["score"], 10);

    // Moderators can delete anyone's review.
    let (status, _) = request(&app, "DELETE", &review_uri, Some(&moderator), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = request(&app, "GET", &review_uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_me_pins_role_and_answers_405_on_bad_payload() {
    let (app, state) = spawn_app().await;
    let (_, token) = create_user(&state, "climber", "user").await;

    let (status, body) = request(
        &app,
        "PATCH",
        "/v1/users/me",
        Some(&token),
        Some(json!({"bio": "I rate things", "role": "admin"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["bio"], "I rate things");
    // The role field is pinned regardless of the payload.
    assert_eq!(body["data"]["role"], "user");

    let (status, _) = request(
        &app,
        "PATCH",
        "/v1/users/me",
        Some(&token),
        Some(json!({"email": "not-an-email"})),
    )
    .await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    // Anonymous access to /me answers 401.
    let (status, _) = request(&app, "GET", "/v1/users/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_user_management() {
    let (app, state) = spawn_app().await;
    let admin = admin_token(&state).await;

    let (status, body) = request(
        &app,
        "POST",
        "/v1/users",
        Some(&admin),
        Some(json!({"username": "newbie", "email": "newbie@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["role"], "user");

    // Duplicate username collides.
    let (status, _) = request(
        &app,
        "POST",
        "/v1/users",
        Some(&admin),
        Some(json!({"username": "newbie", "email": "second@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Admins may promote.
    let (status, body) = request(
        &app,
        "PATCH",
        "/v1/users/newbie",
        Some(&admin),
        Some(json!({"role": "moderator"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "moderator");

    // Unknown roles are rejected.
    let (status, _) = request(
        &app,
        "PATCH",
        "/v1/users/newbie",
        Some(&admin),
        Some(json!({"role": "owner"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Search narrows the listing.
    let (status, body) = request(&app, "GET", "/v1/users?search=newb", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 1);
    assert_eq!(body["data"]["results"][0]["username"], "newbie");

    let (status, _) = request(&app, "DELETE", "/v1/users/newbie", Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = request(&app, "GET", "/v1/users/newbie", Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_catalog_crud_and_search() {
    let (app, state) = spawn_app().await;
    let admin = admin_token(&state).await;

    for (name, slug) in [("Films", "films"), ("Books", "books"), ("Music", "music")] {
        let (status, _) = request(
            &app,
            "POST",
            "/v1/categories",
            Some(&admin),
            Some(json!({"name": name, "slug": slug})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    // Slugs are unique.
    let (status, _) = request(
        &app,
        "POST",
        "/v1/categories",
        Some(&admin),
        Some(json!({"name": "Films again", "slug": "films"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Slug charset is enforced.
    let (status, _) = request(
        &app,
        "POST",
        "/v1/genres",
        Some(&admin),
        Some(json!({"name": "Sci-Fi", "slug": "Sci Fi!"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = request(&app, "GET", "/v1/categories?search=Book", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 1);
    assert_eq!(body["data"]["results"][0]["slug"], "books");

    let (status, body) = request(&app, "GET", "/v1/categories?limit=2", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 3);
    assert_eq!(body["data"]["results"].as_array().unwrap().len(), 2);

    let (status, _) = request(&app, "DELETE", "/v1/categories/music", Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = request(&app, "DELETE", "/v1/categories/music", Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_title_filters() {
    let (app, state) = spawn_app().await;
    let admin = admin_token(&state).await;

    for (name, slug) in [("Films", "films"), ("Books", "books")] {
        request(
            &app,
            "POST",
            "/v1/categories",
            Some(&admin),
            Some(json!({"name": name, "slug": slug})),
        )
        .await;
    }
    for (name, slug) in [("Sci-Fi", "sci-fi"), ("Drama", "drama")] {
        request(
            &app,
            "POST",
            "/v1/genres",
            Some(&admin),
            Some(json!({"name": name, "slug": slug})),
        )
        .await;
    }

    let (status, body) = request(
        &app,
        "POST",
        "/v1/titles",
        Some(&admin),
        Some(json!({
            "name": "Dune",
            "year": 2021,
            "category": "films",
            "genre": ["sci-fi", "drama"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["category"]["slug"], "films");
    assert_eq!(body["data"]["genres"].as_array().unwrap().len(), 2);

    let (status, _) = request(
        &app,
        "POST",
        "/v1/titles",
        Some(&admin),
        Some(json!({"name": "Dune", "year": 1965, "category": "books"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Unknown genre slug fails the write.
    let (status, body) = request(
        &app,
        "POST",
        "/v1/titles",
        Some(&admin),
        Some(json!({"name": "Mystery", "year": 2000, "genre": ["noir"]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unknown genres: noir");

    // A repeated genre slug collapses to a single link.
    let (status, body) = request(
        &app,
        "POST",
        "/v1/titles",
        Some(&admin),
        Some(json!({"name": "Solaris", "year": 1972, "genre": ["sci-fi", "sci-fi"]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["genres"].as_array().unwrap().len(), 1);

    // A release year in the future fails too.
    let (status, _) = request(
        &app,
        "POST",
        "/v1/titles",
        Some(&admin),
        Some(json!({"name": "Dune 3", "year": 3000})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = request(&app, "GET", "/v1/titles?genre=sci-fi", None, None).await;
    assert_eq!(body["data"]["count"], 2);
    assert_eq!(body["data"]["results"][0]["year"], 2021);

    let (_, body) = request(&app, "GET", "/v1/titles?name=Solaris", None, None).await;
    assert_eq!(body["data"]["results"][0]["genres"][0]["slug"], "sci-fi");

    let (_, body) = request(&app, "GET", "/v1/titles?category=books", None, None).await;
    assert_eq!(body["data"]["count"], 1);
    assert_eq!(body["data"]["results"][0]["year"], 1965);

    let (_, body) = request(&app, "GET", "/v1/titles?name=Dune", None, None).await;
    assert_eq!(body["data"]["count"], 2);

    let (_, body) = request(&app, "GET", "/v1/titles?year=1965", None, None).await;
    assert_eq!(body["data"]["count"], 1);

    let (_, body) = request(&app, "GET", "/v1/titles?genre=drama&year=1965", None, None).await;
    assert_eq!(body["data"]["count"], 0);
}

#[tokio::test]
async fn test_comment_flow_and_cascade() {
    let (app, state) = spawn_app().await;
    let admin = admin_token(&state).await;
    let title_id = create_title(&app, &admin, "Dune", 2021).await;

    let (_, author) = create_user(&state, "author", "user").await;
    let (_, commenter) = create_user(&state, "commenter", "user").await;

    let (_, body) = request(
        &app,
        "POST",
        &format!("/v1/titles/{title_id}/reviews"),
        Some(&author),
        Some(json!({"text": "Great", "score": 9})),
    )
    .await;
    let review_id = body["data"]["id"].as_i64().unwrap();
    let comments_uri = format!("/v1/titles/{title_id}/reviews/{review_id}/comments");

    // Anonymous comment answers 401.
    let (status, _) = request(
        &app,
        "POST",
        &comments_uri,
        None,
        Some(json!({"text": "Agreed"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = request(
        &app,
        "POST",
        &comments_uri,
        Some(&commenter),
        Some(json!({"text": "Agreed"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let comment_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["author"], "commenter");

    // Only the author (or staff) may edit the comment.
    let comment_uri = format!("{comments_uri}/{comment_id}");
    let (status, _) = request(
        &app,
        "PATCH",
        &comment_uri,
        Some(&author),
        Some(json!({"text": "Hijacked"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = request(
        &app,
        "PATCH",
        &comment_uri,
        Some(&commenter),
        Some(json!({"text": "Strongly agreed"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["text"], "Strongly agreed");

    let (status, body) = request(&app, "GET", &comments_uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 1);

    // Deleting the review takes its comments with it.
    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/v1/titles/{title_id}/reviews/{review_id}"),
        Some(&author),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = request(&app, "GET", &comments_uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_a_user_removes_their_reviews() {
    let (app, state) = spawn_app().await;
    let admin = admin_token(&state).await;
    let title_id = create_title(&app, &admin, "Dune", 2021).await;

    let (_, author) = create_user(&state, "leaver", "user").await;
    let (status, _) = request(
        &app,
        "POST",
        &format!("/v1/titles/{title_id}/reviews"),
        Some(&author),
        Some(json!({"text": "Great", "score": 9})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = request(&app, "DELETE", "/v1/users/leaver", Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = request(
        &app,
        "GET",
        &format!("/v1/titles/{title_id}/reviews"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 0);

    // The rating returns to null once the only review is gone.
    let (_, body) = request(&app, "GET", &format!("/v1/titles/{title_id}"), None, None).await;
    assert!(body["data"]["rating"].is_null());

    // And the orphaned bearer token stops working.
    let (status, _) = request(&app, "GET", "/v1/users/me", Some(&author), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
