mod support;

use axum::http::{Method, StatusCode};
use serde_json::json;

use support::{request, send_json, TestApp};

const AFFIRMATION: &str = "I am already living in my sunlit studio.";

#[tokio::test]
async fn affirmation_debits_one_gem_and_is_recorded() {
    let app = TestApp::new(None, Some(AFFIRMATION));
    let (user_id, cookie) = app.db.seed_user(2, "UTC");

    let response = send_json(
        &app.router,
        request(
            Method::POST,
            "/affirmations",
            Some(&cookie),
            Some(json!({ "desire": "a sunlit studio", "ui_language": "Spanish" })),
        ),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["affirmation"], AFFIRMATION);
    assert_eq!(response.body["soul_gems"], 1);
    assert_eq!(app.db.soul_gems(user_id), 1);

    let recorded = app.db.affirmations();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].input, "a sunlit studio");

    let (_, language, religion) = app
        .affirmations
        .last_request
        .lock()
        .expect("lock")
        .clone()
        .expect("model should be called");
    assert_eq!(language, "Spanish");
    assert_eq!(religion, None);
}

#[tokio::test]
async fn empty_balance_is_forbidden_without_calling_the_model() {
    let app = TestApp::new(None, Some(AFFIRMATION));
    let (user_id, cookie) = app.db.seed_user(0, "UTC");

    let response = send_json(
        &app.router,
        request(Method::POST, "/affirmations", Some(&cookie), Some(json!({ "desire": "peace" }))),
    )
    .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["message"], "Insufficient Soul Gems");
    assert_eq!(response.body["soul_gems"], 0);
    assert_eq!(app.affirmations.call_count(), 0);
    assert_eq!(app.db.soul_gems(user_id), 0);
}

#[tokio::test]
async fn missing_desire_is_a_bad_request() {
    let app = TestApp::new(None, Some(AFFIRMATION));
    let (_, cookie) = app.db.seed_user(5, "UTC");

    let response = send_json(
        &app.router,
        request(Method::POST, "/affirmations", Some(&cookie), Some(json!({ "desire": "   " }))),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.affirmations.call_count(), 0);
}

#[tokio::test]
async fn failed_generation_keeps_the_balance() {
    let app = TestApp::new(None, None);
    let (user_id, cookie) = app.db.seed_user(1, "UTC");

    let response = send_json(
        &app.router,
        request(Method::POST, "/affirmations", Some(&cookie), Some(json!({ "desire": "courage" }))),
    )
    .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(app.db.soul_gems(user_id), 1);
    assert!(app.db.affirmations().is_empty());
}

#[tokio::test]
async fn religion_and_default_language_reach_the_model() {
    let app = TestApp::new(None, Some(AFFIRMATION));
    let (user_id, cookie) = app.db.seed_user(1, "UTC");
    app.db.set_religion(user_id, "Sufism");

    let response = send_json(
        &app.router,
        request(Method::POST, "/affirmations", Some(&cookie), Some(json!({ "desire": "clarity" }))),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["soul_gems"], 0);

    let (desire, language, religion) = app
        .affirmations
        .last_request
        .lock()
        .expect("lock")
        .clone()
        .expect("model should be called");
    assert_eq!(desire, "clarity");
    assert_eq!(language, "English");
    assert_eq!(religion.as_deref(), Some("Sufism"));

    let again = send_json(
        &app.router,
        request(Method::POST, "/affirmations", Some(&cookie), Some(json!({ "desire": "clarity" }))),
    )
    .await;
    assert_eq!(again.status, StatusCode::FORBIDDEN);
}
