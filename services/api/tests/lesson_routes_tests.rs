mod common;

use axum::http::{header, StatusCode};
use common::{body_json, empty_request, json_request, Harness};

#[tokio::test]
async fn list_requires_a_session_cookie() {
    let harness = Harness::new();

    let response = harness.send(empty_request("GET", "/api/lessons", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = harness
        .send(empty_request("GET", "/api/lessons", Some("session=unknown")))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn list_is_empty_when_no_lessons_exist() {
    let harness = Harness::new();
    let (_, cookie) = harness.signed_in_cookie().await;

    let response = harness
        .send(empty_request("GET", "/api/lessons", Some(&cookie)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!([]));
}

#[tokio::test]
async fn list_returns_lessons_newest_first() {
    let harness = Harness::new();
    let (_, cookie) = harness.signed_in_cookie().await;
    let first = harness.db.seed_lesson("First", "alpha");
    let second = harness.db.seed_lesson("Second", "beta");
    let third = harness.db.seed_lesson("Third", "gamma");

    let response = harness
        .send(empty_request("GET", "/api/lessons", Some(&cookie)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let ids: Vec<String> = body
        .as_array()
        .expect("array body")
        .iter()
        .map(|l| l["id"].as_str().expect("id").to_string())
        .collect();
    assert_eq!(
        ids,
        vec![
            third.id.to_string(),
            second.id.to_string(),
            first.id.to_string()
        ]
    );
}

#[tokio::test]
async fn list_truncates_content_and_always_appends_ellipsis() {
    let harness = Harness::new();
    let (_, cookie) = harness.signed_in_cookie().await;
    let long = "x".repeat(150);
    harness.db.seed_lesson("Long", &long);
    harness.db.seed_lesson("Short", "tiny");

    let response = harness
        .send(empty_request("GET", "/api/lessons", Some(&cookie)))
        .await;
    let body = body_json(response).await;

    assert_eq!(body[0]["title"], "Short");
    assert_eq!(body[0]["content"], "tiny...");
    assert_eq!(body[1]["content"], format!("{}...", "x".repeat(100)));
}

#[tokio::test]
async fn create_rejects_missing_fields_without_inserting() {
    let harness = Harness::new();
    let (_, cookie) = harness.signed_in_cookie().await;

    for body in [
        r#"{"title":"","content":"body"}"#,
        r#"{"title":"Title","content":""}"#,
        r#"{"title":"Title"}"#,
        r#"{}"#,
    ] {
        let response = harness
            .send(json_request("POST", "/api/lessons", Some(&cookie), body))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);
        assert_eq!(
            body_json(response).await["error"],
            "Title and content are required"
        );
    }

    assert!(harness.db.lessons().is_empty());
}

#[tokio::test]
async fn create_stores_lesson_for_session_user() {
    let harness = Harness::new();
    let (user_id, cookie) = harness.signed_in_cookie().await;

    let response = harness
        .send(json_request(
            "POST",
            "/api/lessons",
            Some(&cookie),
            r#"{"title":"Ownership","content":"Borrowing rules"}"#,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["title"], "Ownership");
    assert_eq!(body["user_id"], user_id.to_string());

    let lessons = harness.db.lessons();
    assert_eq!(lessons.len(), 1);
    assert_eq!(lessons[0].content, "Borrowing rules");
}

#[tokio::test]
async fn unsupported_method_on_lessons_is_405_with_allow_header() {
    let harness = Harness::new();
    let (_, cookie) = harness.signed_in_cookie().await;

    let response = harness
        .send(empty_request("DELETE", "/api/lessons", Some(&cookie)))
        .await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        response
            .headers()
            .get(header::ALLOW)
            .and_then(|v| v.to_str().ok()),
        Some("GET, POST")
    );
    assert_eq!(body_json(response).await["error"], "Method not allowed");
}

#[tokio::test]
async fn detail_decodes_structured_content() {
    let harness = Harness::new();
    let (_, cookie) = harness.signed_in_cookie().await;
    let lesson = harness.db.seed_lesson(
        "Vectors",
        r#"{"introduction":"Vectors have magnitude and direction.","keyConcepts":["Magnitude"]}"#,
    );

    let response = harness
        .send(empty_request(
            "GET",
            &format!("/api/lessons/{}", lesson.id),
            Some(&cookie),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["lesson"]["title"], "Vectors");
    assert_eq!(body["parsed_content"]["kind"], "structured");
    assert_eq!(body["preview"], "Vectors have magnitude and direction....");
    assert_eq!(body["files"], serde_json::json!([]));
}

#[tokio::test]
async fn detail_falls_back_to_plain_text() {
    let harness = Harness::new();
    let (_, cookie) = harness.signed_in_cookie().await;
    let lesson = harness.db.seed_lesson("Notes", "just some notes");

    let response = harness
        .send(empty_request(
            "GET",
            &format!("/api/lessons/{}", lesson.id),
            Some(&cookie),
        ))
        .await;
    let body = body_json(response).await;
    assert_eq!(body["parsed_content"]["kind"], "plain");
    assert_eq!(body["parsed_content"]["text"], "just some notes");
}

#[tokio::test]
async fn detail_of_unknown_lesson_is_404() {
    let harness = Harness::new();
    let (_, cookie) = harness.signed_in_cookie().await;

    let response = harness
        .send(empty_request(
            "GET",
            &format!("/api/lessons/{}", uuid::Uuid::new_v4()),
            Some(&cookie),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Lesson not found");
}
