mod common;

use api_lib::web::lessons::{create_lesson_with_files, UploadedFile};
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use bytes::Bytes;
use common::{body_json, FakeCompletion, FakeStorage, Harness};
use didactic_core::domain::LessonFile;

const BOUNDARY: &str = "lesson-upload-boundary";

fn upload(name: &str, body: &str) -> UploadedFile {
    UploadedFile {
        file_name: name.to_string(),
        content_type: "text/plain".to_string(),
        data: Bytes::from(body.to_string()),
    }
}

fn multipart_body(fields: &[(&str, &str)], files: &[(&str, &str)]) -> String {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    for (file_name, contents) in files {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{file_name}\"\r\nContent-Type: text/plain\r\n\r\n{contents}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    body
}

fn multipart_request(cookie: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/lessons/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .header("cookie", cookie)
        .body(Body::from(body))
        .expect("failed to build request")
}

#[tokio::test]
async fn failed_second_upload_keeps_lesson_and_first_file() {
    let harness = Harness::with_parts(
        FakeStorage::failing_on(&["b.txt"]),
        FakeCompletion::replying("unused"),
    );
    let (user_id, _) = harness.signed_in_cookie().await;

    let created = create_lesson_with_files(
        &harness.state,
        user_id,
        "Title".to_string(),
        "Body".to_string(),
        vec![upload("a.txt", "first"), upload("b.txt", "second")],
    )
    .await
    .expect("lesson insert succeeds");

    assert_eq!(harness.db.lessons().len(), 1);
    assert_eq!(created.failed_files, vec!["b.txt".to_string()]);

    let files = harness.db.files();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].file_name, "a.txt");
    assert_eq!(files[0].lesson_id, created.lesson.id);
    assert_eq!(
        files[0].file_path,
        LessonFile::storage_path(user_id, created.lesson.id, "a.txt")
    );
    assert_eq!(harness.storage.uploaded_paths(), vec![files[0].file_path.clone()]);
}

#[tokio::test]
async fn every_attachment_is_recorded_when_storage_succeeds() {
    let harness = Harness::new();
    let (user_id, _) = harness.signed_in_cookie().await;

    let created = create_lesson_with_files(
        &harness.state,
        user_id,
        "Title".to_string(),
        "Body".to_string(),
        vec![upload("a.txt", "first"), upload("b.txt", "second")],
    )
    .await
    .expect("lesson insert succeeds");

    assert!(created.failed_files.is_empty());
    let names: Vec<String> = created.files.iter().map(|f| f.file_name.clone()).collect();
    assert_eq!(names, vec!["a.txt".to_string(), "b.txt".to_string()]);
    assert_eq!(harness.db.files().len(), 2);
}

#[tokio::test]
async fn multipart_upload_reports_failed_files() {
    let harness = Harness::with_parts(
        FakeStorage::failing_on(&["b.txt"]),
        FakeCompletion::replying("unused"),
    );
    let (_, cookie) = harness.signed_in_cookie().await;

    let body = multipart_body(
        &[("title", "Linear Algebra"), ("content", "Matrices")],
        &[("a.txt", "first"), ("b.txt", "second")],
    );
    let response = harness.send(multipart_request(&cookie, body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["lesson"]["title"], "Linear Algebra");
    assert_eq!(body["files"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["files"][0]["file_name"], "a.txt");
    assert_eq!(body["files"][0]["file_type"], "text/plain");
    assert_eq!(body["failed_files"], serde_json::json!(["b.txt"]));
}

#[tokio::test]
async fn multipart_upload_without_title_is_rejected() {
    let harness = Harness::new();
    let (_, cookie) = harness.signed_in_cookie().await;

    let body = multipart_body(&[("content", "Matrices")], &[("a.txt", "first")]);
    let response = harness.send(multipart_request(&cookie, body)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(harness.db.lessons().is_empty());
    assert!(harness.storage.uploaded_paths().is_empty());
}
