use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use lms_core::{create_app, get_database_pool, AppConfig, AppState, Catalog};
use serde_json::Value;
use tempfile::NamedTempFile;
use tower::ServiceExt;

const COURSE_ID: &str = "course-v1:edX+DemoX+2026";
const UNIT: &str = "block-v1:edX+DemoX+2026+type@vertical+block@unit";
const HTML: &str = "block-v1:edX+DemoX+2026+type@html+block@intro";
const OTHER_COURSE_ID: &str = "course-v1:edX+OtherX+2026";
const OTHER_EXAM: &str = "block-v1:edX+OtherX+2026+type@problem+block@exam";

const CATALOG: &str = r#"
users:
  - { id: 1, username: audit_learner }
  - { id: 2, username: verified_learner }
  - { id: 3, username: instructor, is_staff: true }
  - { id: 4, username: course_staff, is_staff: true }
courses:
  - course_id: course-v1:edX+DemoX+2026
    display_name: Demo Course
    upgrade_url: https://lms.example.com/upgrade/DemoX
    root:
      usage_key: block-v1:edX+DemoX+2026+type@course+block@course
      category: course
      children:
        - usage_key: block-v1:edX+DemoX+2026+type@vertical+block@unit
          category: vertical
          children:
            - usage_key: block-v1:edX+DemoX+2026+type@html+block@intro
              category: html
            - usage_key: block-v1:edX+DemoX+2026+type@problem+block@quiz
              category: problem
              graded: true
              has_score: true
              weight: 1.0
              group_access: { 51: [2] }
  - course_id: course-v1:edX+OtherX+2026
    display_name: Other Course
    root:
      usage_key: block-v1:edX+OtherX+2026+type@course+block@course
      category: course
      children:
        - usage_key: block-v1:edX+OtherX+2026+type@problem+block@exam
          category: problem
          graded: true
          has_score: true
enrollments:
  - { username: audit_learner, course_id: course-v1:edX+DemoX+2026, mode: audit, created: 2026-02-01T00:00:00Z }
  - { username: verified_learner, course_id: course-v1:edX+DemoX+2026, mode: verified, created: 2026-02-01T00:00:00Z }
masquerades:
  - { username: instructor, course_id: course-v1:edX+DemoX+2026, role: student, group_id: 1 }
"#;

async fn setup() -> (Router, NamedTempFile) {
    let db_file = NamedTempFile::new().unwrap();

    let mut config = AppConfig::default();
    config.database.url = format!("sqlite:{}", db_file.path().display());

    let pool = get_database_pool(&config.database).await.unwrap();
    let stores = Catalog::from_yaml_str(CATALOG).unwrap().into_stores().unwrap();
    let state = AppState::new(&config, pool, stores).unwrap();

    (create_app(state), db_file)
}

fn gate_uri(course_id: &str, usage_key: &str, user: Option<&str>) -> String {
    let base = format!("/api/courses/{}/blocks/{}/gate", course_id, usage_key);
    match user {
        Some(username) => format!("{}?user={}", base, username),
        None => base,
    }
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_audit_learner_sees_paywall() {
    let (app, _db) = setup().await;

    let (status, body) = get(app, &gate_uri(COURSE_ID, UNIT, Some("audit_learner"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["gated"], true);
    let fragment = body["data"]["fragment"].as_str().unwrap();
    assert!(fragment.contains("data-partition-id=\"51\""));
    assert!(fragment.contains("data-user-group=\"1\""));
    assert!(fragment.contains("data-allowed-groups=\"2\""));
    assert!(fragment.contains("https://lms.example.com/upgrade/DemoX"));
}

#[tokio::test]
async fn test_verified_learner_not_gated() {
    let (app, _db) = setup().await;

    let (status, body) = get(app, &gate_uri(COURSE_ID, UNIT, Some("verified_learner"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["gated"], false);
    assert!(body["data"]["fragment"].is_null());
}

#[tokio::test]
async fn test_anonymous_not_gated() {
    let (app, _db) = setup().await;

    let (status, body) = get(app.clone(), &gate_uri(COURSE_ID, UNIT, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["gated"], false);

    let (status, body) = get(app, &gate_uri(COURSE_ID, UNIT, Some("nobody"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["gated"], false);
}

#[tokio::test]
async fn test_staff_masquerading_as_limited_sees_paywall() {
    let (app, _db) = setup().await;

    let (status, body) = get(app, &gate_uri(COURSE_ID, UNIT, Some("instructor"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["gated"], true);
    assert!(body["data"]["fragment"]
        .as_str()
        .unwrap()
        .contains("data-username=\"instructor\""));
}

#[tokio::test]
async fn test_staff_without_masquerade_not_gated() {
    let (app, _db) = setup().await;

    let (status, body) = get(app, &gate_uri(COURSE_ID, UNIT, Some("course_staff"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["gated"], false);
}

#[tokio::test]
async fn test_ungraded_block_not_gated() {
    let (app, _db) = setup().await;

    let (status, body) = get(app, &gate_uri(COURSE_ID, HTML, Some("audit_learner"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["gated"], false);
}

#[tokio::test]
async fn test_invalid_course_id() {
    let (app, _db) = setup().await;

    let (status, body) = get(app, &gate_uri("DemoX", UNIT, Some("audit_learner"))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_unknown_block() {
    let (app, _db) = setup().await;

    let (status, _) = get(
        app,
        &gate_uri(COURSE_ID, "block-v1:edX+DemoX+2026+type@problem+block@missing", None),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_block_from_another_course_not_found() {
    let (app, _db) = setup().await;

    let (status, _) = get(
        app.clone(),
        &gate_uri(COURSE_ID, OTHER_EXAM, Some("audit_learner")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(app, &gate_uri(OTHER_COURSE_ID, UNIT, Some("audit_learner"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_course() {
    let (app, _db) = setup().await;

    let (status, _) = get(app, &gate_uri("course-v1:edX+Other+2026", UNIT, None)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
