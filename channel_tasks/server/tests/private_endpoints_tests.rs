use axum::http::{Method, StatusCode};
use channel_tasks_core::{TaskItem, TaskList};
use serde_json::{Value, json};

mod common;

use common::{TestApp, utc};

fn body_json(body: &str) -> Value {
    serde_json::from_str(body).unwrap()
}

#[tokio::test]
async fn can_create_private_task_for_caller() {
    let app = TestApp::new();

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/private/tasks",
            Some("u1"),
            Some(json!({"text": "Dentist", "deadline": "2024-06-05T15:00:00Z"})),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body_json(&body)["text"], "Dentist");
    let stored = app.stored_json("private_tasks_u1").await.unwrap();
    assert_eq!(stored["items"][0]["text"], "Dentist");
    assert_eq!(stored["has_ever_had_tasks"], true);
}

#[tokio::test]
async fn query_user_id_takes_precedence_over_caller() {
    let app = TestApp::new();
    let mut list = TaskList::new();
    list.add_item(TaskItem::new("Theirs"), utc(1, 8));
    app.seed("private_tasks_u2", &list).await;

    let (status, body) = app
        .send(
            Method::GET,
            "/api/v1/private/tasks?user_id=u2",
            Some("u1"),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body_json(&body)["items"][0]["text"], "Theirs");
}

#[tokio::test]
async fn private_tasks_require_a_user() {
    let app = TestApp::new();

    let (status, body) = app
        .send(Method::GET, "/api/v1/private/tasks", None, None)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "user_id is required");
}

#[tokio::test]
async fn deleting_unknown_private_task_is_not_found() {
    let app = TestApp::new();

    let (status, body) = app
        .send(
            Method::DELETE,
            "/api/v1/private/tasks?id=missing",
            Some("u1"),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "Task not found");
}

#[tokio::test]
async fn can_manage_private_groups() {
    let app = TestApp::new();

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/private/groups",
            Some("u1"),
            Some(json!({"name": "Home"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let group_id = body_json(&body)["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/private/tasks",
            Some("u1"),
            Some(json!({"text": "Fix sink", "group_id": group_id})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app
        .send(Method::GET, "/api/v1/private/groups", Some("u1"), None)
        .await;
    assert_eq!(body_json(&body), json!([{"id": group_id, "name": "Home"}]));

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/api/v1/private/groups?id={}", group_id),
            Some("u1"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let stored = app.stored_json("private_tasks_u1").await.unwrap();
    assert_eq!(stored["groups"], json!([]));
    assert!(stored["items"][0].get("group_id").is_none());
}

#[tokio::test]
async fn private_and_channel_lists_are_separate() {
    let app = TestApp::new();

    app.send(
        Method::POST,
        "/api/v1/private/tasks?user_id=c1",
        None,
        Some(json!({"text": "private"})),
    )
    .await;

    let (_, body) = app
        .send(Method::GET, "/api/v1/tasks?channel_id=c1", None, None)
        .await;
    assert_eq!(body_json(&body)["items"], json!([]));
}

#[tokio::test]
async fn viewing_private_tasks_is_not_activity() {
    let app = TestApp::new();

    app.send(Method::GET, "/api/v1/private/tasks", Some("u1"), None)
        .await;

    assert_eq!(app.stored_json("daily_prefs_u1").await, None);
}
