//! End-to-end tests for the WorkNest HTTP API
//!
//! Every test drives the real router over an in-memory store, so no
//! database is needed.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{day, TestContext, JWT_SECRET, PASSWORD};
use serde_json::json;
use tower::Service as _;
use worknest_shared::auth::jwt::{create_token, Claims, TokenType};
use worknest_shared::models::user::UserRole;

#[tokio::test]
async fn test_health_reports_memory_backend() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx.send("GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "memory");
    assert!(body.get("pool").is_none());
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx.send("GET", "/api/tasks/my-tasks", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, _) = ctx.send("GET", "/api/dashboard/user", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_login_and_refresh() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx
        .send(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "name": "Asha", "email": "asha@example.com", "password": "secret99" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["role"], "user");
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["token"].is_string());

    let (status, body) = ctx
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "asha@example.com", "password": "secret99" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let refresh_token = body["refresh_token"].as_str().unwrap().to_string();
    let access_token = body["token"].as_str().unwrap().to_string();

    let (status, body) = ctx
        .send(
            "POST",
            "/api/auth/refresh",
            None,
            Some(json!({ "refresh_token": refresh_token })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "asha@example.com");

    // An access token is not accepted as a refresh token
    let (status, _) = ctx
        .send(
            "POST",
            "/api/auth/refresh",
            None,
            Some(json!({ "refresh_token": access_token })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_bad_input() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx
        .send(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "name": "Copy", "email": ctx.user.email, "password": "secret99" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    let (status, body) = ctx
        .send(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "name": "Bad", "email": "not-an-email", "password": "secret99" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "email");
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let ctx = TestContext::new().await.unwrap();

    let (status, _) = ctx
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": ctx.user.email, "password": "wrong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": ctx.user.email, "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_user_management_is_admin_only() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx.send("GET", "/api/users", Some(&ctx.user), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, body) = ctx.send("GET", "/api/users?role=user", Some(&ctx.admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"].as_array().unwrap().len(), 2);

    let (status, _) = ctx.send("GET", "/api/users?role=owner", Some(&ctx.admin), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = ctx
        .send(
            "POST",
            "/api/users",
            Some(&ctx.admin),
            Some(json!({
                "name": "Second Admin",
                "email": "admin2@example.com",
                "password": "secret99",
                "role": "admin"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_str().unwrap().to_string();

    let (status, body) = ctx
        .send("GET", &format!("/api/users/{}", id), Some(&ctx.admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "admin");

    let (status, _) = ctx
        .send("DELETE", &format!("/api/users/{}", id), Some(&ctx.admin), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = ctx
        .send("GET", &format!("/api/users/{}", id), Some(&ctx.admin), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_user_with_tasks_is_conflict() {
    let ctx = TestContext::new().await.unwrap();
    ctx.create_task(
        &ctx.user,
        json!({ "title": "Mine", "start_date": day(0), "due_date": day(3) }),
    )
    .await;

    let (status, _) = ctx
        .send("DELETE", &format!("/api/users/{}", ctx.user.id), Some(&ctx.admin), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_task_creation_assignment_rules() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx
        .send(
            "POST",
            "/api/tasks",
            Some(&ctx.user),
            Some(json!({ "title": "Self", "start_date": day(0), "due_date": day(2) })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["assigned_user_id"], ctx.user.id.to_string());
    assert_eq!(body["status"], "pending");
    assert_eq!(body["delayed"], false);

    let (status, _) = ctx
        .send(
            "POST",
            "/api/tasks",
            Some(&ctx.user),
            Some(json!({
                "title": "Pushed",
                "start_date": day(0),
                "due_date": day(2),
                "assigned_user_id": ctx.other.id
            })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = ctx
        .send(
            "POST",
            "/api/tasks",
            Some(&ctx.admin),
            Some(json!({
                "title": "Delegated",
                "start_date": day(0),
                "due_date": day(2),
                "assigned_user_id": ctx.other.id
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["assigned_user_name"], "Vinayak");

    let (status, _) = ctx
        .send(
            "POST",
            "/api/tasks",
            Some(&ctx.user),
            Some(json!({ "title": "", "start_date": day(0), "due_date": day(2) })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_my_tasks_delayed_filter() {
    let ctx = TestContext::new().await.unwrap();
    let late = ctx
        .create_task(
            &ctx.user,
            json!({ "title": "Late", "start_date": day(-10), "due_date": day(-3) }),
        )
        .await;
    ctx.create_task(
        &ctx.user,
        json!({ "title": "On time", "start_date": day(0), "due_date": day(5) }),
    )
    .await;
    ctx.create_task(
        &ctx.user,
        json!({
            "title": "Done late",
            "start_date": day(-10),
            "due_date": day(-3),
            "status": "completed"
        }),
    )
    .await;

    let (status, body) = ctx
        .send("GET", "/api/tasks/my-tasks?filter=delayed", Some(&ctx.user), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let tasks = body["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["id"], late.as_str());
    assert_eq!(tasks[0]["delayed"], true);

    let (_, body) = ctx
        .send("GET", "/api/tasks/my-tasks?filter=all", Some(&ctx.user), None)
        .await;
    assert_eq!(body["tasks"].as_array().unwrap().len(), 3);

    let (_, body) = ctx
        .send("GET", "/api/tasks/my-tasks", Some(&ctx.other), None)
        .await;
    assert!(body["tasks"].as_array().unwrap().is_empty());

    let (status, _) = ctx
        .send("GET", "/api/tasks/my-tasks?filter=someday", Some(&ctx.user), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_task_visibility() {
    let ctx = TestContext::new().await.unwrap();
    let id = ctx
        .create_task(
            &ctx.user,
            json!({ "title": "Private", "start_date": day(0), "due_date": day(1) }),
        )
        .await;
    let uri = format!("/api/tasks/{}", id);

    let (status, body) = ctx.send("GET", &uri, Some(&ctx.user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["task"]["title"], "Private");
    assert!(body["comments"].as_array().unwrap().is_empty());

    let (status, _) = ctx.send("GET", &uri, Some(&ctx.other), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx.send("GET", &uri, Some(&ctx.admin), None).await;
    assert_eq!(status, StatusCode::OK);

    let missing = format!("/api/tasks/{}", uuid::Uuid::new_v4());
    let (status, _) = ctx.send("GET", &missing, Some(&ctx.admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_status_change_requires_assignee_even_for_admin() {
    let ctx = TestContext::new().await.unwrap();
    let id = ctx
        .create_task(
            &ctx.user,
            json!({ "title": "Gate", "start_date": day(0), "due_date": day(1) }),
        )
        .await;
    let uri = format!("/api/tasks/{}/status", id);
    let body = json!({ "status": "in_progress" });

    let (status, _) = ctx.send("PATCH", &uri, Some(&ctx.admin), Some(body.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx.send("PATCH", &uri, Some(&ctx.other), Some(body.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, json) = ctx.send("PATCH", &uri, Some(&ctx.user), Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "in_progress");
}

#[tokio::test]
async fn test_assign_task_to_self_is_idempotent() {
    let ctx = TestContext::new().await.unwrap();
    let id = ctx
        .create_task(
            &ctx.user,
            json!({ "title": "Handover", "start_date": day(0), "due_date": day(1) }),
        )
        .await;
    let uri = format!("/api/tasks/{}/assign", id);

    for _ in 0..2 {
        let (status, body) = ctx.send("POST", &uri, Some(&ctx.other), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["assigned_user_id"], ctx.other.id.to_string());
    }

    // The new assignee now owns the status gate
    let (status, _) = ctx
        .send(
            "PATCH",
            &format!("/api/tasks/{}/status", id),
            Some(&ctx.other),
            Some(json!({ "status": "completed" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_comment_lifecycle() {
    let ctx = TestContext::new().await.unwrap();
    let id = ctx
        .create_task(
            &ctx.user,
            json!({ "title": "Discuss", "start_date": day(0), "due_date": day(1) }),
        )
        .await;
    let comments_uri = format!("/api/tasks/{}/comments", id);

    let (status, _) = ctx
        .send(
            "POST",
            &comments_uri,
            Some(&ctx.other),
            Some(json!({ "comment_text": "Not my task" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, comment) = ctx
        .send(
            "POST",
            &comments_uri,
            Some(&ctx.user),
            Some(json!({ "comment_text": "Started" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(comment["user_name"], "Naina");
    let comment_uri = format!("/api/comments/{}", comment["id"].as_str().unwrap());

    let (status, _) = ctx
        .send(
            "POST",
            &comments_uri,
            Some(&ctx.admin),
            Some(json!({ "comment_text": "Looks good" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = ctx
        .send("GET", &format!("/api/tasks/{}", id), Some(&ctx.user), None)
        .await;
    let texts: Vec<&str> = body["comments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["comment_text"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["Started", "Looks good"]);

    // Only the author may delete, admins included
    let (status, _) = ctx.send("DELETE", &comment_uri, Some(&ctx.admin), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx.send("DELETE", &comment_uri, Some(&ctx.user), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = ctx.send("DELETE", &comment_uri, Some(&ctx.user), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx.send("GET", "/api/comments", Some(&ctx.user), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = ctx.send("GET", "/api/comments", Some(&ctx.admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["comments"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_admin_task_management() {
    let ctx = TestContext::new().await.unwrap();
    let id = ctx
        .create_task(
            &ctx.user,
            json!({ "title": "Draft", "start_date": day(-5), "due_date": day(-1) }),
        )
        .await;
    let uri = format!("/api/tasks/{}", id);

    let (status, _) = ctx.send("GET", "/api/tasks", Some(&ctx.user), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = ctx
        .send("GET", "/api/tasks?status=delayed", Some(&ctx.admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tasks"].as_array().unwrap().len(), 1);

    let (status, body) = ctx
        .send("GET", "/api/tasks?status=IN_PROGRESS", Some(&ctx.admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["tasks"].as_array().unwrap().is_empty());

    let (status, _) = ctx
        .send("GET", "/api/tasks?status=archived", Some(&ctx.admin), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let update = json!({
        "title": "Final",
        "description": "Reassigned",
        "assigned_user_id": ctx.other.id,
        "start_date": day(0),
        "due_date": day(4),
        "status": "in_progress"
    });

    let (status, _) = ctx.send("PUT", &uri, Some(&ctx.user), Some(update.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = ctx.send("PUT", &uri, Some(&ctx.admin), Some(update)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Final");
    assert_eq!(body["assigned_user_name"], "Vinayak");
    assert_eq!(body["delayed"], false);

    let (status, _) = ctx.send("DELETE", &uri, Some(&ctx.other), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx.send("DELETE", &uri, Some(&ctx.admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Deleting again is a no-op
    let (status, _) = ctx.send("DELETE", &uri, Some(&ctx.admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = ctx.send("GET", &uri, Some(&ctx.admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_dashboards() {
    let ctx = TestContext::new().await.unwrap();
    for i in 0..7 {
        ctx.create_task(
            &ctx.user,
            json!({ "title": format!("Task {}", i), "start_date": day(-4), "due_date": day(-2) }),
        )
        .await;
    }
    ctx.create_task(
        &ctx.other,
        json!({ "title": "Other", "start_date": day(0), "due_date": day(2) }),
    )
    .await;

    let (status, body) = ctx.send("GET", "/api/dashboard/user", Some(&ctx.user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["taskStats"]["total"], 7);
    assert_eq!(body["taskStats"]["pending"], 7);
    assert_eq!(body["taskStats"]["delayed"], 7);
    let recent = body["recentTasks"].as_array().unwrap();
    assert_eq!(recent.len(), 5);
    assert_eq!(recent[0]["title"], "Task 6");

    let (status, _) = ctx.send("GET", "/api/dashboard/admin", Some(&ctx.user), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = ctx.send("GET", "/api/dashboard/admin", Some(&ctx.admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["taskStats"]["total"], 8);
    assert_eq!(body["recentTasks"].as_array().unwrap().len(), 8);
    assert!(body["recentComments"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_security_headers_on_api_responses() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .app
        .clone()
        .call(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.headers().get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(response.headers().get("cache-control").unwrap(), "no-store");
    assert!(response.headers().get("strict-transport-security").is_none());
}

#[tokio::test]
async fn test_blank_names_are_rejected() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx
        .send(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "name": "   ", "email": "blank@example.com", "password": "secret99" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "name");

    let (status, _) = ctx
        .send(
            "POST",
            "/api/users",
            Some(&ctx.admin),
            Some(json!({ "name": "\t ", "email": "blank2@example.com", "password": "secret99" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = ctx
        .send(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "name": "  Asha  ", "email": "asha@example.com", "password": "secret99" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["name"], "Asha");
}

#[tokio::test]
async fn test_deleted_admin_loses_admin_access() {
    let ctx = TestContext::new().await.unwrap();
    let former = ctx
        .services
        .users
        .register_user("Former Admin", "former@example.com", PASSWORD, UserRole::Admin)
        .await
        .unwrap();
    let token = ctx.token(&former);

    let (status, _) = ctx
        .send_with_token("GET", "/api/dashboard/admin", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    ctx.services.users.delete_user(former.id).await.unwrap();

    let (status, _) = ctx
        .send_with_token(
            "POST",
            "/api/users",
            Some(&token),
            Some(json!({
                "name": "Intruder",
                "email": "intruder@example.com",
                "password": "secret99",
                "role": "admin"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx
        .send_with_token("GET", "/api/dashboard/admin", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert!(!ctx
        .services
        .users
        .exists_by_email("intruder@example.com")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_admin_gate_uses_stored_role_not_token_claim() {
    let ctx = TestContext::new().await.unwrap();
    let id = ctx
        .create_task(
            &ctx.user,
            json!({ "title": "Keep", "start_date": day(0), "due_date": day(1) }),
        )
        .await;

    // Validly signed, but the stored account is a plain user
    let claims = Claims::new(ctx.user.id, UserRole::Admin, TokenType::Access);
    let token = create_token(&claims, JWT_SECRET).unwrap();

    let (status, _) = ctx.send_with_token("GET", "/api/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx
        .send_with_token("DELETE", &format!("/api/tasks/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Methods open to every user on the same path still work
    let (status, _) = ctx
        .send_with_token("GET", &format!("/api/tasks/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_responses_are_compressed_on_request() {
    let ctx = TestContext::new().await.unwrap();

    let request = Request::builder()
        .uri("/api/users")
        .header("authorization", format!("Bearer {}", ctx.token(&ctx.admin)))
        .header("accept-encoding", "gzip")
        .body(Body::empty())
        .unwrap();
    let response = ctx.app.clone().call(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("content-encoding").unwrap(), "gzip");
    assert_eq!(response.headers().get("x-content-type-options").unwrap(), "nosniff");
}
