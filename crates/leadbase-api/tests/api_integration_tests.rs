//! HTTP tests for the activity, auth and workspace endpoints, driven
//! through the full router over the in-memory store.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use leadbase_activity::{ActivityConfig, COOLING_PERIOD_SKIPPED};
use leadbase_api::{create_router, ApiConfig, AppState};
use leadbase_auth::{AuthService, JwtConfig};
use leadbase_db::{InMemoryStore, WorkspaceDirectory, MEMBER_STATUS_ACCEPTED};
use leadbase_types::{ActivityType, Actor, ManualClock, UserId, WorkspaceId};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const WS: WorkspaceId = WorkspaceId(42);
const BROWSER_UA: &str = "Mozilla/5.0 (X11; Linux x86_64) Firefox/131.0";

struct TestApp {
    router: Router,
    store: Arc<InMemoryStore>,
    auth: AuthService,
    owner: Actor,
}

impl TestApp {
    fn new() -> Self {
        let clock = ManualClock::new(chrono::Utc::now());
        let store = Arc::new(InMemoryStore::new(Arc::new(clock.clone())));
        let auth = AuthService::new(JwtConfig {
            secret: "api-integration-test-secret-0123456789abcdef".into(),
            ..Default::default()
        });

        let owner = Actor::new(UserId::new(), "owner@acme.io").with_name("Olive Owner");
        store.add_workspace(WS, "Acme", owner.id);

        let state = AppState::new(
            store.clone(),
            store.clone(),
            auth.resolver(),
            Arc::new(clock),
            ActivityConfig::default(),
        );
        let router = create_router(Arc::new(state), ApiConfig::default());

        Self {
            router,
            store,
            auth,
            owner,
        }
    }

    fn token(&self, actor: &Actor) -> String {
        self.auth.jwt.issue_access_token(actor).unwrap().access_token
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        (status, json_body(response).await)
    }

    async fn get(&self, uri: &str, actor: &Actor) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .uri(uri)
                .header("Authorization", format!("Bearer {}", self.token(actor)))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    async fn create(&self, actor: &Actor, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("POST")
                .uri("/api/activity-logs?action=createActivityLog")
                .header("Authorization", format!("Bearer {}", self.token(actor)))
                .header("Content-Type", "application/json")
                .header("X-Forwarded-For", "203.0.113.9, 10.0.0.1")
                .header("User-Agent", BROWSER_UA)
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    }
}

fn tag_body() -> Value {
    json!({
        "workspace_id": 42,
        "activity_type": "tag_created",
        "activity_description": "Tag \"VIP\" created by owner@acme.io",
        "member_email": "owner@acme.io",
        "metadata": {"tag_name": "VIP", "additional_info": {"tag_color": "#ff0000"}}
    })
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let app = TestApp::new();
    let (status, body) = app
        .send(
            Request::builder()
                .uri("/api/activity-logs?action=getActivityTypes")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"error": "Unauthorized"}));
}

// =============================================================================
// createActivityLog
// =============================================================================

#[tokio::test]
async fn create_stores_entry_with_origin() {
    let app = TestApp::new();
    let (status, body) = app.create(&app.owner, tag_body()).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Activity logged successfully");
    assert_eq!(body["data"]["activity_type"], "tag_created");
    assert_eq!(body["data"]["user_id"], app.owner.id.to_string());
    assert_eq!(body["data"]["ip_address"], "203.0.113.9");
    assert_eq!(body["data"]["user_agent"], BROWSER_UA);
    assert_eq!(body["data"]["metadata"]["additional_info"]["tag_color"], "#ff0000");
    assert_eq!(app.store.entries().len(), 1);
}

#[tokio::test]
async fn repeated_login_is_skipped_with_created_status() {
    let app = TestApp::new();
    let login = json!({
        "workspace_id": "42",
        "activity_type": "login",
        "activity_description": "owner@acme.io logged into the workspace",
        "member_email": "owner@acme.io"
    });

    let (first, _) = app.create(&app.owner, login.clone()).await;
    let (second, body) = app.create(&app.owner, login).await;

    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(second, StatusCode::CREATED);
    assert_eq!(body, json!({"message": COOLING_PERIOD_SKIPPED}));
    assert_eq!(app.store.count_of(WS, ActivityType::Login), 1);
}

#[tokio::test]
async fn create_rejects_unknown_type_without_writing() {
    let app = TestApp::new();
    let mut body = tag_body();
    body["activity_type"] = json!("not_a_real_type");

    let (status, body) = app.create(&app.owner, body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Invalid activity type"}));
    assert!(app.store.entries().is_empty());
}

#[tokio::test]
async fn create_requires_fields() {
    let app = TestApp::new();
    let (status, body) = app
        .create(&app.owner, json!({"workspace_id": 42, "activity_type": "login"}))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Missing required fields: workspace_id, activity_type, activity_description, and member_email are required"
    );
}

#[tokio::test]
async fn create_rejects_non_numeric_workspace() {
    let app = TestApp::new();
    let mut body = tag_body();
    body["workspace_id"] = json!("acme");

    let (status, body) = app.create(&app.owner, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid workspace_id format");
}

#[tokio::test]
async fn create_in_foreign_workspace_is_forbidden() {
    let app = TestApp::new();
    let stranger = Actor::new(UserId::new(), "stranger@else.io");

    let (status, body) = app.create(&stranger, tag_body()).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "You don't have access to this workspace");
    assert!(app.store.entries().is_empty());
}

#[tokio::test]
async fn create_store_failure_is_server_error() {
    let app = TestApp::new();
    app.store.fail_inserts(true);

    let (status, body) = app.create(&app.owner, tag_body()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}

// =============================================================================
// Reads
// =============================================================================

#[tokio::test]
async fn list_with_maximal_offset_returns_empty_page() {
    let app = TestApp::new();
    app.create(&app.owner, tag_body()).await;

    let (status, body) = app
        .get(
            "/api/activity-logs?action=getActivityLogs&workspace_id=42&offset=9223372036854775807",
            &app.owner,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["total"], 1);
    assert_eq!(body["offset"], i64::MAX);
    assert_eq!(body["has_more"], false);
}

#[tokio::test]
async fn list_clamps_limit_and_filters() {
    let app = TestApp::new();
    app.create(&app.owner, tag_body()).await;
    let mut other = tag_body();
    other["activity_type"] = json!("lead_updated");
    other["activity_description"] = json!("owner@acme.io updated lead: Jane");
    other["metadata"] = json!({"lead_name": "Jane"});
    app.create(&app.owner, other).await;

    let (status, body) = app
        .get(
            "/api/activity-logs?action=getActivityLogs&workspace_id=42&limit=500&search=TAG",
            &app.owner,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["limit"], 100);
    assert_eq!(body["offset"], 0);
    assert_eq!(body["total"], 1);
    assert_eq!(body["has_more"], false);
    assert_eq!(body["data"][0]["activity_type"], "tag_created");

    let (_, by_type) = app
        .get(
            "/api/activity-logs?action=getActivityLogs&workspace_id=42&activity_type=lead_updated&limit=abc",
            &app.owner,
        )
        .await;
    assert_eq!(by_type["limit"], 50);
    assert_eq!(by_type["total"], 1);
}

#[tokio::test]
async fn list_requires_workspace() {
    let app = TestApp::new();
    let (status, body) = app
        .get("/api/activity-logs?action=getActivityLogs", &app.owner)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "workspace_id is required");
}

#[tokio::test]
async fn reads_are_gated_by_membership() {
    let app = TestApp::new();
    let pending = Actor::new(UserId::new(), "pending@acme.io");
    let member = Actor::new(UserId::new(), "member@acme.io");
    app.store.add_member(WS, pending.id, "member", "pending");
    app.store
        .add_member(WS, member.id, "member", MEMBER_STATUS_ACCEPTED);

    let uri = "/api/activity-logs?action=getActivityLogStats&workspace_id=42";
    let (denied, body) = app.get(uri, &pending).await;
    let (allowed, _) = app.get(uri, &member).await;

    assert_eq!(denied, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "You don't have access to this workspace");
    assert_eq!(allowed, StatusCode::OK);
}

#[tokio::test]
async fn stats_report_counts() {
    let app = TestApp::new();
    app.create(&app.owner, tag_body()).await;
    app.create(&app.owner, tag_body()).await;

    let (status, body) = app
        .get(
            "/api/activity-logs?action=getActivityLogStats&workspace_id=42",
            &app.owner,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_activities"], 2);
    assert_eq!(body["activities_today"], 2);
    assert_eq!(body["most_active_members"][0]["member_email"], "owner@acme.io");
    assert_eq!(body["most_active_members"][0]["activity_count"], 2);
    assert_eq!(
        body["activity_breakdown"],
        json!([{"activity_type": "tag_created", "count": 2}])
    );
}

#[tokio::test]
async fn stats_store_failure_is_server_error() {
    let app = TestApp::new();
    app.store.fail_reads(true);

    let (status, _) = app
        .get(
            "/api/activity-logs?action=getActivityLogStats&workspace_id=42",
            &app.owner,
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn types_lists_the_registry() {
    let app = TestApp::new();
    let (status, body) = app
        .get("/api/activity-logs?action=getActivityTypes", &app.owner)
        .await;

    assert_eq!(status, StatusCode::OK);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), ActivityType::ALL.len());
    assert!(data.contains(&json!({"value": "lead_status_changed", "label": "Lead Status Changed"})));
}

#[tokio::test]
async fn unknown_action_and_method() {
    let app = TestApp::new();
    let (status, body) = app
        .get("/api/activity-logs?action=dance", &app.owner)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unknown action: dance");

    let (status, body) = app
        .send(
            Request::builder()
                .method("DELETE")
                .uri("/api/activity-logs?action=getActivityLogs")
                .header("Authorization", format!("Bearer {}", app.token(&app.owner)))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "Method not allowed");
}

// =============================================================================
// Sign-out
// =============================================================================

#[tokio::test]
async fn signout_logs_logout_and_revokes_token() {
    let app = TestApp::new();
    let member = Actor::new(UserId::new(), "member@acme.io");
    app.store
        .add_member(WS, member.id, "member", MEMBER_STATUS_ACCEPTED);
    app.store.activate_membership(member.id, WS).await.unwrap();
    let token = app.token(&member);

    let signout = || {
        Request::builder()
            .method("POST")
            .uri("/api/auth?action=signout")
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    };

    let (status, body) = app.send(signout()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out successfully");

    let logouts: Vec<_> = app
        .store
        .entries()
        .into_iter()
        .filter(|e| e.activity_type == ActivityType::Logout)
        .collect();
    assert_eq!(logouts.len(), 1);
    assert_eq!(logouts[0].user_id, member.id);
    assert_eq!(
        logouts[0].metadata.as_ref().unwrap().get_str("workspace_name"),
        Some("Acme")
    );

    let (status, _) = app.send(signout()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn signout_succeeds_when_logging_fails() {
    let app = TestApp::new();
    let member = Actor::new(UserId::new(), "member@acme.io");
    app.store
        .add_member(WS, member.id, "member", MEMBER_STATUS_ACCEPTED);
    app.store.activate_membership(member.id, WS).await.unwrap();
    app.store.fail_inserts(true);

    let (status, _) = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/api/auth?action=signout")
                .header("Authorization", format!("Bearer {}", app.token(&member)))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(app.store.entries().is_empty());
}

#[tokio::test]
async fn signout_without_workspace_skips_logging() {
    let app = TestApp::new();
    let loner = Actor::new(UserId::new(), "loner@else.io");

    let (status, _) = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/api/auth?action=signout")
                .header("Authorization", format!("Bearer {}", app.token(&loner)))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(app.store.entries().is_empty());
}

// =============================================================================
// Active workspace
// =============================================================================

async fn active_workspace(app: &TestApp, actor: &Actor, user_agent: &str) -> (StatusCode, Value) {
    app.send(
        Request::builder()
            .uri("/api/workspace?action=getActiveWorkspace")
            .header("Authorization", format!("Bearer {}", app.token(actor)))
            .header("X-Fresh-Login", "true")
            .header("User-Agent", user_agent)
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

#[tokio::test]
async fn first_activation_records_workspace_join() {
    let app = TestApp::new();
    let member = Actor::new(UserId::new(), "member@acme.io");
    app.store.add_member(WS, member.id, "admin", MEMBER_STATUS_ACCEPTED);

    let (status, body) = active_workspace(&app, &member, BROWSER_UA).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!({"id": 42, "name": "Acme", "role": "admin", "is_active": true})
    );
    let joins = app.store.count_of(WS, ActivityType::WorkspaceJoin);
    assert_eq!(joins, 1);
    assert_eq!(app.store.count_of(WS, ActivityType::Login), 0);
}

#[tokio::test]
async fn fresh_browser_login_is_recorded_once() {
    let app = TestApp::new();
    let member = Actor::new(UserId::new(), "member@acme.io");
    app.store
        .add_member(WS, member.id, "member", MEMBER_STATUS_ACCEPTED);
    app.store.activate_membership(member.id, WS).await.unwrap();

    active_workspace(&app, &member, "axios/1.7.2").await;
    assert_eq!(app.store.count_of(WS, ActivityType::Login), 0);

    active_workspace(&app, &member, BROWSER_UA).await;
    active_workspace(&app, &member, BROWSER_UA).await;
    assert_eq!(app.store.count_of(WS, ActivityType::Login), 1);
}

#[tokio::test]
async fn no_membership_is_not_found() {
    let app = TestApp::new();
    let loner = Actor::new(UserId::new(), "loner@else.io");

    let (status, body) = active_workspace(&app, &loner, BROWSER_UA).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "No workspaces found"}));
}

// =============================================================================
// Service routes
// =============================================================================

#[tokio::test]
async fn health_and_readiness() {
    let app = TestApp::new();
    let get = |uri: &str| Request::builder().uri(uri).body(Body::empty()).unwrap();

    let (status, body) = app.send(get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = app.send(get("/ready")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");

    app.store.fail_reads(true);
    let (status, body) = app.send(get("/ready")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["database"]["status"], "unhealthy");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::new();
    let (status, body) = app
        .send(
            Request::builder()
                .uri("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], "Leadbase Activity API");
}
