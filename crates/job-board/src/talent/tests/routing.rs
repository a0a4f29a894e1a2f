use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::{Extension, Router};
use chrono::Utc;
use serde_json::json;
use tower::ServiceExt;

use super::common::*;
use crate::config::{AdminCredentials, AuthConfig};
use crate::identity::Role;
use crate::session::{Credentials, Session, SessionRegistry, SessionToken};
use crate::talent::talent_router;

struct Harness {
    router: Router,
    registry: Arc<SessionRegistry>,
    service: Arc<TestService>,
}

impl Harness {
    fn new(cost: u64, credits: u64) -> Self {
        let registry = Arc::new(SessionRegistry::new(&AuthConfig {
            admin: Some(AdminCredentials {
                email: "admin@jobs.example".to_string(),
                password: "s3cret".to_string(),
            }),
        }));
        let service = seeded_service(cost, credits);
        let router = talent_router(service.clone()).layer(Extension(registry.clone()));
        Self {
            router,
            registry,
            service,
        }
    }

    fn unlock_path(&self, seeker: &Session) -> String {
        format!(
            "/api/v1/candidates/{}/unlock",
            candidate_id(&self.service, seeker)
        )
    }

    fn login(&self, email: &str, role: Role) -> SessionToken {
        let password = (role == Role::Admin).then(|| "s3cret".to_string());
        self.registry
            .login(
                Credentials {
                    email: email.to_string(),
                    password,
                    role,
                },
                Utc::now(),
            )
            .expect("login")
            .token
    }

    async fn send(&self, request: Request<Body>) -> axum::response::Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("route executes")
    }
}

fn authorized(method: &str, uri: &str, token: &SessionToken, body: Option<serde_json::Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token.as_str()));
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

#[tokio::test]
async fn unlock_route_returns_remaining_credits() {
    let harness = Harness::new(5, 10);
    let token = harness.login("hiring@acme.io", Role::Employer);

    let response = harness
        .send(authorized(
            "POST",
            &harness.unlock_path(&seeker()),
            &token,
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["remaining_credits"], json!(5));
    assert_eq!(payload["already_unlocked"], json!(false));

    let balance = harness
        .send(authorized("GET", "/api/v1/credits/balance", &token, None))
        .await;
    assert_eq!(read_json_body(balance).await["credits"], json!(5));
}

#[tokio::test]
async fn unlock_route_reports_payment_required_with_figures() {
    let harness = Harness::new(5, 3);
    let token = harness.login("hiring@acme.io", Role::Employer);

    let response = harness
        .send(authorized(
            "POST",
            &harness.unlock_path(&seeker()),
            &token,
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["kind"], json!("insufficient_credits"));
    assert_eq!(payload["balance"], json!(3));
    assert_eq!(payload["cost"], json!(5));
}

#[tokio::test]
async fn directory_route_rejects_missing_token_and_job_seekers() {
    let harness = Harness::new(5, 10);

    let anonymous = harness
        .send(
            Request::get("/api/v1/candidates")
                .body(Body::empty())
                .expect("request"),
        )
        .await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let token = harness.login("priya@example.com", Role::JobSeeker);
    let denied = harness
        .send(authorized("GET", "/api/v1/candidates", &token, None))
        .await;
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_routes_adjust_cost_and_credits() {
    let harness = Harness::new(5, 0);
    let admin = harness.login("admin@jobs.example", Role::Admin);

    let cost = harness
        .send(authorized(
            "PUT",
            "/api/v1/admin/credits/cost",
            &admin,
            Some(json!({ "cost": 10 })),
        ))
        .await;
    assert_eq!(cost.status(), StatusCode::OK);
    assert_eq!(read_json_body(cost).await["cost"], json!(10));

    let zero = harness
        .send(authorized(
            "PUT",
            "/api/v1/admin/credits/cost",
            &admin,
            Some(json!({ "cost": 0 })),
        ))
        .await;
    assert_eq!(zero.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let added = harness
        .send(authorized(
            "POST",
            "/api/v1/admin/employers/hiring@acme.io/credits/add",
            &admin,
            Some(json!({ "amount": 25 })),
        ))
        .await;
    assert_eq!(added.status(), StatusCode::OK);
    assert_eq!(read_json_body(added).await["credits"], json!(25));

    let unknown = harness
        .send(authorized(
            "POST",
            "/api/v1/admin/employers/ghost@nowhere.io/credits/add",
            &admin,
            Some(json!({ "amount": 25 })),
        ))
        .await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

    let employer = harness.login("hiring@acme.io", Role::Employer);
    let forbidden = harness
        .send(authorized("GET", "/api/v1/admin/metrics", &employer, None))
        .await;
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn export_route_serves_csv() {
    let harness = Harness::new(5, 10);
    let employer = harness.login("hiring@acme.io", Role::Employer);
    harness
        .send(authorized(
            "POST",
            &harness.unlock_path(&other_seeker()),
            &employer,
            None,
        ))
        .await;

    let admin = harness.login("admin@jobs.example", Role::Admin);
    let response = harness
        .send(authorized("GET", "/api/v1/admin/unlock-logs/export", &admin, None))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("body");
    let text = String::from_utf8(body.to_vec()).expect("utf8");
    assert!(text.contains("hiring@acme.io,arjun@example.com,5"));
}

#[tokio::test]
async fn locked_directory_json_carries_no_login_email() {
    let harness = Harness::new(5, 10);
    let employer = harness.login("hiring@acme.io", Role::Employer);
    harness
        .send(authorized("POST", &harness.unlock_path(&other_seeker()), &employer, None))
        .await;

    let response = harness
        .send(authorized("GET", "/api/v1/candidates", &employer, None))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let entries = read_json_body(response).await;
    let locked = entries
        .as_array()
        .expect("array")
        .iter()
        .find(|entry| entry["unlocked"] == json!(false))
        .expect("one locked entry")
        .to_string()
        .to_lowercase();
    assert!(!locked.contains("priya"), "{locked}");
    assert!(!locked.contains("example.com"), "{locked}");
    assert_eq!(
        entries
            .as_array()
            .expect("array")
            .iter()
            .filter(|entry| entry["unlocked"] == json!(true))
            .count(),
        1
    );
}
