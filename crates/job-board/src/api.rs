//! Composition of every backend router plus the session and version routes.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::board::{board_router, BoardRepository, JobBoardService};
use crate::http::{error_response, kind};
use crate::session::{AuthError, Caller, Credentials, SessionRegistry};
use crate::talent::{talent_router, LedgerStore, ProfileStore, TalentService};

/// Bumped whenever a route or payload changes incompatibly.
pub const PROTOCOL_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolInfo {
    pub service: String,
    pub version: String,
    pub protocol: u32,
}

impl ProtocolInfo {
    pub fn current() -> Self {
        Self {
            service: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            protocol: PROTOCOL_VERSION,
        }
    }
}

/// Services shared by the HTTP surface.
pub struct Backend<R, P, L> {
    pub registry: Arc<SessionRegistry>,
    pub board: Arc<JobBoardService<R>>,
    pub talent: Arc<TalentService<P, L>>,
}

impl<R, P, L> Clone for Backend<R, P, L> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            board: self.board.clone(),
            talent: self.talent.clone(),
        }
    }
}

/// Every `/api/v1` route with the session registry layered in for [`Caller`].
pub fn api_router<R, P, L>(backend: Backend<R, P, L>) -> Router
where
    R: BoardRepository + 'static,
    P: ProfileStore + 'static,
    L: LedgerStore + 'static,
{
    let registry = backend.registry.clone();
    Router::new()
        .route("/api/v1/version", get(version_handler))
        .merge(session_router(registry.clone(), backend.talent.clone()))
        .merge(board_router(backend.board))
        .merge(talent_router(backend.talent))
        .layer(Extension(registry))
}

struct SessionRoutes<P, L> {
    registry: Arc<SessionRegistry>,
    talent: Arc<TalentService<P, L>>,
}

impl<P, L> Clone for SessionRoutes<P, L> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            talent: self.talent.clone(),
        }
    }
}

fn session_router<P, L>(registry: Arc<SessionRegistry>, talent: Arc<TalentService<P, L>>) -> Router
where
    P: ProfileStore + 'static,
    L: LedgerStore + 'static,
{
    Router::new()
        .route("/api/v1/session", get(current_session_handler))
        .route("/api/v1/session/login", post(login_handler::<P, L>))
        .route("/api/v1/session/logout", post(logout_handler::<P, L>))
        .with_state(SessionRoutes { registry, talent })
}

pub(crate) async fn version_handler() -> Json<ProtocolInfo> {
    Json(ProtocolInfo::current())
}

async fn current_session_handler(caller: Caller) -> Response {
    Json(caller.session).into_response()
}

async fn login_handler<P, L>(
    State(routes): State<SessionRoutes<P, L>>,
    Json(credentials): Json<Credentials>,
) -> Response
where
    P: ProfileStore + 'static,
    L: LedgerStore + 'static,
{
    let issued = match routes.registry.login(credentials, Utc::now()) {
        Ok(issued) => issued,
        Err(err) => return auth_error_response(err),
    };

    if let Err(err) = routes.talent.register_session(&issued.session) {
        warn!(error = %err, principal = %issued.session.principal, "failed to open credit account");
        routes.registry.logout(&issued.token);
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, kind::INTERNAL, err.to_string());
    }

    (StatusCode::OK, Json(issued)).into_response()
}

async fn logout_handler<P, L>(State(routes): State<SessionRoutes<P, L>>, caller: Caller) -> Response
where
    P: ProfileStore + 'static,
    L: LedgerStore + 'static,
{
    routes.registry.logout(&caller.token);
    StatusCode::NO_CONTENT.into_response()
}

fn auth_error_response(err: AuthError) -> Response {
    let (status, error_kind) = match &err {
        AuthError::MissingEmail | AuthError::InvalidEmail | AuthError::RoleNotPermitted(_) => {
            (StatusCode::UNPROCESSABLE_ENTITY, kind::INVALID_REQUEST)
        }
        AuthError::AdminDisabled => (StatusCode::FORBIDDEN, kind::FORBIDDEN),
        AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, kind::UNAUTHENTICATED),
    };
    error_response(status, error_kind, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::InMemoryBoardRepository;
    use crate::config::AuthConfig;
    use crate::talent::{InMemoryLedgerStore, InMemoryProfileStore};
    use axum::body::Body;
    use axum::http::{header, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn router() -> Router {
        api_router(Backend {
            registry: Arc::new(SessionRegistry::new(&AuthConfig::default())),
            board: Arc::new(JobBoardService::new(Arc::new(InMemoryBoardRepository::default()))),
            talent: Arc::new(TalentService::new(
                Arc::new(InMemoryProfileStore::default()),
                Arc::new(InMemoryLedgerStore::new(10)),
            )),
        })
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }

    #[tokio::test]
    async fn version_reports_protocol() {
        let response = router()
            .oneshot(Request::get("/api/v1/version").body(Body::empty()).expect("request"))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["protocol"], json!(PROTOCOL_VERSION));
    }

    #[tokio::test]
    async fn employer_login_opens_account_and_logout_revokes_token() {
        let router = router();
        let login = router
            .clone()
            .oneshot(
                Request::post("/api/v1/session/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({ "email": "Hiring@Acme.io", "role": "employer" }).to_string(),
                    ))
                    .expect("request"),
            )
            .await
            .expect("route executes");
        assert_eq!(login.status(), StatusCode::OK);
        let issued = json_body(login).await;
        assert_eq!(issued["session"]["principal"], json!("hiring@acme.io"));
        let bearer = format!("Bearer {}", issued["token"].as_str().expect("token"));

        let balance = router
            .clone()
            .oneshot(
                Request::get("/api/v1/credits/balance")
                    .header(header::AUTHORIZATION, &bearer)
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("route executes");
        assert_eq!(json_body(balance).await["credits"], json!(0));

        let logout = router
            .clone()
            .oneshot(
                Request::post("/api/v1/session/logout")
                    .header(header::AUTHORIZATION, &bearer)
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("route executes");
        assert_eq!(logout.status(), StatusCode::NO_CONTENT);

        let after = router
            .oneshot(
                Request::get("/api/v1/session")
                    .header(header::AUTHORIZATION, &bearer)
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("route executes");
        assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_login_is_refused_without_configured_credentials() {
        let response = router()
            .oneshot(
                Request::post("/api/v1/session/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({ "email": "admin@jobs.example", "password": "x", "role": "admin" })
                            .to_string(),
                    ))
                    .expect("request"),
            )
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
