//! HTTP adapter for the backend API.

use std::time::Duration;

use axum::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::backend::{BackendError, LedgerAdminBackend, TalentBackend};
use crate::api::{ProtocolInfo, PROTOCOL_VERSION};
use crate::http::kind;
use crate::identity::Principal;
use crate::session::{Credentials, IssuedSession, Session, SessionToken};
use crate::talent::{
    BalanceView, CandidateId, CandidateUnlocks, CostView, CreditAmount, DirectoryEntry, EmployerAccount,
    UnlockReceipt,
};

const VERSION_ENDPOINT: &str = "/api/v1/version";
const LOGIN_ENDPOINT: &str = "/api/v1/session/login";
const LOGOUT_ENDPOINT: &str = "/api/v1/session/logout";
const SESSION_ENDPOINT: &str = "/api/v1/session";
const BALANCE_ENDPOINT: &str = "/api/v1/credits/balance";
const COST_ENDPOINT: &str = "/api/v1/credits/cost";
const DIRECTORY_ENDPOINT: &str = "/api/v1/candidates";
const ADMIN_COST_ENDPOINT: &str = "/api/v1/admin/credits/cost";
const UNLOCK_LOGS_ENDPOINT: &str = "/api/v1/admin/unlock-logs";
const UNLOCK_LOGS_EXPORT_ENDPOINT: &str = "/api/v1/admin/unlock-logs/export";

const REQUEST_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    kind: String,
    #[serde(default)]
    balance: u64,
    #[serde(default)]
    cost: u64,
}

/// Talks to a running API server with an optional bearer token.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    token: Option<SessionToken>,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|err| BackendError::Network(err.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn with_token(mut self, token: SessionToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fails with `Unsupported` when the server speaks another protocol version.
    pub async fn handshake(&self) -> Result<ProtocolInfo, BackendError> {
        let info: ProtocolInfo = self.send(Method::GET, VERSION_ENDPOINT, None::<&()>).await?;
        if info.protocol != PROTOCOL_VERSION {
            return Err(BackendError::Unsupported {
                operation: format!(
                    "protocol {} (client speaks {PROTOCOL_VERSION})",
                    info.protocol
                ),
            });
        }
        Ok(info)
    }

    /// Performs the handshake, then signs in and keeps the issued token.
    pub async fn login(&mut self, credentials: &Credentials) -> Result<IssuedSession, BackendError> {
        self.handshake().await?;
        let issued: IssuedSession = self
            .send(Method::POST, LOGIN_ENDPOINT, Some(credentials))
            .await?;
        self.token = Some(issued.token.clone());
        Ok(issued)
    }

    pub async fn logout(&mut self) -> Result<(), BackendError> {
        if self.token.is_none() {
            return Ok(());
        }
        let result = self
            .send_empty(Method::POST, LOGOUT_ENDPOINT, None::<&()>)
            .await;
        self.token = None;
        match result {
            Ok(()) | Err(BackendError::Unauthorized(_)) => Ok(()),
            Err(err) => Err(err),
        }
    }

    pub async fn current_session(&self) -> Result<Session, BackendError> {
        self.send(Method::GET, SESSION_ENDPOINT, None::<&()>).await
    }

    pub async fn export_unlock_logs(&self) -> Result<String, BackendError> {
        let response = self
            .request(Method::GET, UNLOCK_LOGS_EXPORT_ENDPOINT, None::<&()>)
            .send()
            .await
            .map_err(network)?;
        let response = check(response, UNLOCK_LOGS_EXPORT_ENDPOINT).await?;
        response.text().await.map_err(network)
    }

    fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method.clone(), &url);
        debug!(method = %method, url = %url, "backend request");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.as_str());
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        request
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, BackendError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .request(method, path, body)
            .send()
            .await
            .map_err(network)?;
        let response = check(response, path).await?;
        response
            .json::<T>()
            .await
            .map_err(|err| BackendError::Rejected(format!("unexpected response from {path}: {err}")))
    }

    async fn send_empty<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<(), BackendError>
    where
        B: Serialize + ?Sized,
    {
        let response = self
            .request(method, path, body)
            .send()
            .await
            .map_err(network)?;
        check(response, path).await.map(|_| ())
    }
}

fn network(err: reqwest::Error) -> BackendError {
    BackendError::Network(err.to_string())
}

async fn check(response: reqwest::Response, path: &str) -> Result<reqwest::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
    Err(classify(status, body, path))
}

/// Maps a failed response onto the client taxonomy. A bare 404, 405 or 501
/// without our error envelope means the route itself is missing.
fn classify(status: StatusCode, body: ErrorBody, path: &str) -> BackendError {
    match body.kind.as_str() {
        kind::INSUFFICIENT_CREDITS => {
            return BackendError::InsufficientCredits {
                balance: body.balance,
                cost: body.cost,
            }
        }
        kind::UNAUTHENTICATED | kind::FORBIDDEN => return BackendError::Unauthorized(body.error),
        kind::NOT_FOUND => return BackendError::NotFound(body.error),
        _ => {}
    }

    match status {
        StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED => {
            BackendError::Unsupported {
                operation: path.to_string(),
            }
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BackendError::Unauthorized(body.error),
        StatusCode::REQUEST_TIMEOUT | StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT => BackendError::Network(format!("server returned {status}")),
        _ if body.error.is_empty() => BackendError::Rejected(format!("server returned {status}")),
        _ => BackendError::Rejected(body.error),
    }
}

fn candidate_path(candidate: &CandidateId) -> String {
    format!("/api/v1/candidates/{}/unlock", path_segment(candidate.as_str()))
}

fn credits_path(employer: &Principal, action: &str) -> String {
    format!(
        "/api/v1/admin/employers/{}/credits/{action}",
        path_segment(employer.as_str())
    )
}

/// Percent-encodes one path segment so `/`, `?` or `#` inside an id cannot
/// change the route.
fn path_segment(raw: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(raw)
}

#[async_trait]
impl TalentBackend for HttpBackend {
    async fn credit_balance(&self) -> Result<u64, BackendError> {
        let balance: BalanceView = self.send(Method::GET, BALANCE_ENDPOINT, None::<&()>).await?;
        Ok(balance.credits)
    }

    async fn credit_cost(&self) -> Result<u64, BackendError> {
        let cost: CostView = self.send(Method::GET, COST_ENDPOINT, None::<&()>).await?;
        Ok(cost.cost)
    }

    async fn unlock_candidate_profile(
        &self,
        candidate: &CandidateId,
    ) -> Result<UnlockReceipt, BackendError> {
        self.send(Method::POST, &candidate_path(candidate), None::<&()>)
            .await
    }

    async fn candidate_directory(&self) -> Result<Vec<DirectoryEntry>, BackendError> {
        self.send(Method::GET, DIRECTORY_ENDPOINT, None::<&()>).await
    }
}

#[async_trait]
impl LedgerAdminBackend for HttpBackend {
    async fn set_unlock_cost(&self, cost: u64) -> Result<u64, BackendError> {
        let updated: CostView = self
            .send(Method::PUT, ADMIN_COST_ENDPOINT, Some(&CostView { cost }))
            .await?;
        Ok(updated.cost)
    }

    async fn add_credits(
        &self,
        employer: &Principal,
        amount: u64,
    ) -> Result<EmployerAccount, BackendError> {
        self.send(
            Method::POST,
            &credits_path(employer, "add"),
            Some(&CreditAmount { amount }),
        )
        .await
    }

    async fn deduct_credits(
        &self,
        employer: &Principal,
        amount: u64,
    ) -> Result<EmployerAccount, BackendError> {
        self.send(
            Method::POST,
            &credits_path(employer, "deduct"),
            Some(&CreditAmount { amount }),
        )
        .await
    }

    async fn unlock_logs(&self) -> Result<Vec<CandidateUnlocks>, BackendError> {
        self.send(Method::GET, UNLOCK_LOGS_ENDPOINT, None::<&()>).await
    }
}
