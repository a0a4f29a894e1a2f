use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{CandidateId, DirectoryFilter, ProfileInput};
use super::ledger::LedgerError;
use super::service::{TalentService, TalentServiceError};
use super::store::{LedgerStore, ProfileStore};
use crate::http::{error_response, kind};
use crate::identity::Principal;
use crate::session::Caller;
use crate::store::RepositoryError;

type SharedTalent<P, L> = State<Arc<TalentService<P, L>>>;

/// Router exposing the candidate directory, credit and admin ledger endpoints.
pub fn talent_router<P, L>(service: Arc<TalentService<P, L>>) -> Router
where
    P: ProfileStore + 'static,
    L: LedgerStore + 'static,
{
    Router::new()
        .route("/api/v1/credits/balance", get(balance_handler::<P, L>))
        .route("/api/v1/credits/cost", get(cost_handler::<P, L>))
        .route("/api/v1/candidates", get(directory_handler::<P, L>))
        .route("/api/v1/candidates/skills", get(skills_handler::<P, L>))
        .route(
            "/api/v1/candidates/:candidate_id/unlock",
            post(unlock_handler::<P, L>),
        )
        .route(
            "/api/v1/profile",
            get(profile_handler::<P, L>).put(save_profile_handler::<P, L>),
        )
        .route("/api/v1/admin/credits/cost", put(set_cost_handler::<P, L>))
        .route(
            "/api/v1/admin/employers/:principal/credits/add",
            post(add_credits_handler::<P, L>),
        )
        .route(
            "/api/v1/admin/employers/:principal/credits/deduct",
            post(deduct_credits_handler::<P, L>),
        )
        .route("/api/v1/admin/employers", get(employers_handler::<P, L>))
        .route("/api/v1/admin/jobseekers", get(jobseekers_handler::<P, L>))
        .route("/api/v1/admin/unlock-logs", get(unlock_logs_handler::<P, L>))
        .route(
            "/api/v1/admin/unlock-logs/export",
            get(export_handler::<P, L>),
        )
        .route("/api/v1/admin/metrics", get(metrics_handler::<P, L>))
        .with_state(service)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceView {
    pub credits: u64,
    pub credits_purchased: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CostView {
    pub cost: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CreditAmount {
    pub amount: u64,
}

pub(crate) async fn balance_handler<P, L>(
    State(service): SharedTalent<P, L>,
    caller: Caller,
) -> Response
where
    P: ProfileStore + 'static,
    L: LedgerStore + 'static,
{
    match service.credit_balance(&caller.session, Utc::now()) {
        Ok(account) => Json(BalanceView {
            credits: account.credits,
            credits_purchased: account.credits_purchased,
        })
        .into_response(),
        Err(err) => talent_error_response(err),
    }
}

pub(crate) async fn cost_handler<P, L>(
    State(service): SharedTalent<P, L>,
    caller: Caller,
) -> Response
where
    P: ProfileStore + 'static,
    L: LedgerStore + 'static,
{
    match service.credit_cost(&caller.session) {
        Ok(cost) => Json(CostView { cost }).into_response(),
        Err(err) => talent_error_response(err),
    }
}

pub(crate) async fn directory_handler<P, L>(
    State(service): SharedTalent<P, L>,
    caller: Caller,
    Query(filter): Query<DirectoryFilter>,
) -> Response
where
    P: ProfileStore + 'static,
    L: LedgerStore + 'static,
{
    match service.directory(&caller.session, &filter) {
        Ok(entries) => Json(entries).into_response(),
        Err(err) => talent_error_response(err),
    }
}

pub(crate) async fn skills_handler<P, L>(
    State(service): SharedTalent<P, L>,
    caller: Caller,
) -> Response
where
    P: ProfileStore + 'static,
    L: LedgerStore + 'static,
{
    match service.skills(&caller.session) {
        Ok(skills) => Json(skills).into_response(),
        Err(err) => talent_error_response(err),
    }
}

pub(crate) async fn unlock_handler<P, L>(
    State(service): SharedTalent<P, L>,
    caller: Caller,
    Path(candidate_id): Path<String>,
) -> Response
where
    P: ProfileStore + 'static,
    L: LedgerStore + 'static,
{
    let candidate = CandidateId::new(candidate_id);
    match service.unlock_candidate(&caller.session, &candidate, Utc::now()) {
        Ok(receipt) => Json(receipt).into_response(),
        Err(err) => talent_error_response(err),
    }
}

pub(crate) async fn profile_handler<P, L>(
    State(service): SharedTalent<P, L>,
    caller: Caller,
) -> Response
where
    P: ProfileStore + 'static,
    L: LedgerStore + 'static,
{
    match service.profile(&caller.session) {
        Ok(Some(profile)) => Json(profile).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, kind::NOT_FOUND, "no profile saved yet"),
        Err(err) => talent_error_response(err),
    }
}

pub(crate) async fn save_profile_handler<P, L>(
    State(service): SharedTalent<P, L>,
    caller: Caller,
    Json(input): Json<ProfileInput>,
) -> Response
where
    P: ProfileStore + 'static,
    L: LedgerStore + 'static,
{
    match service.save_profile(&caller.session, input, Utc::now()) {
        Ok(profile) => Json(profile).into_response(),
        Err(err) => talent_error_response(err),
    }
}

pub(crate) async fn set_cost_handler<P, L>(
    State(service): SharedTalent<P, L>,
    caller: Caller,
    Json(update): Json<CostView>,
) -> Response
where
    P: ProfileStore + 'static,
    L: LedgerStore + 'static,
{
    match service.set_cost(&caller.session, update.cost) {
        Ok(cost) => Json(CostView { cost }).into_response(),
        Err(err) => talent_error_response(err),
    }
}

pub(crate) async fn add_credits_handler<P, L>(
    State(service): SharedTalent<P, L>,
    caller: Caller,
    Path(principal): Path<String>,
    Json(body): Json<CreditAmount>,
) -> Response
where
    P: ProfileStore + 'static,
    L: LedgerStore + 'static,
{
    match service.add_credits(&caller.session, &Principal::new(principal), body.amount) {
        Ok(account) => Json(account).into_response(),
        Err(err) => talent_error_response(err),
    }
}

pub(crate) async fn deduct_credits_handler<P, L>(
    State(service): SharedTalent<P, L>,
    caller: Caller,
    Path(principal): Path<String>,
    Json(body): Json<CreditAmount>,
) -> Response
where
    P: ProfileStore + 'static,
    L: LedgerStore + 'static,
{
    match service.deduct_credits(&caller.session, &Principal::new(principal), body.amount) {
        Ok(account) => Json(account).into_response(),
        Err(err) => talent_error_response(err),
    }
}

pub(crate) async fn employers_handler<P, L>(
    State(service): SharedTalent<P, L>,
    caller: Caller,
) -> Response
where
    P: ProfileStore + 'static,
    L: LedgerStore + 'static,
{
    match service.employers(&caller.session) {
        Ok(accounts) => Json(accounts).into_response(),
        Err(err) => talent_error_response(err),
    }
}

pub(crate) async fn jobseekers_handler<P, L>(
    State(service): SharedTalent<P, L>,
    caller: Caller,
) -> Response
where
    P: ProfileStore + 'static,
    L: LedgerStore + 'static,
{
    match service.jobseekers(&caller.session) {
        Ok(profiles) => Json(profiles).into_response(),
        Err(err) => talent_error_response(err),
    }
}

pub(crate) async fn unlock_logs_handler<P, L>(
    State(service): SharedTalent<P, L>,
    caller: Caller,
) -> Response
where
    P: ProfileStore + 'static,
    L: LedgerStore + 'static,
{
    match service.unlock_logs(&caller.session) {
        Ok(logs) => Json(logs).into_response(),
        Err(err) => talent_error_response(err),
    }
}

pub(crate) async fn export_handler<P, L>(
    State(service): SharedTalent<P, L>,
    caller: Caller,
) -> Response
where
    P: ProfileStore + 'static,
    L: LedgerStore + 'static,
{
    match service.export_unlock_logs(&caller.session) {
        Ok(csv) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"unlock-logs.csv\"",
                ),
            ],
            csv,
        )
            .into_response(),
        Err(err) => talent_error_response(err),
    }
}

pub(crate) async fn metrics_handler<P, L>(
    State(service): SharedTalent<P, L>,
    caller: Caller,
) -> Response
where
    P: ProfileStore + 'static,
    L: LedgerStore + 'static,
{
    match service.metrics(&caller.session) {
        Ok(metrics) => Json(metrics).into_response(),
        Err(err) => talent_error_response(err),
    }
}

fn talent_error_response(err: TalentServiceError) -> Response {
    if let TalentServiceError::Ledger(LedgerError::InsufficientCredits { balance, required }) = &err {
        let payload = json!({
            "error": err.to_string(),
            "kind": kind::INSUFFICIENT_CREDITS,
            "balance": balance,
            "cost": required,
        });
        return (StatusCode::PAYMENT_REQUIRED, Json(payload)).into_response();
    }

    let (status, error_kind) = match &err {
        TalentServiceError::Forbidden(_) => (StatusCode::FORBIDDEN, kind::FORBIDDEN),
        TalentServiceError::Validation(_)
        | TalentServiceError::Ledger(LedgerError::InvalidCost)
        | TalentServiceError::Ledger(LedgerError::InvalidAmount) => {
            (StatusCode::UNPROCESSABLE_ENTITY, kind::INVALID_REQUEST)
        }
        TalentServiceError::CandidateNotFound(_)
        | TalentServiceError::Ledger(LedgerError::UnknownEmployer(_))
        | TalentServiceError::Repository(RepositoryError::NotFound)
        | TalentServiceError::Ledger(LedgerError::Repository(RepositoryError::NotFound)) => {
            (StatusCode::NOT_FOUND, kind::NOT_FOUND)
        }
        TalentServiceError::Repository(RepositoryError::Conflict)
        | TalentServiceError::Ledger(LedgerError::Repository(RepositoryError::Conflict)) => {
            (StatusCode::CONFLICT, kind::CONFLICT)
        }
        TalentServiceError::Ledger(LedgerError::InsufficientCredits { .. }) => {
            (StatusCode::PAYMENT_REQUIRED, kind::INSUFFICIENT_CREDITS)
        }
        TalentServiceError::Repository(RepositoryError::Unavailable(_))
        | TalentServiceError::Ledger(LedgerError::Repository(RepositoryError::Unavailable(_)))
        | TalentServiceError::Export(_) => (StatusCode::INTERNAL_SERVER_ERROR, kind::INTERNAL),
    };
    error_response(status, error_kind, err.to_string())
}
