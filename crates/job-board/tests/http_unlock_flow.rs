//! The unlock flow driven through the HTTP client against a live server.

mod common {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use axum::Router;
    use chrono::Utc;

    use job_board::api::{api_router, Backend};
    use job_board::board::{InMemoryBoardRepository, JobBoardService};
    use job_board::config::{AdminCredentials, AuthConfig};
    use job_board::identity::Role;
    use job_board::session::{Credentials, SessionRegistry};
    use job_board::talent::{
        CandidateId, ContactDetails, InMemoryLedgerStore, InMemoryProfileStore, ProfileInput, TalentService,
    };
    use job_board::unlock::HttpBackend;

    pub(super) const ADMIN_EMAIL: &str = "admin@jobs.example";
    pub(super) const ADMIN_PASSWORD: &str = "correct horse";

    pub(super) type Stores = Backend<InMemoryBoardRepository, InMemoryProfileStore, InMemoryLedgerStore>;

    pub(super) fn backend(cost: u64) -> Stores {
        let auth = AuthConfig {
            admin: Some(AdminCredentials {
                email: ADMIN_EMAIL.to_string(),
                password: ADMIN_PASSWORD.to_string(),
            }),
        };
        Backend {
            registry: Arc::new(SessionRegistry::new(&auth)),
            board: Arc::new(JobBoardService::new(Arc::new(
                InMemoryBoardRepository::default(),
            ))),
            talent: Arc::new(TalentService::new(
                Arc::new(InMemoryProfileStore::default()),
                Arc::new(InMemoryLedgerStore::new(cost)),
            )),
        }
    }

    pub(super) fn seed_candidate(stores: &Stores, email: &str, name: &str) -> CandidateId {
        let issued = stores
            .registry
            .login(
                Credentials {
                    email: email.to_string(),
                    password: None,
                    role: Role::JobSeeker,
                },
                Utc::now(),
            )
            .expect("seeker login");
        stores
            .talent
            .save_profile(
                &issued.session,
                ProfileInput {
                    full_name: name.to_string(),
                    job_role: "Backend Engineer".to_string(),
                    skills: vec!["Rust".to_string()],
                    contact: ContactDetails {
                        email: email.to_string(),
                        mobile_number: "+91 90000 00000".to_string(),
                        ..ContactDetails::default()
                    },
                    ..ProfileInput::default()
                },
                Utc::now(),
            )
            .expect("profile saved")
            .id
    }

    pub(super) async fn serve(router: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("server runs");
        });
        addr
    }

    pub(super) async fn start(cost: u64) -> (Stores, String) {
        let stores = backend(cost);
        let addr = serve(api_router(stores.clone())).await;
        (stores, format!("http://{addr}"))
    }

    pub(super) async fn client(base_url: &str, email: &str, role: Role) -> HttpBackend {
        let mut backend = HttpBackend::new(base_url).expect("client builds");
        let password = (role == Role::Admin).then(|| ADMIN_PASSWORD.to_string());
        backend
            .login(&Credentials {
                email: email.to_string(),
                password,
                role,
            })
            .await
            .expect("login over http");
        backend
    }
}

use axum::routing::get;
use axum::Router;
use common::*;
use job_board::api::ProtocolInfo;
use job_board::identity::{Principal, Role};
use job_board::unlock::{
    BackendError, HttpBackend, LedgerAdminBackend, TalentBackend, UnlockFailure, UnlockOutcome, UnlockPrompt,
    UnlockWorkflow, UNAVAILABLE_MESSAGE,
};

#[tokio::test]
async fn employer_unlocks_candidate_over_http() {
    let (stores, base_url) = start(5).await;
    let candidate = seed_candidate(&stores, "priya@example.com", "Priya Raman");

    let employer = client(&base_url, "hiring@acme.io", Role::Employer).await;
    let admin = client(&base_url, ADMIN_EMAIL, Role::Admin).await;
    let account = admin
        .add_credits(&Principal::new("hiring@acme.io"), 10)
        .await
        .expect("credits added");
    assert_eq!(account.credits, 10);

    let session = employer.current_session().await.expect("session");
    let mut workflow = UnlockWorkflow::new(employer, Some(&session)).expect("workflow");
    workflow.refresh().await.expect("refresh");
    assert_eq!(workflow.balance(), Some(10));
    let locked = workflow.view(&candidate).expect("listed");
    assert!(locked.full_name.is_none());
    let locked_json = serde_json::to_string(&locked).expect("card json");
    assert!(!locked_json.contains("priya@example.com"), "{locked_json}");

    match workflow.request_unlock(&candidate).await.expect("prompt") {
        UnlockPrompt::Confirm(confirmation) => {
            assert_eq!((confirmation.cost, confirmation.balance), (5, 10));
        }
        other => panic!("expected confirmation, got {other:?}"),
    }
    let outcome = workflow.confirm_unlock(&candidate).await.expect("unlock");
    assert_eq!(outcome, UnlockOutcome::Unlocked { remaining_credits: 5 });

    let card = workflow.view(&candidate).expect("listed");
    assert_eq!(card.full_name.as_deref(), Some("Priya Raman"));
    assert_eq!(
        card.contact.map(|contact| contact.mobile_number),
        Some("+91 90000 00000".to_string())
    );

    let logs = admin.unlock_logs().await.expect("logs");
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].records[0].credits_used, 5);
    let csv = admin.export_unlock_logs().await.expect("csv");
    assert!(csv.contains("hiring@acme.io,priya@example.com,5"));
}

#[tokio::test]
async fn server_side_balance_check_maps_to_insufficient_credits() {
    let (stores, base_url) = start(5).await;
    let candidate = seed_candidate(&stores, "priya@example.com", "Priya Raman");
    let employer = client(&base_url, "hiring@acme.io", Role::Employer).await;
    let admin = client(&base_url, ADMIN_EMAIL, Role::Admin).await;
    admin
        .add_credits(&Principal::new("hiring@acme.io"), 4)
        .await
        .expect("credits added");
    let account = admin
        .deduct_credits(&Principal::new("hiring@acme.io"), 1)
        .await
        .expect("credits deducted");
    assert_eq!((account.credits, account.credits_purchased), (3, 4));

    let err = employer
        .unlock_candidate_profile(&candidate)
        .await
        .expect_err("insufficient");
    assert_eq!(err, BackendError::InsufficientCredits { balance: 3, cost: 5 });
    assert_eq!(employer.credit_balance().await.expect("balance"), 3);
}

#[tokio::test]
async fn job_seeker_is_turned_away_by_gate_and_server() {
    let (stores, base_url) = start(5).await;
    seed_candidate(&stores, "arjun@example.com", "Arjun Mehta");
    let seeker = client(&base_url, "priya@example.com", Role::JobSeeker).await;

    let err = seeker.candidate_directory().await.expect_err("forbidden");
    assert!(matches!(err, BackendError::Unauthorized(_)));

    let session = seeker.current_session().await.expect("session");
    let denied = UnlockWorkflow::new(seeker, Some(&session))
        .err()
        .expect("workflow denied");
    assert_eq!(
        denied.failure().and_then(UnlockFailure::redirect),
        Some("/login")
    );
}

#[tokio::test]
async fn missing_routes_surface_as_temporarily_unavailable() {
    let router = Router::new().route(
        "/api/v1/version",
        get(|| async { axum::Json(ProtocolInfo::current()) }),
    );
    let addr = serve(router).await;
    let backend = HttpBackend::new(format!("http://{addr}")).expect("client");
    backend.handshake().await.expect("same protocol");

    let err = backend.credit_cost().await.expect_err("route missing");
    assert!(matches!(err, BackendError::Unsupported { .. }));
    assert_eq!(UnlockFailure::from(err).user_message(), UNAVAILABLE_MESSAGE);
}

#[tokio::test]
async fn mismatched_protocol_is_refused_at_handshake() {
    let router = Router::new().route(
        "/api/v1/version",
        get(|| async {
            let mut info = ProtocolInfo::current();
            info.protocol += 1;
            axum::Json(info)
        }),
    );
    let addr = serve(router).await;
    let backend = HttpBackend::new(format!("http://{addr}")).expect("client");
    assert!(matches!(
        backend.handshake().await,
        Err(BackendError::Unsupported { .. })
    ));
}

#[tokio::test]
async fn logout_revokes_the_token() {
    let (_stores, base_url) = start(5).await;
    let mut employer = client(&base_url, "hiring@acme.io", Role::Employer).await;
    let stale = employer.clone();
    employer.logout().await.expect("logout");

    assert!(matches!(
        stale.current_session().await,
        Err(BackendError::Unauthorized(_))
    ));
}
