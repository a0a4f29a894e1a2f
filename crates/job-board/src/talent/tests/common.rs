use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::identity::{Principal, Role};
use crate::session::Session;
use crate::talent::{
    CandidateId, ContactDetails, InMemoryLedgerStore, InMemoryProfileStore, ProfileInput, TalentService,
};

pub(super) type TestService = TalentService<InMemoryProfileStore, InMemoryLedgerStore>;

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 3, 10, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn session(email: &str, role: Role) -> Session {
    Session {
        principal: Principal::new(email),
        role,
        started_at: now(),
    }
}

pub(super) fn employer() -> Session {
    session("hiring@acme.io", Role::Employer)
}

pub(super) fn rival_employer() -> Session {
    session("talent@globex.io", Role::Employer)
}

pub(super) fn seeker() -> Session {
    session("priya@example.com", Role::JobSeeker)
}

pub(super) fn other_seeker() -> Session {
    session("arjun@example.com", Role::JobSeeker)
}

pub(super) fn admin() -> Session {
    session("admin@jobs.example", Role::Admin)
}

pub(super) fn profile_input(name: &str, role: &str, skills: &[&str]) -> ProfileInput {
    ProfileInput {
        full_name: name.to_string(),
        job_role: role.to_string(),
        bio: format!("{role} with a focus on reliability"),
        skills: skills.iter().map(|skill| skill.to_string()).collect(),
        resume: "https://cv.example/resume.pdf".to_string(),
        total_experience_years: 6,
        preferred_location: "Pune".to_string(),
        linkedin: String::new(),
        github: String::new(),
        contact: ContactDetails {
            email: "reach@example.com".to_string(),
            mobile_number: "+91 98450 00000".to_string(),
            current_or_last_company: "Initech".to_string(),
            last_drawn_salary: Some(1_800_000),
        },
    }
}

/// Service with a registered employer holding `credits`, two candidate
/// profiles, and the given unlock cost.
pub(super) fn seeded_service(cost: u64, credits: u64) -> Arc<TestService> {
    let service = Arc::new(TalentService::new(
        Arc::new(InMemoryProfileStore::default()),
        Arc::new(InMemoryLedgerStore::new(cost)),
    ));
    service
        .save_profile(
            &seeker(),
            profile_input("Priya Raman", "Backend Engineer", &["Rust", "Postgres"]),
            now(),
        )
        .expect("seeker profile");
    service
        .save_profile(
            &other_seeker(),
            profile_input("Arjun Mehta", "Data Engineer", &["Python", "rust", "Spark"]),
            now(),
        )
        .expect("second profile");
    service.register_session(&employer()).expect("employer account");
    if credits > 0 {
        service
            .add_credits(&admin(), &employer().principal, credits)
            .expect("top up");
    }
    service
}

/// Directory id assigned to `seeker`'s saved profile.
pub(super) fn candidate_id(service: &TestService, seeker: &Session) -> CandidateId {
    service
        .profile(seeker)
        .expect("profile lookup")
        .expect("profile saved")
        .id
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
