use crate::client::print_card;
use crate::infra::{memory_backend, MemoryBackend};
use chrono::Utc;
use clap::Args;
use job_board::board::{ApplicationInput, ApplicationStatus, JobDraft, JobFilter};
use job_board::config::{AdminCredentials, AuthConfig, LedgerConfig};
use job_board::error::AppError;
use job_board::identity::Role;
use job_board::session::{Credentials, Session};
use job_board::talent::{ContactDetails, ProfileInput};
use job_board::unlock::{
    LedgerAdminBackend, LocalBackend, UnlockOutcome, UnlockPrompt, UnlockWorkflow,
};
use std::fmt::Display;

const DEMO_ADMIN_EMAIL: &str = "admin@demo.local";
const DEMO_ADMIN_PASSWORD: &str = "demo-only";

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Credits granted to the demo employer
    #[arg(long, default_value_t = 10)]
    pub(crate) credits: u64,
    /// Credits charged per unlock
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    pub(crate) cost: u64,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { credits, cost } = args;
    let auth = AuthConfig {
        admin: Some(AdminCredentials {
            email: DEMO_ADMIN_EMAIL.to_string(),
            password: DEMO_ADMIN_PASSWORD.to_string(),
        }),
    };
    let backend = memory_backend(&auth, LedgerConfig { unlock_cost: cost });

    println!("Job board demo");
    let employer = sign_in(&backend, "hiring@acme.io", Role::Employer, None);
    let seeker = sign_in(&backend, "priya@example.com", Role::JobSeeker, None);
    let admin = sign_in(&backend, DEMO_ADMIN_EMAIL, Role::Admin, Some(DEMO_ADMIN_PASSWORD));
    let (Some(employer), Some(seeker), Some(admin)) = (employer, seeker, admin) else {
        return Ok(());
    };

    println!("\nPosting and applying");
    let now = Utc::now();
    let job = report(
        "post job",
        backend.board.create_job(
            &employer,
            JobDraft {
                title: "Senior Rust Engineer".to_string(),
                company: "Acme".to_string(),
                location: "Bengaluru".to_string(),
                salary: Some(2_400_000),
                description: "Own the settlement pipeline end to end.".to_string(),
                requirements: vec!["5+ years of systems work".to_string()],
            },
            now,
        ),
    );
    if let Some(job) = job {
        println!("  posted #{} {} at {}", job.id, job.title, job.company);
        let listed = backend
            .board
            .jobs(&JobFilter {
                keyword: Some("rust".to_string()),
                location: None,
            })
            .map(|jobs| jobs.len())
            .unwrap_or_default();
        println!("  jobs matching 'rust': {listed}");

        let application = report(
            "apply",
            backend.board.apply(
                &seeker,
                ApplicationInput {
                    job_id: job.id,
                    cover_letter: "I have shipped three ledgers.".to_string(),
                },
                now,
            ),
        );
        if let Some(application) = application {
            let updated = report(
                "move to interview",
                backend.board.update_application_status(
                    &employer,
                    application.id,
                    ApplicationStatus::Interview,
                ),
            );
            if let Some(updated) = updated {
                println!("  application #{} -> {}", updated.id, updated.status.label());
            }
        }
    }

    let profile = report(
        "save profile",
        backend.talent.save_profile(
            &seeker,
            ProfileInput {
                full_name: "Priya Raman".to_string(),
                job_role: "Backend Engineer".to_string(),
                bio: "Payments and ledgers in Rust".to_string(),
                skills: vec!["Rust".to_string(), "Postgres".to_string()],
                total_experience_years: 6,
                preferred_location: "Bengaluru".to_string(),
                contact: ContactDetails {
                    email: "priya@example.com".to_string(),
                    mobile_number: "+91 98450 00000".to_string(),
                    current_or_last_company: "Initech".to_string(),
                    last_drawn_salary: Some(1_800_000),
                },
                ..ProfileInput::default()
            },
            now,
        ),
    );

    println!("\nCredits");
    let admin_backend = LocalBackend::new(backend.talent.clone(), admin);
    if credits > 0 {
        match admin_backend.add_credits(&employer.principal, credits).await {
            Ok(account) => println!("  {} now holds {} credits", account.employer, account.credits),
            Err(err) => println!("  add credits failed: {err}"),
        }
    }

    println!("\nUnlocking a candidate");
    let Some(candidate) = profile.map(|profile| profile.id) else {
        println!("  no saved profile to unlock");
        return Ok(());
    };
    let mut workflow = UnlockWorkflow::new(
        LocalBackend::new(backend.talent.clone(), employer.clone()),
        Some(&employer),
    )?;
    workflow.refresh().await?;
    for card in workflow.cards() {
        println!(
            "  {} | {} | {}",
            card.candidate,
            card.job_role,
            card.full_name.as_deref().unwrap_or("(locked)")
        );
    }

    if let UnlockPrompt::Confirm(confirmation) = workflow.request_unlock(&candidate).await? {
        println!(
            "  confirm: cost {} credits, balance {} credits",
            confirmation.cost, confirmation.balance
        );
    }
    match workflow.confirm_unlock(&candidate).await {
        Ok(UnlockOutcome::Unlocked { remaining_credits }) => {
            println!("  unlocked; remaining credits {remaining_credits}");
        }
        Ok(UnlockOutcome::AlreadyUnlocked) => println!("  already unlocked"),
        Err(err) => {
            let message = err
                .failure()
                .map(|failure| failure.user_message())
                .unwrap_or_else(|| err.to_string());
            println!("  unlock refused: {message}");
            workflow.cancel(&candidate)?;
        }
    }
    print_card(workflow.view(&candidate));

    println!("\nAdmin view");
    for group in admin_backend.unlock_logs().await? {
        println!(
            "  {} unlocked by {} employer(s)",
            group.candidate,
            group.records.len()
        );
    }
    Ok(())
}

fn sign_in(
    backend: &MemoryBackend,
    email: &str,
    role: Role,
    password: Option<&str>,
) -> Option<Session> {
    let issued = report(
        "sign in",
        backend.registry.login(
            Credentials {
                email: email.to_string(),
                password: password.map(str::to_string),
                role,
            },
            Utc::now(),
        ),
    )?;
    report("open account", backend.talent.register_session(&issued.session))?;
    println!("  {} signed in as {}", issued.session.principal, role.label());
    Some(issued.session)
}

fn report<T, E: Display>(step: &str, result: Result<T, E>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            println!("  {step} failed: {err}");
            None
        }
    }
}
