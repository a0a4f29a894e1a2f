//! Command line client commands talking to a running API.

use clap::{Args, Subcommand};
use job_board::access::{ADMIN_ONLY, DIRECTORY_READERS};
use job_board::config::AppConfig;
use job_board::error::AppError;
use job_board::identity::{Principal, Role};
use job_board::session::{Credentials, SessionContext, StoredSession};
use job_board::talent::{CandidateId, DirectoryEntry, DirectoryFilter, EmployerAccount};
use job_board::telemetry;
use job_board::unlock::{
    BackendError, CandidateCard, HttpBackend, LedgerAdminBackend, TalentBackend, UnlockOutcome,
    UnlockPrompt, UnlockWorkflow, INSUFFICIENT_CREDITS_MESSAGE,
};
use std::io::{self, BufRead, Write};
use tracing::warn;

#[derive(Args, Debug)]
pub(crate) struct LoginArgs {
    /// E-mail address to sign in with
    #[arg(long)]
    pub(crate) email: String,
    /// Role to sign in as: jobseeker, employer or admin
    #[arg(long, value_parser = parse_role)]
    pub(crate) role: Role,
    /// Password, required for admin sign-in
    #[arg(long)]
    pub(crate) password: Option<String>,
    /// API base URL (defaults to APP_API_URL)
    #[arg(long)]
    pub(crate) api_url: Option<String>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CandidatesArgs {
    /// Match bio or job role (and name, once unlocked)
    #[arg(long)]
    pub(crate) keyword: Option<String>,
    /// Match a skill
    #[arg(long)]
    pub(crate) skill: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct UnlockArgs {
    /// Candidate id as listed by `candidates`
    pub(crate) candidate: String,
    /// Skip the confirmation prompt
    #[arg(long)]
    pub(crate) yes: bool,
}

#[derive(Subcommand, Debug)]
pub(crate) enum AdminCommand {
    /// Set the credits charged per unlock
    SetCost {
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        cost: u64,
    },
    /// Add purchased credits to an employer
    AddCredits { employer: String, amount: u64 },
    /// Remove credits from an employer
    DeductCredits { employer: String, amount: u64 },
    /// Show unlock history grouped by candidate
    Logs {
        /// Print the log as CSV
        #[arg(long)]
        csv: bool,
    },
}

fn parse_role(raw: &str) -> Result<Role, String> {
    match Role::parse(raw) {
        Some(Role::Guest) | None => Err(format!(
            "unknown role '{raw}' (expected jobseeker, employer or admin)"
        )),
        Some(role) => Ok(role),
    }
}

fn client_context() -> Result<(AppConfig, SessionContext), AppError> {
    let config = AppConfig::load()?;
    telemetry::init_client(&config.telemetry)?;
    let context = SessionContext::load(&config.client.session_file)?;
    Ok((config, context))
}

fn signed_in(context: &SessionContext) -> Result<(HttpBackend, &StoredSession), AppError> {
    let stored = context.current().ok_or(AppError::NotSignedIn)?;
    let backend = HttpBackend::new(stored.api_url.as_str())?.with_token(stored.token.clone());
    Ok((backend, stored))
}

pub(crate) async fn login(args: LoginArgs) -> Result<(), AppError> {
    let (config, mut context) = client_context()?;

    if let Some(previous) = context.current() {
        let mut stale = HttpBackend::new(previous.api_url.as_str())?.with_token(previous.token.clone());
        if let Err(err) = stale.logout().await {
            warn!(error = %err, "could not end previous session");
        }
        context.clear()?;
    }

    let api_url = args.api_url.unwrap_or(config.client.api_url);
    let mut backend = HttpBackend::new(api_url.as_str())?;
    let issued = backend
        .login(&Credentials {
            email: args.email,
            password: args.password,
            role: args.role,
        })
        .await?;

    println!(
        "Signed in as {} ({})",
        issued.session.principal,
        issued.session.role.label()
    );
    context.begin(StoredSession {
        api_url: backend.base_url().to_string(),
        token: issued.token,
        session: issued.session,
    })?;
    Ok(())
}

pub(crate) async fn logout() -> Result<(), AppError> {
    let (_, mut context) = client_context()?;
    let result = match context.current() {
        Some(_) => {
            let (mut backend, _) = signed_in(&context)?;
            backend.logout().await
        }
        None => Ok(()),
    };
    let ended = context.clear()?;
    result?;

    match ended {
        Some(stored) => println!("Signed out {}", stored.session.principal),
        None => println!("No stored session"),
    }
    Ok(())
}

pub(crate) async fn candidates(args: CandidatesArgs) -> Result<(), AppError> {
    let (_, context) = client_context()?;
    let (backend, stored) = signed_in(&context)?;
    DIRECTORY_READERS
        .authorize(&stored.session)
        .map_err(|denied| BackendError::Unauthorized(denied.to_string()))?;

    if stored.session.role == Role::Employer {
        let balance = backend.credit_balance().await?;
        let cost = backend.credit_cost().await?;
        println!("Balance: {balance} credits | Unlock cost: {cost} credits");
    }

    let filter = DirectoryFilter {
        keyword: args.keyword,
        skill: args.skill,
    };
    let entries: Vec<DirectoryEntry> = backend
        .candidate_directory()
        .await?
        .into_iter()
        .filter(|entry| filter.matches(entry))
        .collect();

    if entries.is_empty() {
        println!("No candidates match.");
    }
    for entry in &entries {
        let name = entry.full_name.as_deref().unwrap_or("(locked)");
        println!(
            "- {:<32} {:<24} {:>2}y  {}  [{}]",
            entry.candidate,
            entry.job_role,
            entry.total_experience_years,
            name,
            entry.skills.join(", ")
        );
    }
    Ok(())
}

pub(crate) async fn unlock(args: UnlockArgs) -> Result<(), AppError> {
    let (_, context) = client_context()?;
    let (backend, _) = signed_in(&context)?;
    let mut workflow = UnlockWorkflow::new(backend, context.session())?;
    workflow.refresh().await?;

    let candidate = CandidateId::new(&args.candidate);
    match workflow.request_unlock(&candidate).await? {
        UnlockPrompt::AlreadyUnlocked => {
            println!("{candidate} is already unlocked.");
            print_card(workflow.view(&candidate));
            return Ok(());
        }
        UnlockPrompt::Confirm(confirmation) => {
            println!(
                "Unlock {} for {} credits? Current balance: {} credits.",
                candidate, confirmation.cost, confirmation.balance
            );
            if !confirmation.can_confirm {
                println!("{INSUFFICIENT_CREDITS_MESSAGE}");
                workflow.cancel(&candidate)?;
                return Ok(());
            }
            if !args.yes && !ask_confirmation()? {
                workflow.cancel(&candidate)?;
                println!("Cancelled.");
                return Ok(());
            }
        }
    }

    match workflow.confirm_unlock(&candidate).await? {
        UnlockOutcome::Unlocked { remaining_credits } => {
            println!("Unlocked. Remaining credits: {remaining_credits}");
        }
        UnlockOutcome::AlreadyUnlocked => println!("{candidate} was already unlocked."),
    }
    print_card(workflow.view(&candidate));
    Ok(())
}

pub(crate) async fn admin(command: AdminCommand) -> Result<(), AppError> {
    let (_, context) = client_context()?;
    let (backend, stored) = signed_in(&context)?;
    ADMIN_ONLY
        .authorize(&stored.session)
        .map_err(|denied| BackendError::Unauthorized(denied.to_string()))?;

    match command {
        AdminCommand::SetCost { cost } => {
            let cost = backend.set_unlock_cost(cost).await?;
            println!("Unlock cost is now {cost} credits");
        }
        AdminCommand::AddCredits { employer, amount } => {
            let account = backend.add_credits(&Principal::new(employer), amount).await?;
            print_account(&account);
        }
        AdminCommand::DeductCredits { employer, amount } => {
            let account = backend
                .deduct_credits(&Principal::new(employer), amount)
                .await?;
            print_account(&account);
        }
        AdminCommand::Logs { csv: true } => {
            print!("{}", backend.export_unlock_logs().await?);
        }
        AdminCommand::Logs { csv: false } => {
            let logs = backend.unlock_logs().await?;
            if logs.is_empty() {
                println!("No unlocks recorded.");
            }
            for group in logs {
                println!(
                    "{} ({})",
                    group.full_name.as_deref().unwrap_or("unnamed"),
                    group.candidate
                );
                for record in group.records {
                    println!(
                        "    {}  {:<32} {} credits",
                        record.unlocked_at.format("%Y-%m-%d %H:%M"),
                        record.employer.abbreviated(32),
                        record.credits_used
                    );
                }
            }
        }
    }
    Ok(())
}

fn ask_confirmation() -> Result<bool, AppError> {
    print!("Confirm unlock? [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn print_account(account: &EmployerAccount) {
    println!(
        "{}: {} credits (lifetime purchased {})",
        account.employer, account.credits, account.credits_purchased
    );
}

pub(crate) fn print_card(card: Option<CandidateCard>) {
    let Some(card) = card else {
        return;
    };
    println!("  Candidate: {}", card.candidate);
    println!("  Role:      {} ({}y)", card.job_role, card.total_experience_years);
    println!("  Skills:    {}", card.skills.join(", "));
    println!("  State:     {}", card.state);
    if let Some(name) = &card.full_name {
        println!("  Name:      {name}");
    }
    if let Some(contact) = &card.contact {
        println!("  Email:     {}", contact.email);
        if !contact.mobile_number.is_empty() {
            println!("  Mobile:    {}", contact.mobile_number);
        }
        if !contact.current_or_last_company.is_empty() {
            println!("  Company:   {}", contact.current_or_last_company);
        }
        if let Some(salary) = contact.last_drawn_salary {
            println!("  Last CTC:  {salary}");
        }
    }
}
