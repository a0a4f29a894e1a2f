use crate::client::{self, AdminCommand, CandidatesArgs, LoginArgs, UnlockArgs};
use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use job_board::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "job-board",
    about = "Run the job board API or drive it from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run an in-process walkthrough of posting, applying and unlocking
    Demo(DemoArgs),
    /// Sign in and remember the session for later commands
    Login(LoginArgs),
    /// End the stored session
    Logout,
    /// List the candidate directory as the signed-in employer or admin
    Candidates(CandidatesArgs),
    /// Unlock a candidate's contact details for credits
    Unlock(UnlockArgs),
    /// Ledger administration
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the initial credits charged per unlock
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub(crate) unlock_cost: Option<u64>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Demo(args) => run_demo(args).await,
        Command::Login(args) => client::login(args).await,
        Command::Logout => client::logout().await,
        Command::Candidates(args) => client::candidates(args).await,
        Command::Unlock(args) => client::unlock(args).await,
        Command::Admin { command } => client::admin(command).await,
    }
}
