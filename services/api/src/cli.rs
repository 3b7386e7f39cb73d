use crate::assign::{run_assign, AssignArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use review_allocator::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Reviewer Allocator",
    about = "Assign conference papers to reviewers under method and capacity constraints",
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
    /// Allocate reviewers from paper and directory exports on disk
    Assign(AssignArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Assign(args) => run_assign(args).await,
    }
}
