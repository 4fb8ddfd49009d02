use crate::server;
use clap::{Args, Parser, Subcommand};
use feel_japan::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Feel Japan with K Portal API",
    about = "Serve the Feel Japan with K partner portal backend",
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
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Number of concurrent brochure captures
    #[arg(long, value_name = "COUNT")]
    pub(crate) capture_workers: Option<usize>,
    /// Directory generated brochure PDFs are written to
    #[arg(long, value_name = "DIR")]
    pub(crate) capture_output: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
    }
}
