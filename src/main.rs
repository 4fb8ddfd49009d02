use chrono::Local;
use clap::{Args, Parser, Subcommand};
use feel_japan::backend::PostgrestClient;
use feel_japan::config::{AppConfig, ConfigError};
use feel_japan::error::AppError;
use feel_japan::maintenance::{
    run_release, verify_campaign_columns, GitCli, ReleaseOptions, ReleaseOutcome,
};
use feel_japan::telemetry;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "feel-japan-ops",
    about = "Release and maintenance tasks for the Feel Japan with K partner portal",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Bump the package version, record a changelog entry, commit and tag
    Release(ReleaseArgs),
    /// Check that the brochure table carries the campaign columns
    VerifySchema,
}

#[derive(Args, Debug)]
struct ReleaseArgs {
    /// Bump kind (major, minor, patch) and/or a release message
    #[arg(value_name = "KIND_OR_MESSAGE")]
    positional: Vec<String>,
    #[arg(long)]
    major: bool,
    #[arg(long)]
    minor: bool,
    /// Release even when the working tree is clean
    #[arg(long)]
    force: bool,
    #[arg(long, default_value = "package.json")]
    manifest: PathBuf,
    #[arg(long, default_value = "CHANGELOG.md")]
    changelog: PathBuf,
    /// Repository the git commands run in
    #[arg(long, default_value = ".")]
    repo: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = telemetry::init_cli("info") {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }

    let result = match cli.command {
        Command::Release(args) => release(args),
        Command::VerifySchema => verify_schema().await,
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn release(args: ReleaseArgs) -> Result<ExitCode, AppError> {
    let options = ReleaseOptions::from_invocation(
        &args.positional,
        args.major,
        args.minor,
        args.force,
        args.manifest,
        args.changelog,
        Local::now().date_naive(),
    );

    match run_release(&GitCli::new(args.repo), &options)? {
        ReleaseOutcome::Clean => {
            println!("No changes detected. Repository is clean.");
        }
        ReleaseOutcome::Released(summary) => {
            println!(
                "Bumped version from {} to {} ({})",
                summary.previous, summary.version, summary.kind
            );
            println!("Release message: {}", summary.message);
            match summary.git_error {
                Some(err) => eprintln!("Git operations failed: {err}"),
                None => println!("Committed and tagged {}", summary.tag()),
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn verify_schema() -> Result<ExitCode, AppError> {
    let config = AppConfig::load()?;
    let (url, key) = match (config.backend.url.as_deref(), config.backend.api_key()) {
        (Some(url), Some(key)) => (url, key),
        _ => return Err(ConfigError::BackendNotConfigured.into()),
    };

    let client = PostgrestClient::new(url, key)?;
    println!("Verifying campaign columns in the brochures table...");
    let report = verify_campaign_columns(&client).await;
    println!("{report}");

    Ok(if report.is_verified() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
