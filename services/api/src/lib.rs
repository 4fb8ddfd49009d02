mod cli;
mod infra;
mod routes;
mod server;

use feel_japan::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
