mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use batch_quality::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
