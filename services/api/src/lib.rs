mod assign;
mod cli;
mod infra;
mod routes;
mod server;

use review_allocator::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
