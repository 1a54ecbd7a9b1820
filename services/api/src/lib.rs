mod cli;
mod gate;
mod infra;
mod inspect;
mod routes;
mod server;

use site_config::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
