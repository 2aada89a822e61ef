mod cli;
pub mod config;
mod demo;
pub mod error;
mod infra;
mod routes;
mod server;
mod telemetry;

pub use error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
