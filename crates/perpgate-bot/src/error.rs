//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    Core(#[from] perpgate_core::CoreError),

    #[error("Exchange error: {0}")]
    Exchange(#[from] perpgate_exchange::ExchangeError),

    #[error("Executor error: {0}")]
    Executor(#[from] perpgate_executor::ExecutorError),

    #[error("Unwind error: {0}")]
    Unwind(#[from] perpgate_position::PositionError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] perpgate_telemetry::TelemetryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
