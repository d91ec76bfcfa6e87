use thiserror::Error;
use uuid::Uuid;

/// Error taxonomy shared by every service in the workspace.
///
/// `Validation` is raised before any mutation and rejects the whole call;
/// `AlreadyReconciled`/`AlreadyResolved` are the at-most-once guards on a
/// specific entity. Partial failure inside a batch is *not* an error; it is
/// reported through the batch outcome value.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(anyhow::Error),

    #[error("Not found: {0}")]
    NotFound(anyhow::Error),

    #[error("Payment already reconciled: {payment_id}")]
    AlreadyReconciled { payment_id: Uuid },

    #[error("Exception already resolved: {exception_id}")]
    AlreadyResolved { exception_id: Uuid },

    #[error("Database error: {0}")]
    DatabaseError(anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    /// Short stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::NotFound(_) => "not_found",
            AppError::AlreadyReconciled { .. } => "already_reconciled",
            AppError::AlreadyResolved { .. } => "already_resolved",
            AppError::DatabaseError(_) => "database",
            AppError::ConfigError(_) => "config",
            AppError::InternalError(_) => "internal",
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(anyhow::anyhow!(msg.into()))
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(anyhow::anyhow!(msg.into()))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}
