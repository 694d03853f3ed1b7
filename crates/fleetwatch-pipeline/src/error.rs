//! Error types for the notification pipeline

/// Pipeline error type
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Core(#[from] fleetwatch_core::Error),

    #[error(transparent)]
    Fleet(#[from] fleetwatch_fleet::FleetError),

    #[error(transparent)]
    Notify(#[from] fleetwatch_notify::NotifyError),
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
