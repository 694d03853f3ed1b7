//! Error types for Fleetwatch

use std::path::PathBuf;

/// Fleetwatch error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Company not found: {0}")]
    CompanyNotFound(String),

    #[error("Truck not found: {0}")]
    TruckNotFound(String),

    #[error("Subscription not found: {0}")]
    SubscriptionNotFound(i64),

    #[error("Invalid category: {0}")]
    InvalidCategory(i64),

    #[error("Invalid vehicle id: {0}")]
    InvalidVehicleId(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Database error: {0}")]
    DbError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),
}

/// Result type alias for Fleetwatch
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::ConfigError(msg.into())
    }

    pub fn db<S: Into<String>>(msg: S) -> Self {
        Error::DbError(msg.into())
    }
}
