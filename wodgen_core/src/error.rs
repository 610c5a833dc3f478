//! Error types for the wodgen_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for wodgen_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input was not shaped the way the loader or normalizer requires
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Movement library validation error
    #[error("Library validation error: {0}")]
    LibraryValidation(String),

    /// Every movement was rejected by the eligibility gates
    #[error("No eligible movements for this profile; relax constraints and retry")]
    NoEligibleMovements,

    /// The metcon block could not be filled with a single movement
    #[error("Could not select any metcon movements; relax constraints and retry")]
    EmptyMetcon,
}
