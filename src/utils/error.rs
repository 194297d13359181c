//! Error handling for the market data distribution system.

use thiserror::Error;

/// Main error type for the distribution system
#[derive(Debug, Error)]
pub enum Error {
    /// The underlying file or resource of a feed cannot be opened
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// A feed header matches neither the candle nor the tick column set
    #[error("Schema classification error: {0}")]
    SchemaClassification(String),

    /// A data row cannot be mapped to the expected shape (skip-and-log)
    #[error("Malformed row: {0}")]
    MalformedRow(String),

    /// A subscriber callback failed during delivery; absorbed at the bus
    /// boundary and recorded for retry, never propagated to the publisher
    #[error("Subscriber delivery error: {0}")]
    SubscriberDelivery(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML deserialization errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Result type for the distribution system
pub type Result<T> = std::result::Result<T, Error>;

// Convenience conversions so subscriber callbacks can fail with a message
impl From<&str> for Error {
    fn from(err: &str) -> Self {
        Error::SubscriberDelivery(err.to_string())
    }
}

impl From<String> for Error {
    fn from(err: String) -> Self {
        Error::SubscriberDelivery(err)
    }
}
