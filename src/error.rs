//! Error types for the audio adapter

use thiserror::Error;

/// Result type alias for adapter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving a media adapter
///
/// Native playback failures are never surfaced here; they are relayed as
/// `error` events on the adapter instead.
#[derive(Error, Debug)]
pub enum Error {
    /// The adapter has released its native instance
    #[error("Adapter has been destroyed")]
    Destroyed,

    /// A replay script could not be interpreted
    #[error("Invalid scenario: {0}")]
    Scenario(String),

    /// Scenario (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading a scenario failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
