//! Error types
//!
//! Nothing in the game core is fatal: malformed input and stale intents are
//! dropped as `None`. These types cover the edges where the host hands us
//! data (settings JSON) or signals (recognition failures).

use thiserror::Error;

/// Failure decoding or patching accessibility settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid settings json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown setting `{0}`")]
    UnknownSetting(String),
}

/// Error signal delivered by the speech recognition source
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecognitionError {
    /// Microphone access was refused by the user or browser
    #[error("microphone permission denied")]
    PermissionDenied,
    #[error("network error during recognition")]
    Network,
    #[error("no speech detected")]
    NoSpeech,
    #[error("recognition aborted")]
    Aborted,
    #[error("recognition error: {0}")]
    Other(String),
}

impl RecognitionError {
    /// Map a Web Speech API error code to a typed error
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_lowercase().as_str() {
            "not-allowed" | "permission-denied" | "service-not-allowed" => Self::PermissionDenied,
            "network" => Self::Network,
            "no-speech" => Self::NoSpeech,
            "aborted" => Self::Aborted,
            other => Self::Other(other.to_string()),
        }
    }

    /// Only permission denial disables the voice channel
    pub fn is_fatal_for_channel(&self) -> bool {
        matches!(self, Self::PermissionDenied)
    }
}
