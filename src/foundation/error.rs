/// Crate-wide result alias.
pub type ClipweaveResult<T> = Result<T, ClipweaveError>;

/// Errors surfaced by timeline construction, evaluation, and the ffmpeg pipes.
///
/// Display prefixes are stable so callers can match on them in logs.
#[derive(thiserror::Error, Debug)]
pub enum ClipweaveError {
    /// Invalid configuration or edit description, raised before any subprocess starts.
    #[error("validation error: {0}")]
    Validation(String),

    /// Invalid animation definition.
    #[error("animation error: {0}")]
    Animation(String),

    /// Failure while sampling a timeline or a frame source.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Decoder subprocess failure (spawn error or unexpected exit).
    #[error("decode error: {0}")]
    Decode(String),

    /// Encoder subprocess failure (spawn error, broken pipe, or unexpected exit).
    #[error("encode error: {0}")]
    Encode(String),

    /// JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else, with its source chain preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ClipweaveError {
    /// Build a [`ClipweaveError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ClipweaveError::Animation`].
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    /// Build a [`ClipweaveError::Evaluation`].
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`ClipweaveError::Decode`].
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`ClipweaveError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`ClipweaveError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for ClipweaveError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
