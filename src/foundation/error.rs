/// Convenience result type used across the crate.
pub type ReactionResult<T> = Result<T, ReactionError>;

/// Top-level error taxonomy used by rendering and encoding APIs.
#[derive(thiserror::Error, Debug)]
pub enum ReactionError {
    /// Invalid user-provided parameters or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// Invalid keyframe input passed to interpolation.
    #[error("animation error: {0}")]
    Animation(String),

    /// Errors while shaping text or rasterizing a frame.
    #[error("render error: {0}")]
    Render(String),

    /// Errors from the external encoder process (spawn, pipe writes, exit status).
    #[error("encode error: {0}")]
    Encode(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReactionError {
    /// Build a [`ReactionError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReactionError::Animation`] value.
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    /// Build a [`ReactionError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`ReactionError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`ReactionError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
