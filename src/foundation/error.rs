/// Convenience result type used across the public API.
pub type VesselResult<T> = Result<T, VesselError>;

/// Top-level error type.
#[derive(thiserror::Error, Debug)]
pub enum VesselError {
    /// Invalid user input, scene document, or track data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Shader program assembly failure.
    #[error("shader error: {0}")]
    Shader(String),

    /// Attribute, draw, or rasterization failure.
    #[error("render error: {0}")]
    Render(String),

    /// JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VesselError {
    /// Build a [`VesselError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`VesselError::Shader`].
    pub fn shader(msg: impl Into<String>) -> Self {
        Self::Shader(msg.into())
    }

    /// Build a [`VesselError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`VesselError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
