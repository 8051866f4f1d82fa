/// Result alias used across the crate.
pub type WeaveResult<T> = Result<T, WeaveError>;

/// Error taxonomy for loading, composing and presenting animations.
#[derive(thiserror::Error, Debug)]
pub enum WeaveError {
    /// Metadata or frame geometry that violates a structural invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// The codec could not produce a requested raw frame.
    #[error("decode error: {0}")]
    Decode(String),

    /// A disposal code outside the defined set; the source is corrupt or unsupported.
    #[error("invalid disposal method: {0}")]
    InvalidDisposal(u8),

    /// The presentation device was lost and its resources must be rebuilt.
    #[error("render backend lost")]
    RenderBackendLost,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WeaveError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// `true` for errors the playback loop may skip over without stalling.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
