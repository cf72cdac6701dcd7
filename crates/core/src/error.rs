/// Result alias that carries the custom [`DriftwaveError`] type.
pub type Result<T> = std::result::Result<T, DriftwaveError>;

/// Common error type for the core crate.
///
/// Most engine conditions never reach this type: missing curve data resolves
/// to neutral defaults and out-of-range inputs are clamped. Only resource
/// acquisition and decoding surface as errors.
#[derive(Debug, thiserror::Error)]
pub enum DriftwaveError {
    /// The synthesis back end could not be acquired.
    #[error("audio back end unavailable: {0}")]
    AudioUnavailable(String),
    /// A profile failed validation while being decoded.
    #[error("invalid profile: {0}")]
    InvalidProfile(String),
    /// A preview layer name that the engine does not know about.
    #[error("unknown layer `{0}`")]
    UnknownLayer(String),
    /// Free-form message, mostly used for poisoned shared state.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Wrapper around JSON decoding errors.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl DriftwaveError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    /// Creates an [`DriftwaveError::AudioUnavailable`] error.
    pub fn audio_unavailable<T: Into<String>>(reason: T) -> Self {
        Self::AudioUnavailable(reason.into())
    }
}

impl From<&str> for DriftwaveError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for DriftwaveError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_unavailable_mentions_reason() {
        let err = DriftwaveError::audio_unavailable("context creation denied");
        assert!(format!("{err}").contains("context creation denied"));
    }

    #[test]
    fn json_errors_convert() {
        let err: DriftwaveError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, DriftwaveError::Json(_)));
    }
}
