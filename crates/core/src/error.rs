/// Result alias that carries the custom [`DataVisError`] type.
pub type Result<T> = std::result::Result<T, DataVisError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum DataVisError {
    /// Free-form error surfaced to the application as-is.
    #[error("{0}")]
    Message(String),
    /// `remove` was called on a structure with no elements.
    #[error("cannot remove from an empty structure")]
    EmptyStructure,
    /// User input that could not be interpreted.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A configuration value outside of its accepted range.
    #[error("invalid configuration: {field} {reason}")]
    InvalidConfig { field: &'static str, reason: String },
    /// The tone backend rejected a request.
    #[error("audio: {0}")]
    Audio(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// A configuration file that is not valid TOML for [`crate::AppConfig`].
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
    /// Failure while serialising output as JSON.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl DataVisError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    pub(crate) fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

impl From<&str> for DataVisError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for DataVisError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
