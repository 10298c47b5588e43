/// Result alias that carries the custom [`TypewriterError`] type.
pub type Result<T> = std::result::Result<T, TypewriterError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum TypewriterError {
    /// Free-form failure, mostly used for poisoned locks and joined threads.
    #[error("{0}")]
    Message(String),
    /// A page element the hero animation cannot run without is absent.
    #[error("required element `{selector}` was not found on the page")]
    MissingElement { selector: String },
    /// An external animation library could not be loaded. Startup aborts.
    #[error("failed to load dependency `{name}` from {url}: {reason}")]
    DependencyLoad {
        name: String,
        url: String,
        reason: String,
    },
    /// The particle backdrop could not be created. Callers may continue
    /// without it.
    #[error("backdrop initialisation failed: {0}")]
    BackdropInit(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Wav(#[from] hound::Error),
    #[error("{0}")]
    Fft(#[from] realfft::FftError),
}

impl TypewriterError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    pub fn missing_element(selector: impl Into<String>) -> Self {
        Self::MissingElement {
            selector: selector.into(),
        }
    }

    /// Returns true when the error must abort the whole startup sequence.
    pub fn is_fatal_to_startup(&self) -> bool {
        !matches!(self, Self::BackdropInit(_))
    }
}

impl From<&str> for TypewriterError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for TypewriterError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
