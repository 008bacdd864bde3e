use thiserror::Error;

/// Fixed prefix shown in the error banner for failed generations.
pub const GENERATION_FAILED_PREFIX: &str = "Code generation failed: ";

const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred";

/// Everything that can go wrong in this app, reduced to two kinds:
/// startup configuration problems (fatal, printed to stderr before the
/// terminal enters raw mode) and generation failures (recovered at the
/// controller and shown in the error banner).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("{0}")]
    Generation(String),
}

impl Error {
    /// Normalize any error into the text the UI displays.
    pub fn to_display_message(&self) -> String {
        match self {
            Error::Configuration(msg) => msg.clone(),
            Error::Generation(msg) if msg.is_empty() => UNKNOWN_ERROR_MESSAGE.to_string(),
            Error::Generation(msg) => format!("{}{}", GENERATION_FAILED_PREFIX, msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_message_carries_fixed_prefix() {
        let err = Error::Generation("connection refused".to_string());
        assert_eq!(
            err.to_display_message(),
            "Code generation failed: connection refused"
        );
    }

    #[test]
    fn empty_generation_message_falls_back_to_generic_text() {
        let err = Error::Generation(String::new());
        assert_eq!(err.to_display_message(), "An unknown error occurred");
    }

    #[test]
    fn configuration_message_is_shown_verbatim() {
        let err = Error::Configuration("GEMINI_API_KEY environment variable not set".to_string());
        assert_eq!(
            err.to_display_message(),
            "GEMINI_API_KEY environment variable not set"
        );
    }
}
