use thiserror::Error;

#[derive(Error, Debug)]
pub enum AutomationError {
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Operation timed out: {0}")]
    Timeout(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request encoding failed: {0}")]
    Encoding(String),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl AutomationError {
    /// Whether a polling loop may swallow this error and try again.
    /// Encoding and selector errors cannot succeed on retry.
    pub(crate) fn is_retryable(&self) -> bool {
        !matches!(
            self,
            AutomationError::Encoding(_)
                | AutomationError::InvalidSelector(_)
                | AutomationError::InvalidArgument(_)
        )
    }
}
