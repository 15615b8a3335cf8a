use crate::errors::AutomationError;
use reqwest::Url;
use std::time::Duration;

/// Engine configuration: where the automation server lives and the default
/// time budgets every operation falls back to.
///
/// A `Config` is validated once at construction and then passed into the
/// driver; nothing in the engine reads process-global state.
#[derive(Debug, Clone)]
pub struct Config {
    base: String,
    default_timeout: Duration,
    poll_interval: Duration,
    command_timeout: Duration,
}

impl Config {
    /// Parse and normalize the server base URL. A malformed URL is fatal
    /// here so the endpoint builders never have to fail at call time.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, AutomationError> {
        let raw = base_url.as_ref().trim_end_matches('/');
        let parsed = Url::parse(raw).map_err(|e| {
            AutomationError::InvalidArgument(format!("base URL {raw:?} is malformed: {e}"))
        })?;
        match parsed.scheme() {
            "http" | "https" => {}
            other => {
                return Err(AutomationError::InvalidArgument(format!(
                    "base URL {raw:?} has unsupported scheme {other:?}"
                )))
            }
        }
        Ok(Self {
            base: raw.to_string(),
            default_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(500),
            command_timeout: Duration::from_secs(120),
        })
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Idle-command timeout requested from the server at session creation.
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Normalized base URL, no trailing slash.
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn command_timeout(&self) -> Duration {
        self.command_timeout
    }
}
