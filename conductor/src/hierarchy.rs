//! Hierarchy polling: fetch the full UI-tree/page-source text and evaluate
//! text-containment predicates against it, optionally polling until a
//! predicate holds.
//!
//! Snapshots are never cached; every check fetches fresh source.

use crate::endpoints;
use crate::errors::AutomationError;
use crate::session::Session;
use crate::transport::WireRequest;
use crate::wait::{pause, Deadline};
use crate::wire;
use std::time::Duration;
use tracing::{debug, instrument, warn};

impl Session {
    /// Fetch the raw UI-tree/page-source text in one request.
    #[instrument(level = "debug", skip(self))]
    pub async fn source(&self) -> Result<String, AutomationError> {
        let response = self
            .execute(WireRequest::get(endpoints::source(self.base(), self.id())))
            .await?;
        if !response.is_success() {
            return Err(AutomationError::InvalidResponse(format!(
                "page source of session {} returned status {}",
                self.id(),
                response.status
            )));
        }
        wire::decode_value(&response.body, "page source")
    }

    /// Whether the current hierarchy contains `text`. Single shot.
    pub async fn contains(&self, text: &str) -> Result<bool, AutomationError> {
        Ok(count_occurrences(&self.source().await?, text) >= 1)
    }

    /// Whether the current hierarchy contains at least `n` non-overlapping
    /// occurrences of `text`. Single shot.
    pub async fn contains_at_least(&self, text: &str, n: usize) -> Result<bool, AutomationError> {
        Ok(count_occurrences(&self.source().await?, text) >= n)
    }

    /// Poll fresh snapshots until `text` appears or the deadline elapses.
    /// Returns false on timeout; this is a predicate wait, not an
    /// assertion.
    #[instrument(level = "debug", skip(self, timeout))]
    pub async fn wait_until_contains(&self, text: &str, timeout: Option<Duration>) -> bool {
        self.wait_for_source(text, true, timeout).await
    }

    /// Poll fresh snapshots until `text` is gone or the deadline elapses.
    #[instrument(level = "debug", skip(self, timeout))]
    pub async fn wait_until_absent(&self, text: &str, timeout: Option<Duration>) -> bool {
        self.wait_for_source(text, false, timeout).await
    }

    async fn wait_for_source(
        &self,
        text: &str,
        want_present: bool,
        timeout: Option<Duration>,
    ) -> bool {
        let budget = timeout.unwrap_or(self.config().default_timeout());
        let deadline = Deadline::new(budget);
        loop {
            let satisfied = match self.source().await {
                Ok(snapshot) => {
                    let present = count_occurrences(&snapshot, text) >= 1;
                    present == want_present
                }
                Err(e) => {
                    // A transient fetch hiccup must not fail the whole wait.
                    warn!(session_id = %self.id(), error = %e, "source fetch failed during wait, treating as unsatisfied");
                    false
                }
            };
            if satisfied {
                return true;
            }
            if deadline.expired() {
                debug!(session_id = %self.id(), text, want_present, budget = ?deadline.budget(), "hierarchy wait timed out");
                return false;
            }
            pause(self.config().poll_interval()).await;
        }
    }
}

/// Count non-overlapping occurrences of `needle` in `haystack`. An empty
/// needle counts as zero occurrences.
pub(crate) fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count()
}
