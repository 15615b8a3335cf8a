//! Element resolution and interaction.
//!
//! A [`Locator`] never holds a server element handle: the remote UI tree
//! mutates underneath us and handles go stale, so every operation resolves
//! the selector to a fresh handle inside its own deadline budget.

use crate::endpoints;
use crate::errors::AutomationError;
use crate::selector::Selector;
use crate::session::Session;
use crate::transport::WireRequest;
use crate::wait::{pause, Deadline};
use crate::wire::{self, ElementHandle, FindElementRequest, SetValueRequest};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument, warn};

// Fixed internal resolve budget for text entry.
const TYPE_RESOLVE_TIMEOUT: Duration = Duration::from_secs(30);
// Attribute values can lag behind the UI, so reads get a generous budget.
const ATTRIBUTE_RESOLVE_TIMEOUT: Duration = Duration::from_secs(60);
// State probes should answer fast or not at all.
const STATE_RESOLVE_TIMEOUT: Duration = Duration::from_secs(5);

/// A high-level API for finding and interacting with UI elements in one
/// session.
#[derive(Debug, Clone)]
pub struct Locator {
    session: Session,
    selector: Selector,
    timeout: Duration,
    poll_interval: Duration,
}

impl Locator {
    pub(crate) fn new(session: Session, selector: Selector) -> Self {
        let timeout = session.config().default_timeout();
        let poll_interval = session.config().poll_interval();
        Self {
            session,
            selector,
            timeout,
            poll_interval,
        }
    }

    /// Set a default timeout for waiting operations on this locator
    /// instance.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn selector_string(&self) -> String {
        self.selector.to_string()
    }

    /// Issue exactly one find-element request.
    #[instrument(level = "debug", skip(self), fields(selector = %self.selector))]
    pub async fn resolve_once(&self) -> Result<ElementHandle, AutomationError> {
        if let Selector::Invalid(reason) = &self.selector {
            return Err(AutomationError::InvalidSelector(reason.clone()));
        }
        let body = serde_json::to_value(FindElementRequest {
            using: self.selector.strategy(),
            value: self.selector.value(),
        })
        .map_err(|e| {
            AutomationError::Encoding(format!("find-element payload for {}: {e}", self.selector))
        })?;
        let response = self
            .session
            .execute(WireRequest::post(
                endpoints::find_element(self.session.base(), self.session.id()),
                body,
            ))
            .await?;
        if !response.is_success() {
            return Err(AutomationError::ElementNotFound(format!(
                "{} (status {})",
                self.selector, response.status
            )));
        }
        let handle: ElementHandle = wire::decode_value(&response.body, "find-element response")?;
        if handle.id().is_empty() {
            return Err(AutomationError::InvalidResponse(format!(
                "server returned an empty element handle for {}",
                self.selector
            )));
        }
        Ok(handle)
    }

    /// Wait for the element to resolve, up to the specified timeout.
    /// If no timeout is provided, uses the locator's default timeout.
    ///
    /// The deadline is wall-clock from entry; transient failures are
    /// swallowed and retried every poll interval, while failures that
    /// cannot succeed on retry propagate immediately.
    #[instrument(level = "debug", skip(self, timeout))]
    pub async fn wait(&self, timeout: Option<Duration>) -> Result<ElementHandle, AutomationError> {
        let budget = timeout.unwrap_or(self.timeout);
        let deadline = Deadline::new(budget);
        loop {
            match self.resolve_once().await {
                Ok(handle) => return Ok(handle),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    if deadline.expired() {
                        return Err(AutomationError::Timeout(format!(
                            "timed out after {budget:?} waiting for element {}. Last error: {e}",
                            self.selector
                        )));
                    }
                    debug!(selector = %self.selector, error = %e, "element not resolved yet, retrying");
                    pause(self.poll_interval).await;
                }
            }
        }
    }

    /// Click the element, retrying the whole resolve-and-click cycle while
    /// the budget lasts.
    pub async fn click(&self, timeout: Option<Duration>) -> Result<(), AutomationError> {
        self.click_inner(timeout, None).await
    }

    /// Click the element, then require `next` to resolve within whatever
    /// remains of the same budget. A click that lands with no budget left
    /// for the follow-up is reported as a timeout, not a success.
    pub async fn click_and_wait_for(
        &self,
        next: impl Into<Selector>,
        timeout: Option<Duration>,
    ) -> Result<(), AutomationError> {
        self.click_inner(timeout, Some(next.into())).await
    }

    #[instrument(level = "debug", skip(self, timeout, follow_up), fields(selector = %self.selector))]
    async fn click_inner(
        &self,
        timeout: Option<Duration>,
        follow_up: Option<Selector>,
    ) -> Result<(), AutomationError> {
        let budget = timeout.unwrap_or(self.timeout);
        let deadline = Deadline::new(budget);
        let mut last_click_error: Option<AutomationError> = None;
        loop {
            let remaining = deadline.remaining();
            if remaining < self.poll_interval {
                // Not enough budget for another resolve-and-click cycle.
                return Err(match last_click_error {
                    Some(e) => e,
                    None => AutomationError::Timeout(format!(
                        "no budget left to click {} within {budget:?}",
                        self.selector
                    )),
                });
            }
            let handle = self.wait(Some(remaining)).await?;
            match self.click_once(&handle).await {
                Ok(()) => {
                    if let Some(next) = &follow_up {
                        let remaining = deadline.remaining();
                        if remaining < self.poll_interval {
                            return Err(AutomationError::Timeout(format!(
                                "clicked {} but no budget left within {budget:?} to find {next}",
                                self.selector
                            )));
                        }
                        let follow = Locator {
                            session: self.session.clone(),
                            selector: next.clone(),
                            timeout: remaining,
                            poll_interval: self.poll_interval,
                        };
                        follow.wait(Some(remaining)).await?;
                    }
                    return Ok(());
                }
                Err(e) if e.is_retryable() => {
                    warn!(selector = %self.selector, error = %e, "click failed, retrying");
                    last_click_error = Some(e);
                    pause(self.poll_interval).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn click_once(&self, handle: &ElementHandle) -> Result<(), AutomationError> {
        let response = self
            .session
            .execute(WireRequest::post(
                endpoints::click(self.session.base(), self.session.id(), handle.id()),
                json!({}),
            ))
            .await?;
        if !response.is_success() {
            return Err(AutomationError::InvalidResponse(format!(
                "click on {} returned status {}",
                self.selector, response.status
            )));
        }
        Ok(())
    }

    /// Resolve under a fixed internal budget, then set the element's value
    /// in one shot. Only resolution is retried.
    #[instrument(level = "debug", skip(self, text), fields(selector = %self.selector))]
    pub async fn type_text(&self, text: &str) -> Result<(), AutomationError> {
        let handle = self.wait(Some(TYPE_RESOLVE_TIMEOUT)).await?;
        let body = serde_json::to_value(SetValueRequest { text }).map_err(|e| {
            AutomationError::Encoding(format!("set-value payload for {}: {e}", self.selector))
        })?;
        let response = self
            .session
            .execute(WireRequest::post(
                endpoints::set_value(self.session.base(), self.session.id(), handle.id()),
                body,
            ))
            .await?;
        if !response.is_success() {
            return Err(AutomationError::InvalidResponse(format!(
                "typing into {} returned status {}",
                self.selector, response.status
            )));
        }
        Ok(())
    }

    /// Read the element's value attribute as a number.
    ///
    /// Strips everything but digits, `.` and `-`, then parses; a `%` in the
    /// raw string rescales the result by 1/100.
    #[instrument(level = "debug", skip(self), fields(selector = %self.selector))]
    pub async fn numeric_value(&self) -> Result<f64, AutomationError> {
        let handle = self.wait(Some(ATTRIBUTE_RESOLVE_TIMEOUT)).await?;
        let response = self
            .session
            .execute(WireRequest::get(endpoints::attribute(
                self.session.base(),
                self.session.id(),
                handle.id(),
                "value",
            )))
            .await?;
        if !response.is_success() {
            return Err(AutomationError::InvalidResponse(format!(
                "reading value of {} returned status {}",
                self.selector, response.status
            )));
        }
        let raw: String = wire::decode_value(&response.body, "value attribute")?;
        parse_numeric(&raw).ok_or_else(|| {
            AutomationError::InvalidResponse(format!(
                "value {raw:?} of {} is not numeric",
                self.selector
            ))
        })
    }

    /// Whether the element is currently displayed.
    pub async fn is_visible(&self) -> Result<bool, AutomationError> {
        let handle = self.wait(Some(STATE_RESOLVE_TIMEOUT)).await?;
        self.read_bool(
            endpoints::displayed(self.session.base(), self.session.id(), handle.id()),
            "displayed state",
        )
        .await
    }

    /// Whether the element is currently selected/checked.
    pub async fn is_checked(&self) -> Result<bool, AutomationError> {
        let handle = self.wait(Some(STATE_RESOLVE_TIMEOUT)).await?;
        self.read_bool(
            endpoints::selected(self.session.base(), self.session.id(), handle.id()),
            "selected state",
        )
        .await
    }

    async fn read_bool(&self, url: String, what: &str) -> Result<bool, AutomationError> {
        let response = self.session.execute(WireRequest::get(url)).await?;
        if !response.is_success() {
            return Err(AutomationError::InvalidResponse(format!(
                "reading {what} of {} returned status {}",
                self.selector, response.status
            )));
        }
        wire::decode_value(&response.body, what)
    }
}

fn parse_numeric(raw: &str) -> Option<f64> {
    let stripped: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    let parsed: f64 = stripped.parse().ok()?;
    Some(if raw.contains('%') {
        parsed / 100.0
    } else {
        parsed
    })
}
