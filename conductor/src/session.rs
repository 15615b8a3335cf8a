//! Session lifecycle: reconcile a capability descriptor against the
//! server's active-session list, reusing a matching session or creating a
//! new one, and the session-scoped operations that need no element.

use crate::capabilities::{Capabilities, Platform};
use crate::config::Config;
use crate::endpoints;
use crate::errors::AutomationError;
use crate::locator::Locator;
use crate::selector::Selector;
use crate::transport::{Transport, WireRequest, WireResponse};
use crate::wire::{
    self, AndroidCreatedSession, BrowserCreatedSession, ExecuteRequest, IosCreatedSession,
    SessionEntry,
};
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// How a session came to exist on the client side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOrigin {
    /// Adopted from the server's active-session list; no creation request
    /// was issued.
    Reused,
    /// Freshly created with `POST /session`.
    Created,
}

/// A live automation session.
///
/// Holds a shared transport handle (many sessions may share one transport),
/// the server-assigned session id, and the identity of the device or
/// browser behind it. The id is never empty once a `Session` exists.
#[derive(Clone)]
pub struct Session {
    transport: Arc<dyn Transport>,
    config: Config,
    id: String,
    platform: Platform,
    device_name: String,
    origin: SessionOrigin,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("platform", &self.platform)
            .field("device_name", &self.device_name)
            .field("origin", &self.origin)
            .finish()
    }
}

impl Session {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        config: Config,
        id: String,
        platform: Platform,
        device_name: String,
        origin: SessionOrigin,
    ) -> Result<Self, AutomationError> {
        if id.is_empty() {
            return Err(AutomationError::InvalidResponse(
                "server reported an empty session id".to_string(),
            ));
        }
        Ok(Self {
            transport,
            config,
            id,
            platform,
            device_name,
            origin,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn origin(&self) -> SessionOrigin {
        self.origin
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn base(&self) -> &str {
        self.config.base()
    }

    /// Build a locator bound to this session.
    pub fn locator(&self, selector: impl Into<Selector>) -> Locator {
        Locator::new(self.clone(), selector.into())
    }

    pub(crate) async fn execute(
        &self,
        request: WireRequest,
    ) -> Result<WireResponse, AutomationError> {
        self.transport.execute(request).await
    }

    /// Current URL of a browser session.
    #[instrument(level = "debug", skip(self))]
    pub async fn current_url(&self) -> Result<String, AutomationError> {
        let response = self
            .execute(WireRequest::get(endpoints::url(self.base(), &self.id)))
            .await?;
        if !response.is_success() {
            return Err(AutomationError::InvalidResponse(format!(
                "reading url of session {} returned status {}",
                self.id, response.status
            )));
        }
        wire::decode_value(&response.body, "current url")
    }

    /// Navigate a browser session to `url`.
    #[instrument(level = "debug", skip(self))]
    pub async fn navigate(&self, url: &str) -> Result<(), AutomationError> {
        let response = self
            .execute(WireRequest::post(
                endpoints::url(self.base(), &self.id),
                json!({ "url": url }),
            ))
            .await?;
        if !response.is_success() {
            return Err(AutomationError::InvalidResponse(format!(
                "navigating session {} to {url} returned status {}",
                self.id, response.status
            )));
        }
        Ok(())
    }

    /// Run a script synchronously in the remote page and return its value.
    #[instrument(level = "debug", skip(self, script, args))]
    pub async fn execute_script(
        &self,
        script: &str,
        args: Vec<Value>,
    ) -> Result<Value, AutomationError> {
        let body = serde_json::to_value(ExecuteRequest {
            script,
            args: &args,
        })
        .map_err(|e| AutomationError::Encoding(format!("script payload: {e}")))?;
        let response = self
            .execute(WireRequest::post(
                endpoints::execute_sync(self.base(), &self.id),
                body,
            ))
            .await?;
        if !response.is_success() {
            return Err(AutomationError::InvalidResponse(format!(
                "script execution in session {} returned status {}",
                self.id, response.status
            )));
        }
        wire::decode_value(&response.body, "script result")
    }

    /// Dismiss the software keyboard on a mobile session.
    #[instrument(level = "debug", skip(self))]
    pub async fn hide_keyboard(&self) -> Result<(), AutomationError> {
        let response = self
            .execute(WireRequest::post(
                endpoints::hide_keyboard(self.base(), &self.id),
                json!({}),
            ))
            .await?;
        if !response.is_success() {
            return Err(AutomationError::InvalidResponse(format!(
                "hiding keyboard in session {} returned status {}",
                self.id, response.status
            )));
        }
        Ok(())
    }

    /// Delete the remote session. Consumes the value; other clones of this
    /// session become dangling references to a dead server session.
    #[instrument(level = "debug", skip(self))]
    pub async fn delete(self) -> Result<(), AutomationError> {
        let response = self
            .execute(WireRequest::delete(endpoints::session(
                self.base(),
                &self.id,
            )))
            .await?;
        if !response.is_success() {
            return Err(AutomationError::InvalidResponse(format!(
                "deleting session {} returned status {}",
                self.id, response.status
            )));
        }
        info!(session_id = %self.id, "session deleted");
        Ok(())
    }
}

/// Reuse an active server session matching `capabilities`, or create one.
///
/// The listing is classified into platform buckets and the first entry that
/// satisfies the descriptor wins; no scoring, no ordering beyond what the
/// server returned.
#[instrument(level = "debug", skip(transport, config, capabilities), fields(platform = %capabilities.platform()))]
pub(crate) async fn reconcile(
    transport: Arc<dyn Transport>,
    config: Config,
    capabilities: Capabilities,
) -> Result<Session, AutomationError> {
    let response = transport
        .execute(WireRequest::get(endpoints::active_sessions(config.base())))
        .await?;
    if !response.is_success() {
        return Err(AutomationError::InvalidResponse(format!(
            "active-session listing returned status {}",
            response.status
        )));
    }
    let entries: Vec<SessionEntry> = wire::decode_value(&response.body, "active-session listing")?;
    debug!(count = entries.len(), "active sessions listed");

    let target = capabilities.platform();
    for entry in &entries {
        if Capabilities::classify(&entry.capabilities) != Some(target) {
            continue;
        }
        if !capabilities.matches(&entry.capabilities) {
            continue;
        }
        info!(session_id = %entry.id, platform = %target, "reusing active session");
        let device_name = entry
            .capabilities
            .device_name
            .clone()
            .or_else(|| entry.capabilities.browser_name.clone())
            .unwrap_or_else(|| capabilities.display_name().to_string());
        return Session::new(
            transport,
            config,
            entry.id.clone(),
            target,
            device_name,
            SessionOrigin::Reused,
        );
    }

    create(transport, config, capabilities).await
}

/// Create a fresh session and decode the response with the decoder the
/// requested platform selects. The response shape is never sniffed.
async fn create(
    transport: Arc<dyn Transport>,
    config: Config,
    capabilities: Capabilities,
) -> Result<Session, AutomationError> {
    let payload = capabilities.create_payload(config.command_timeout());
    let response = transport
        .execute(WireRequest::post(
            endpoints::new_session(config.base()),
            payload,
        ))
        .await?;
    if !response.is_success() {
        return Err(AutomationError::InvalidResponse(format!(
            "session creation for {} returned status {}: {}",
            capabilities.platform(),
            response.status,
            response.body_text()
        )));
    }

    let requested_name = capabilities.display_name().to_string();
    let (id, device_name) = match capabilities.platform() {
        Platform::Ios => {
            let created: IosCreatedSession =
                wire::decode_value(&response.body, "iOS create-session response")?;
            debug!(
                sdk_version = created.capabilities.sdk_version.as_deref().unwrap_or("unknown"),
                bundle = created.capabilities.bundle_identifier.as_deref().unwrap_or("unknown"),
                "iOS session capabilities"
            );
            let name = created.capabilities.device.unwrap_or(requested_name);
            (created.session_id, name)
        }
        Platform::Android => {
            // Legacy JSON-wire shape: no envelope, session id at top level.
            let created: AndroidCreatedSession = serde_json::from_slice(&response.body)
                .map_err(|e| {
                    AutomationError::InvalidResponse(format!(
                        "Android create-session response: {e}"
                    ))
                })?;
            if created.status.unwrap_or(0) != 0 {
                return Err(AutomationError::InvalidResponse(format!(
                    "Android create-session reported status {}",
                    created.status.unwrap_or(0)
                )));
            }
            let name = created.value.device_name.unwrap_or(requested_name);
            (created.session_id, name)
        }
        Platform::Browser => {
            let created: BrowserCreatedSession =
                wire::decode_value(&response.body, "browser create-session response")?;
            let name = created.capabilities.browser_name.unwrap_or(requested_name);
            (created.session_id, name)
        }
    };

    info!(session_id = %id, platform = %capabilities.platform(), "session created");
    Session::new(
        transport,
        config,
        id,
        capabilities.platform(),
        device_name,
        SessionOrigin::Created,
    )
}
