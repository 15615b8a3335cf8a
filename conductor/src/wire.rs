//! Wire-format DTOs and decode rules for the automation server's JSON
//! envelopes.
//!
//! The server wraps almost every payload in `{"value": ...}`. Session
//! creation is the exception-rich corner: the three backends answer with
//! three structurally different shapes, and the decoder is always selected
//! by the platform that was *requested*, never sniffed from the response.

use crate::errors::AutomationError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// The `{"value": ...}` envelope used by most responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ValueEnvelope<T> {
    pub value: T,
}

/// Decode a `{"value": ...}` response body into the inner payload.
pub(crate) fn decode_value<T: DeserializeOwned>(
    body: &[u8],
    context: &str,
) -> Result<T, AutomationError> {
    serde_json::from_slice::<ValueEnvelope<T>>(body)
        .map(|envelope| envelope.value)
        .map_err(|e| AutomationError::InvalidResponse(format!("{context}: {e}")))
}

/// Opaque server-assigned element identifier.
///
/// Valid for a single operation: the server's UI tree mutates underneath
/// us, so handles are re-resolved from their locator every time instead of
/// being cached.
#[derive(Debug, Clone, Deserialize)]
pub struct ElementHandle {
    #[serde(
        rename = "ELEMENT",
        alias = "element-6066-11e4-a52e-4f735466cecf"
    )]
    id: String,
}

impl ElementHandle {
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Body of `POST .../element`.
#[derive(Debug, Serialize)]
pub(crate) struct FindElementRequest<'a> {
    pub using: &'a str,
    pub value: &'a str,
}

/// Body of `POST .../element/{el}/value`.
#[derive(Debug, Serialize)]
pub(crate) struct SetValueRequest<'a> {
    pub text: &'a str,
}

/// Body of `POST .../execute/sync`.
#[derive(Debug, Serialize)]
pub(crate) struct ExecuteRequest<'a> {
    pub script: &'a str,
    pub args: &'a [serde_json::Value],
}

/// One entry of the `GET /sessions` listing.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SessionEntry {
    pub id: String,
    #[serde(default)]
    pub capabilities: CapabilityBag,
}

/// The platform-dependent capability map attached to a session summary.
/// Every field is optional; which ones are present is what tells the
/// platforms apart.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct CapabilityBag {
    pub platform_name: Option<String>,
    pub platform_version: Option<String>,
    pub browser_name: Option<String>,
    pub device_name: Option<String>,
    pub udid: Option<String>,
}

/// iOS create-session response, WebDriverAgent style:
/// `{"value": {"sessionId": ..., "capabilities": {device fields}}}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IosCreatedSession {
    pub session_id: String,
    #[serde(default)]
    pub capabilities: IosSessionDetails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct IosSessionDetails {
    pub device: Option<String>,
    pub sdk_version: Option<String>,
    #[serde(rename = "CFBundleIdentifier")]
    pub bundle_identifier: Option<String>,
}

/// Android create-session response, legacy JSON-wire style: the session id
/// sits at the top level and `value` is the capability map itself.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AndroidCreatedSession {
    pub session_id: String,
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub value: CapabilityBag,
}

/// Browser create-session response, W3C style:
/// `{"value": {"sessionId": ..., "capabilities": {"browserName": ...}}}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BrowserCreatedSession {
    pub session_id: String,
    #[serde(default)]
    pub capabilities: CapabilityBag,
}
