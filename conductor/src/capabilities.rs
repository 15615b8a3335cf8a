//! Capability descriptors: what the caller wants a session to look like.
//!
//! One variant per automation backend. A descriptor is immutable and is
//! consumed exactly once, when the session lifecycle reconciles it against
//! the server's active-session list.

use crate::wire::CapabilityBag;
use serde_json::{json, Map, Value};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Ios,
    Android,
    Browser,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Ios => "iOS",
            Platform::Android => "Android",
            Platform::Browser => "browser",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields required to request an iOS session.
#[derive(Debug, Clone)]
pub struct IosCapabilities {
    pub platform_version: String,
    pub device_name: String,
    /// Physical-device identifier. When set, reconciliation also requires
    /// an existing session to be on this exact device.
    pub udid: Option<String>,
    pub app: Option<String>,
    pub bundle_id: Option<String>,
    pub wda_local_port: Option<u16>,
}

/// Fields required to request an Android session.
#[derive(Debug, Clone)]
pub struct AndroidCapabilities {
    pub platform_version: String,
    pub device_name: String,
    pub app: Option<String>,
    pub app_package: Option<String>,
    pub app_activity: Option<String>,
    pub system_port: Option<u16>,
}

/// Fields required to request a browser session.
#[derive(Debug, Clone)]
pub struct BrowserCapabilities {
    pub browser_name: String,
    pub platform_version: Option<String>,
}

#[derive(Debug, Clone)]
pub enum Capabilities {
    Ios(IosCapabilities),
    Android(AndroidCapabilities),
    Browser(BrowserCapabilities),
}

impl Capabilities {
    pub fn platform(&self) -> Platform {
        match self {
            Capabilities::Ios(_) => Platform::Ios,
            Capabilities::Android(_) => Platform::Android,
            Capabilities::Browser(_) => Platform::Browser,
        }
    }

    /// The automation backend requested from the server.
    pub fn automation_name(&self) -> &'static str {
        match self {
            Capabilities::Ios(_) => "XCUITest",
            Capabilities::Android(_) => "UiAutomator2",
            Capabilities::Browser(_) => "WebDriver",
        }
    }

    /// Human-readable device or browser identity, used as the session's
    /// display name when the server does not report one.
    pub fn display_name(&self) -> &str {
        match self {
            Capabilities::Ios(c) => &c.device_name,
            Capabilities::Android(c) => &c.device_name,
            Capabilities::Browser(c) => &c.browser_name,
        }
    }

    /// Classify a capability bag from the active-session listing. The
    /// presence of a browser name wins; otherwise the platform name decides.
    pub(crate) fn classify(bag: &CapabilityBag) -> Option<Platform> {
        if bag.browser_name.is_some() {
            return Some(Platform::Browser);
        }
        match bag
            .platform_name
            .as_deref()
            .map(|name| name.to_ascii_lowercase())
            .as_deref()
        {
            Some("ios") => Some(Platform::Ios),
            Some("android") => Some(Platform::Android),
            _ => None,
        }
    }

    /// Whether an already-running session described by `bag` satisfies this
    /// descriptor. Platform version must agree; an iOS descriptor with a
    /// UDID additionally pins the device.
    pub(crate) fn matches(&self, bag: &CapabilityBag) -> bool {
        match self {
            Capabilities::Ios(c) => {
                bag.platform_version.as_deref() == Some(c.platform_version.as_str())
                    && match &c.udid {
                        Some(udid) => bag.udid.as_deref() == Some(udid.as_str()),
                        None => true,
                    }
            }
            Capabilities::Android(c) => {
                bag.platform_version.as_deref() == Some(c.platform_version.as_str())
            }
            Capabilities::Browser(c) => {
                bag.browser_name.as_deref() == Some(c.browser_name.as_str())
                    && match (&c.platform_version, &bag.platform_version) {
                        (Some(want), Some(have)) => want == have,
                        _ => true,
                    }
            }
        }
    }

    /// Build the `alwaysMatch` capability map for session creation.
    ///
    /// Required fields are always present; optional fields are included
    /// only when set, because an explicit null is rejected by some
    /// backends.
    pub(crate) fn always_match(&self, command_timeout: Duration) -> Map<String, Value> {
        let mut caps = Map::new();
        caps.insert("platformName".into(), json!(self.platform().as_str()));
        caps.insert(
            "newCommandTimeout".into(),
            json!(command_timeout.as_secs()),
        );
        caps.insert("automationName".into(), json!(self.automation_name()));
        match self {
            Capabilities::Ios(c) => {
                caps.insert("platformVersion".into(), json!(c.platform_version));
                caps.insert("deviceName".into(), json!(c.device_name));
                insert_opt(&mut caps, "udid", c.udid.as_deref());
                insert_opt(&mut caps, "app", c.app.as_deref());
                insert_opt(&mut caps, "bundleId", c.bundle_id.as_deref());
                if let Some(port) = c.wda_local_port {
                    caps.insert("wdaLocalPort".into(), json!(port));
                }
            }
            Capabilities::Android(c) => {
                caps.insert("platformVersion".into(), json!(c.platform_version));
                caps.insert("deviceName".into(), json!(c.device_name));
                insert_opt(&mut caps, "app", c.app.as_deref());
                insert_opt(&mut caps, "appPackage", c.app_package.as_deref());
                insert_opt(&mut caps, "appActivity", c.app_activity.as_deref());
                if let Some(port) = c.system_port {
                    caps.insert("systemPort".into(), json!(port));
                }
            }
            Capabilities::Browser(c) => {
                caps.insert("browserName".into(), json!(c.browser_name));
                insert_opt(&mut caps, "platformVersion", c.platform_version.as_deref());
            }
        }
        caps
    }

    /// Full `POST /session` request body.
    pub(crate) fn create_payload(&self, command_timeout: Duration) -> Value {
        json!({
            "capabilities": {
                "alwaysMatch": self.always_match(command_timeout)
            }
        })
    }
}

fn insert_opt(caps: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        caps.insert(key.to_string(), json!(value));
    }
}
