//! Client engine for remote UI-automation servers speaking a
//! WebDriver-like REST protocol.
//!
//! This crate lets a caller describe *what* UI element to act on (a
//! [`Selector`]) and *what* to do with it (click, type, read state, assert
//! hierarchy content) without managing ephemeral server-side element
//! handles, HTTP retries, or the response-shape differences between the
//! iOS, Android and browser backends.
//!
//! ```no_run
//! use conductor::{BrowserCapabilities, Capabilities, Config, Driver};
//!
//! # async fn run() -> Result<(), conductor::AutomationError> {
//! let config = Config::new("http://127.0.0.1:4723")?;
//! let driver = Driver::new(config)?;
//! let session = driver
//!     .session(Capabilities::Browser(BrowserCapabilities {
//!         browser_name: "chrome".into(),
//!         platform_version: None,
//!     }))
//!     .await?;
//! session.locator("id:login").click(None).await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use tracing::{error, instrument};

pub mod capabilities;
pub mod config;
mod endpoints;
pub mod errors;
pub mod hierarchy;
pub mod locator;
pub mod selector;
pub mod session;
pub mod transport;
mod wait;
mod wire;

pub use capabilities::{
    AndroidCapabilities, BrowserCapabilities, Capabilities, IosCapabilities, Platform,
};
pub use config::Config;
pub use errors::AutomationError;
pub use locator::Locator;
pub use selector::Selector;
pub use session::{Session, SessionOrigin};
pub use transport::{HttpTransport, Method, Transport, WireRequest, WireResponse};
pub use wire::ElementHandle;

/// The main entry point: a configured connection to one automation server.
///
/// A driver owns the shared transport; every session it produces holds a
/// clone of that handle, so shutting the driver down invalidates them all.
pub struct Driver {
    transport: Arc<dyn Transport>,
    config: Config,
}

impl Driver {
    /// Build a driver with the production HTTP transport.
    pub fn new(config: Config) -> Result<Self, AutomationError> {
        let transport = Arc::new(HttpTransport::new()?);
        Ok(Self { transport, config })
    }

    /// Build a driver over an existing transport (shared or scripted).
    pub fn with_transport(transport: Arc<dyn Transport>, config: Config) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolve `capabilities` to a session: reuse a matching active session
    /// on the server, or create a new one.
    ///
    /// Any failure along the way shuts the transport down (best effort)
    /// before the error propagates.
    #[instrument(skip(self, capabilities), fields(platform = %capabilities.platform()))]
    pub async fn session(&self, capabilities: Capabilities) -> Result<Session, AutomationError> {
        match session::reconcile(self.transport.clone(), self.config.clone(), capabilities).await
        {
            Ok(session) => Ok(session),
            Err(e) => {
                error!(error = %e, "session reconciliation failed, shutting transport down");
                self.transport.shutdown().await;
                Err(e)
            }
        }
    }

    /// Tear the shared transport down, invalidating every session built on
    /// it.
    pub async fn shutdown(&self) {
        self.transport.shutdown().await;
    }
}

impl Clone for Driver {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            config: self.config.clone(),
        }
    }
}
