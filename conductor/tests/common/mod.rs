//! Shared test scaffolding: a scripted transport and session fixtures.
#![allow(dead_code)]

use async_trait::async_trait;
use conductor::{
    AutomationError, BrowserCapabilities, Capabilities, Config, Driver, IosCapabilities, Method,
    Session, Transport, WireRequest, WireResponse,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One scripted answer from the mock server.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Respond with this status and JSON body.
    Respond(u16, Value),
    /// Fail at the transport level (connection error).
    Fail(String),
}

struct Rule {
    method: Method,
    url_suffix: String,
    body_contains: Option<String>,
    replies: Vec<Reply>,
    next: usize,
}

impl Rule {
    fn matches(&self, request: &WireRequest) -> bool {
        if self.method != request.method || !request.url.ends_with(&self.url_suffix) {
            return false;
        }
        match &self.body_contains {
            None => true,
            Some(needle) => request
                .body
                .as_ref()
                .map(|body| body.to_string().contains(needle))
                .unwrap_or(false),
        }
    }

    /// Pop the next reply; the last one repeats forever.
    fn take(&mut self) -> Reply {
        let index = self.next.min(self.replies.len() - 1);
        self.next += 1;
        self.replies[index].clone()
    }
}

/// Transport whose responses are scripted per (method, URL suffix) rule.
/// Every request is recorded so tests can assert on what went over the
/// wire.
pub struct MockTransport {
    rules: Mutex<Vec<Rule>>,
    requests: Mutex<Vec<WireRequest>>,
    shutdown_called: AtomicBool,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            rules: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
            shutdown_called: AtomicBool::new(false),
        })
    }

    /// Always answer `status`/`body` for matching requests.
    pub fn stub(&self, method: Method, url_suffix: &str, status: u16, body: Value) {
        self.stub_seq(method, url_suffix, vec![Reply::Respond(status, body)]);
    }

    /// Answer with each reply in turn; the last repeats forever.
    pub fn stub_seq(&self, method: Method, url_suffix: &str, replies: Vec<Reply>) {
        assert!(!replies.is_empty(), "a rule needs at least one reply");
        self.rules.lock().unwrap().push(Rule {
            method,
            url_suffix: url_suffix.to_string(),
            body_contains: None,
            replies,
            next: 0,
        });
    }

    /// Like `stub_seq`, but only for requests whose JSON body contains
    /// `body_contains`. Lets two locators share the find-element endpoint.
    pub fn stub_matching(
        &self,
        method: Method,
        url_suffix: &str,
        body_contains: &str,
        replies: Vec<Reply>,
    ) {
        assert!(!replies.is_empty(), "a rule needs at least one reply");
        self.rules.lock().unwrap().push(Rule {
            method,
            url_suffix: url_suffix.to_string(),
            body_contains: Some(body_contains.to_string()),
            replies,
            next: 0,
        });
    }

    pub fn requests(&self) -> Vec<WireRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method, url_suffix: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.url.ends_with(url_suffix))
            .count()
    }

    pub fn shutdown_called(&self) -> bool {
        self.shutdown_called.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: WireRequest) -> Result<WireResponse, AutomationError> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = {
            let mut rules = self.rules.lock().unwrap();
            rules.iter_mut().find(|r| r.matches(&request)).map(Rule::take)
        };
        match reply {
            Some(Reply::Respond(status, body)) => Ok(WireResponse {
                status,
                body: body.to_string().into_bytes(),
            }),
            Some(Reply::Fail(message)) => Err(AutomationError::Transport(message)),
            None => Ok(WireResponse {
                status: 500,
                body: format!(
                    "no stub for {} {}",
                    request.method.as_str(),
                    request.url
                )
                .into_bytes(),
            }),
        }
    }

    async fn shutdown(&self) {
        self.shutdown_called.store(true, Ordering::SeqCst);
    }
}

pub const POLL: Duration = Duration::from_millis(250);

pub fn test_config() -> Config {
    Config::new("http://127.0.0.1:4723")
        .unwrap()
        .with_default_timeout(Duration::from_secs(5))
        .with_poll_interval(POLL)
}

pub fn browser_caps() -> Capabilities {
    Capabilities::Browser(BrowserCapabilities {
        browser_name: "chrome".into(),
        platform_version: None,
    })
}

pub fn ios_caps(udid: Option<&str>) -> Capabilities {
    Capabilities::Ios(IosCapabilities {
        platform_version: "17.4".into(),
        device_name: "iPhone 15".into(),
        udid: udid.map(str::to_string),
        app: None,
        bundle_id: None,
        wda_local_port: None,
    })
}

/// Reconcile a fresh browser session (empty listing, scripted creation).
pub async fn browser_session(mock: &Arc<MockTransport>) -> Session {
    mock.stub(Method::Get, "/sessions", 200, json!({"value": []}));
    mock.stub(
        Method::Post,
        "/session",
        200,
        json!({"value": {"sessionId": "b-11", "capabilities": {"browserName": "chrome"}}}),
    );
    let driver = Driver::with_transport(mock.clone(), test_config());
    driver
        .session(browser_caps())
        .await
        .expect("scripted browser session should reconcile")
}
