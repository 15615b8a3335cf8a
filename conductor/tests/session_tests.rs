//! Session reconciliation: reuse-or-create across the three backend
//! response shapes, and cleanup on failure.

mod common;

use common::{browser_caps, browser_session, ios_caps, test_config, MockTransport, Reply};
use conductor::{
    AndroidCapabilities, AutomationError, Capabilities, Driver, Method, Platform, SessionOrigin,
};
use serde_json::json;

#[tokio::test]
async fn matching_ios_entry_is_reused_without_creation() {
    let mock = MockTransport::new();
    mock.stub(
        Method::Get,
        "/sessions",
        200,
        json!({"value": [
            {"id": "ios-1", "capabilities": {
                "platformName": "iOS",
                "platformVersion": "17.4",
                "udid": "UD-1",
                "deviceName": "iPhone 15 Pro"
            }}
        ]}),
    );
    let driver = Driver::with_transport(mock.clone(), test_config());

    let session = driver.session(ios_caps(Some("UD-1"))).await.unwrap();
    assert_eq!(session.origin(), SessionOrigin::Reused);
    assert_eq!(session.id(), "ios-1");
    assert_eq!(session.platform(), Platform::Ios);
    assert_eq!(session.device_name(), "iPhone 15 Pro");
    assert_eq!(mock.count(Method::Post, "/session"), 0);
}

#[tokio::test]
async fn udid_mismatch_forces_creation() {
    let mock = MockTransport::new();
    mock.stub(
        Method::Get,
        "/sessions",
        200,
        json!({"value": [
            {"id": "ios-1", "capabilities": {
                "platformName": "iOS",
                "platformVersion": "17.4",
                "udid": "UD-2"
            }}
        ]}),
    );
    mock.stub(
        Method::Post,
        "/session",
        200,
        json!({"value": {
            "sessionId": "77AE2C1A",
            "capabilities": {"device": "iphone", "sdkVersion": "17.4"}
        }}),
    );
    let driver = Driver::with_transport(mock.clone(), test_config());

    let session = driver.session(ios_caps(Some("UD-1"))).await.unwrap();
    assert_eq!(session.origin(), SessionOrigin::Created);
    assert_eq!(session.id(), "77AE2C1A");
    assert_eq!(session.device_name(), "iphone");
    assert_eq!(mock.count(Method::Post, "/session"), 1);
}

#[tokio::test]
async fn empty_listing_issues_exactly_one_creation_request() {
    let mock = MockTransport::new();
    mock.stub(Method::Get, "/sessions", 200, json!({"value": []}));
    mock.stub(
        Method::Post,
        "/session",
        200,
        json!({"value": {
            "sessionId": "b-11",
            "capabilities": {"browserName": "chrome", "browserVersion": "126.0"}
        }}),
    );
    let driver = Driver::with_transport(mock.clone(), test_config());

    let session = driver.session(browser_caps()).await.unwrap();
    assert_eq!(session.origin(), SessionOrigin::Created);
    assert_eq!(mock.count(Method::Post, "/session"), 1);
    assert_eq!(mock.count(Method::Get, "/sessions"), 1);
}

#[tokio::test]
async fn android_creation_decodes_the_legacy_shape() {
    let mock = MockTransport::new();
    mock.stub(Method::Get, "/sessions", 200, json!({"value": []}));
    // Legacy JSON-wire: session id at the top level, value is the
    // capability map.
    mock.stub(
        Method::Post,
        "/session",
        200,
        json!({
            "sessionId": "a-90",
            "status": 0,
            "value": {"platformName": "Android", "platformVersion": "14", "deviceName": "emulator-5554"}
        }),
    );
    let driver = Driver::with_transport(mock.clone(), test_config());

    let session = driver
        .session(Capabilities::Android(AndroidCapabilities {
            platform_version: "14".into(),
            device_name: "Pixel 8".into(),
            app: None,
            app_package: Some("com.example.app".into()),
            app_activity: Some(".MainActivity".into()),
            system_port: None,
        }))
        .await
        .unwrap();
    assert_eq!(session.origin(), SessionOrigin::Created);
    assert_eq!(session.id(), "a-90");
    assert_eq!(session.platform(), Platform::Android);
    assert_eq!(session.device_name(), "emulator-5554");
}

#[tokio::test]
async fn browser_session_created_then_reused_end_to_end() {
    let mock = MockTransport::new();
    mock.stub_seq(
        Method::Get,
        "/sessions",
        vec![
            Reply::Respond(200, json!({"value": []})),
            Reply::Respond(
                200,
                json!({"value": [
                    {"id": "b-11", "capabilities": {"browserName": "chrome"}}
                ]}),
            ),
        ],
    );
    mock.stub(
        Method::Post,
        "/session",
        200,
        json!({"value": {"sessionId": "b-11", "capabilities": {"browserName": "chrome"}}}),
    );
    let driver = Driver::with_transport(mock.clone(), test_config());

    let first = driver.session(browser_caps()).await.unwrap();
    assert_eq!(first.origin(), SessionOrigin::Created);

    let second = driver.session(browser_caps()).await.unwrap();
    assert_eq!(second.origin(), SessionOrigin::Reused);
    assert_eq!(second.id(), first.id());
    assert_eq!(mock.count(Method::Post, "/session"), 1);
}

#[tokio::test]
async fn listing_failure_shuts_the_transport_down() {
    let mock = MockTransport::new();
    mock.stub(Method::Get, "/sessions", 500, json!({"value": null}));
    let driver = Driver::with_transport(mock.clone(), test_config());

    let err = driver.session(browser_caps()).await.expect_err("listing fails");
    assert!(matches!(err, AutomationError::InvalidResponse(_)));
    assert!(mock.shutdown_called());
}

#[tokio::test]
async fn undecodable_creation_response_is_invalid_and_cleans_up() {
    let mock = MockTransport::new();
    mock.stub(Method::Get, "/sessions", 200, json!({"value": []}));
    mock.stub(Method::Post, "/session", 200, json!({"value": {}}));
    let driver = Driver::with_transport(mock.clone(), test_config());

    let err = driver
        .session(browser_caps())
        .await
        .expect_err("response is missing the session id");
    assert!(matches!(err, AutomationError::InvalidResponse(_)));
    assert!(mock.shutdown_called());
}

#[tokio::test]
async fn empty_session_id_is_rejected() {
    let mock = MockTransport::new();
    mock.stub(Method::Get, "/sessions", 200, json!({"value": []}));
    mock.stub(
        Method::Post,
        "/session",
        200,
        json!({"value": {"sessionId": "", "capabilities": {"browserName": "chrome"}}}),
    );
    let driver = Driver::with_transport(mock.clone(), test_config());

    let err = driver
        .session(browser_caps())
        .await
        .expect_err("an empty session id never becomes a Session");
    assert!(matches!(err, AutomationError::InvalidResponse(_)));
}

#[tokio::test]
async fn creation_payload_includes_only_set_optional_fields() {
    let mock = MockTransport::new();
    mock.stub(Method::Get, "/sessions", 200, json!({"value": []}));
    mock.stub(
        Method::Post,
        "/session",
        200,
        json!({"value": {
            "sessionId": "77AE2C1A",
            "capabilities": {"device": "iphone"}
        }}),
    );
    let driver = Driver::with_transport(mock.clone(), test_config());

    driver.session(ios_caps(None)).await.unwrap();

    let create = mock
        .requests()
        .into_iter()
        .find(|r| r.method == Method::Post && r.url.ends_with("/session"))
        .expect("one creation request");
    let always_match = &create.body.as_ref().unwrap()["capabilities"]["alwaysMatch"];
    assert_eq!(always_match["platformName"], json!("iOS"));
    assert_eq!(always_match["platformVersion"], json!("17.4"));
    assert_eq!(always_match["automationName"], json!("XCUITest"));
    assert_eq!(always_match["deviceName"], json!("iPhone 15"));
    assert!(always_match["newCommandTimeout"].is_u64());
    // Unset optionals are absent, not null.
    let map = always_match.as_object().unwrap();
    assert!(!map.contains_key("udid"));
    assert!(!map.contains_key("app"));
    assert!(!map.contains_key("bundleId"));
    assert!(!map.contains_key("wdaLocalPort"));
}

#[tokio::test]
async fn navigation_script_and_deletion_hit_their_endpoints() {
    let mock = MockTransport::new();
    mock.stub(Method::Get, "/url", 200, json!({"value": "https://example.com/"}));
    mock.stub(Method::Post, "/url", 200, json!({"value": null}));
    mock.stub(Method::Post, "/execute/sync", 200, json!({"value": 8}));
    mock.stub(Method::Delete, "/session/b-11", 200, json!({"value": null}));
    let session = browser_session(&mock).await;

    session.navigate("https://example.com/").await.unwrap();
    assert_eq!(session.current_url().await.unwrap(), "https://example.com/");

    let result = session
        .execute_script("return 3 + 5;", vec![])
        .await
        .unwrap();
    assert_eq!(result, json!(8));

    session.delete().await.unwrap();
    assert_eq!(mock.count(Method::Delete, "/session/b-11"), 1);
}

#[tokio::test]
async fn hide_keyboard_posts_to_the_device_endpoint() {
    let mock = MockTransport::new();
    mock.stub(Method::Get, "/sessions", 200, json!({"value": []}));
    mock.stub(
        Method::Post,
        "/session",
        200,
        json!({"value": {"sessionId": "i-1", "capabilities": {"device": "iphone"}}}),
    );
    mock.stub(Method::Post, "/hide_keyboard", 200, json!({"value": null}));
    let driver = Driver::with_transport(mock.clone(), test_config());

    let session = driver.session(ios_caps(None)).await.unwrap();
    session.hide_keyboard().await.unwrap();
    assert_eq!(mock.count(Method::Post, "/hide_keyboard"), 1);
}
