//! Pure mappings from (session, element, operation) to resource URLs.
//!
//! Every function here is a deterministic string build with no I/O; the
//! base URL was validated when the [`Config`](crate::Config) was made.

pub(crate) fn new_session(base: &str) -> String {
    format!("{base}/session")
}

pub(crate) fn active_sessions(base: &str) -> String {
    format!("{base}/sessions")
}

pub(crate) fn session(base: &str, session_id: &str) -> String {
    format!("{base}/session/{session_id}")
}

pub(crate) fn find_element(base: &str, session_id: &str) -> String {
    format!("{base}/session/{session_id}/element")
}

pub(crate) fn click(base: &str, session_id: &str, element_id: &str) -> String {
    format!("{base}/session/{session_id}/element/{element_id}/click")
}

pub(crate) fn set_value(base: &str, session_id: &str, element_id: &str) -> String {
    format!("{base}/session/{session_id}/element/{element_id}/value")
}

pub(crate) fn attribute(base: &str, session_id: &str, element_id: &str, name: &str) -> String {
    format!("{base}/session/{session_id}/element/{element_id}/attribute/{name}")
}

pub(crate) fn displayed(base: &str, session_id: &str, element_id: &str) -> String {
    format!("{base}/session/{session_id}/element/{element_id}/displayed")
}

pub(crate) fn selected(base: &str, session_id: &str, element_id: &str) -> String {
    format!("{base}/session/{session_id}/element/{element_id}/selected")
}

pub(crate) fn source(base: &str, session_id: &str) -> String {
    format!("{base}/session/{session_id}/source")
}

pub(crate) fn url(base: &str, session_id: &str) -> String {
    format!("{base}/session/{session_id}/url")
}

pub(crate) fn execute_sync(base: &str, session_id: &str) -> String {
    format!("{base}/session/{session_id}/execute/sync")
}

pub(crate) fn hide_keyboard(base: &str, session_id: &str) -> String {
    format!("{base}/session/{session_id}/appium/device/hide_keyboard")
}
