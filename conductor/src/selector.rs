use std::fmt;

/// Represents ways to locate a UI element on the remote server.
///
/// Each variant maps to one of the server's location strategies; the pair
/// (strategy, selector string) is what actually goes over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Select by element id
    Id(String),
    /// Select by accessibility identifier
    AccessibilityId(String),
    /// Select by name/label
    Name(String),
    /// Select by class name
    ClassName(String),
    /// Select using an XPath query
    Xpath(String),
    /// Select using a CSS selector (browser sessions)
    Css(String),
    /// Select using an iOS predicate string
    Predicate(String),
    /// Select using an Android UiAutomator expression
    UiAutomator(String),
    /// Represents an invalid selector string, with a reason.
    Invalid(String),
}

impl Selector {
    /// The location strategy name the server expects.
    pub(crate) fn strategy(&self) -> &'static str {
        match self {
            Selector::Id(_) => "id",
            Selector::AccessibilityId(_) => "accessibility id",
            Selector::Name(_) => "name",
            Selector::ClassName(_) => "class name",
            Selector::Xpath(_) => "xpath",
            Selector::Css(_) => "css selector",
            Selector::Predicate(_) => "-ios predicate string",
            Selector::UiAutomator(_) => "-android uiautomator",
            Selector::Invalid(_) => "invalid",
        }
    }

    pub(crate) fn value(&self) -> &str {
        match self {
            Selector::Id(s)
            | Selector::AccessibilityId(s)
            | Selector::Name(s)
            | Selector::ClassName(s)
            | Selector::Xpath(s)
            | Selector::Css(s)
            | Selector::Predicate(s)
            | Selector::UiAutomator(s)
            | Selector::Invalid(s) => s,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Invalid(reason) => write!(f, "invalid selector ({reason})"),
            _ => write!(f, "{}={}", self.strategy(), self.value()),
        }
    }
}

impl From<&str> for Selector {
    fn from(s: &str) -> Self {
        match s {
            _ if s.starts_with("id:") => Selector::Id(s[3..].to_string()),
            _ if s.starts_with("accessibility:") => {
                Selector::AccessibilityId(s["accessibility:".len()..].to_string())
            }
            _ if s.starts_with("access:") => {
                Selector::AccessibilityId(s["access:".len()..].to_string())
            }
            _ if s.starts_with("name:") || s.starts_with("Name:") => {
                let parts: Vec<&str> = s.splitn(2, ':').collect();
                Selector::Name(parts[1].to_string())
            }
            _ if s.to_lowercase().starts_with("classname:") => {
                let parts: Vec<&str> = s.splitn(2, ':').collect();
                Selector::ClassName(parts[1].to_string())
            }
            _ if s.starts_with("class:") => Selector::ClassName(s["class:".len()..].to_string()),
            _ if s.starts_with("xpath:") => Selector::Xpath(s["xpath:".len()..].to_string()),
            _ if s.starts_with("css:") => Selector::Css(s["css:".len()..].to_string()),
            _ if s.starts_with("predicate:") => {
                Selector::Predicate(s["predicate:".len()..].to_string())
            }
            _ if s.starts_with("uiautomator:") => {
                Selector::UiAutomator(s["uiautomator:".len()..].to_string())
            }
            _ if s.starts_with('#') => Selector::Id(s[1..].to_string()),
            _ if s.starts_with('/') || s.starts_with("(/") => Selector::Xpath(s.to_string()),
            _ => Selector::Invalid(format!(
                "Unknown selector format: \"{s}\". Use prefixes like 'id:', 'name:', 'xpath:', 'css:', 'class:', 'accessibility:', 'predicate:' or 'uiautomator:' to specify the strategy."
            )),
        }
    }
}

impl From<String> for Selector {
    fn from(s: String) -> Self {
        Selector::from(s.as_str())
    }
}

impl From<&String> for Selector {
    fn from(s: &String) -> Self {
        Selector::from(s.as_str())
    }
}
