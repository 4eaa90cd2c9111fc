//! Utility functions and types.

use std::fmt;

/// Redact masks secrets before they reach `Debug` output or logs.
///
/// - Empty input is rendered as `EMPTY`.
/// - Input shorter than 12 characters is rendered as `***`.
/// - Longer input keeps its first and last three characters, so that two
///   different access keys can still be told apart in a log line.
#[derive(Clone, Copy)]
pub struct Redact<'a>(&'a str);

impl<'a> From<&'a str> for Redact<'a> {
    fn from(value: &'a str) -> Self {
        Redact(value)
    }
}

impl<'a> From<&'a String> for Redact<'a> {
    fn from(value: &'a String) -> Self {
        Redact(value.as_str())
    }
}

impl<'a> From<&'a Option<String>> for Redact<'a> {
    fn from(value: &'a Option<String>) -> Self {
        Redact(value.as_deref().unwrap_or_default())
    }
}

impl fmt::Debug for Redact<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Redact<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0;
        match s.chars().count() {
            0 => f.write_str("EMPTY"),
            n if n < 12 => f.write_str("***"),
            n => {
                let head: String = s.chars().take(3).collect();
                let tail: String = s.chars().skip(n - 3).collect();
                write!(f, "{head}***{tail}")
            }
        }
    }
}
