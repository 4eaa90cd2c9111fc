//! Parse user supplied header text.
//!
//! Header text is one `Key: Value` pair per line, as it is typically passed
//! through a workflow input or a command line flag:
//!
//! ```text
//! Content-Type: application/json
//! Accept: *
//! ```
//!
//! Parsing is lenient: a line without a value, or without a `:` at all,
//! yields an empty value instead of an error.

use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;
use log::warn;

/// Parse header text into `(key, value)` pairs in the order they appear.
///
/// - Leading and trailing whitespace is trimmed from keys and values.
/// - Blank lines are skipped.
/// - Only the first `:` separates key from value.
/// - Duplicate keys are all returned.
pub fn parse_header_lines(text: &str) -> Vec<(String, String)> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let (key, value) = line.split_once(':').unwrap_or((line, ""));
            let key = key.trim();
            if key.is_empty() {
                warn!("header line without name is ignored");
                return None;
            }
            Some((key.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Parse header text and insert every pair into `headers`.
///
/// The last occurrence of a duplicated key wins, while the key keeps the
/// position of its first occurrence. Pairs that are not valid HTTP headers
/// are skipped with a warning.
///
/// Returns the number of headers applied.
pub fn apply_header_lines(text: &str, headers: &mut HeaderMap) -> usize {
    let mut applied = 0;

    for (key, value) in parse_header_lines(text) {
        let Ok(name) = HeaderName::from_bytes(key.as_bytes()) else {
            warn!("header line with invalid name {key:?} is ignored");
            continue;
        };
        let Ok(value) = HeaderValue::from_str(&value) else {
            warn!("header {name} with invalid value is ignored");
            continue;
        };

        headers.insert(name, value);
        applied += 1;
    }

    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pairs(v: &[(&str, &str)]) -> Vec<(String, String)> {
        v.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(parse_header_lines("Key: Value"), pairs(&[("Key", "Value")]));
        assert_eq!(
            parse_header_lines("   Key   :   Value   "),
            pairs(&[("Key", "Value")])
        );
    }

    #[test]
    fn test_parse_empty_value() {
        assert_eq!(parse_header_lines("Key:"), pairs(&[("Key", "")]));
        assert_eq!(parse_header_lines("Key"), pairs(&[("Key", "")]));
    }

    #[test]
    fn test_parse_value_with_colon() {
        assert_eq!(
            parse_header_lines("Referer: https://example.com:8443/a"),
            pairs(&[("Referer", "https://example.com:8443/a")])
        );
    }

    #[test]
    fn test_parse_block() {
        let text = "
            Content-Type: application/json
            User-Agent: GitHub-Hookshot/760256b
            frifjlr:
            fkeofew??
            Accept: *
        ";

        assert_eq!(
            parse_header_lines(text),
            pairs(&[
                ("Content-Type", "application/json"),
                ("User-Agent", "GitHub-Hookshot/760256b"),
                ("frifjlr", ""),
                ("fkeofew??", ""),
                ("Accept", "*"),
            ])
        );
    }

    #[test]
    fn test_apply_block() {
        let text = "
            Content-Type: application/json
            User-Agent: GitHub-Hookshot/760256b
            frifjlr:
            fkeofew??
            Accept: *
        ";

        let mut headers = HeaderMap::new();
        let applied = apply_header_lines(text, &mut headers);

        // `fkeofew??` is not a valid header name.
        assert_eq!(applied, 4);
        let got: Vec<(&str, &str)> = headers
            .iter()
            .map(|(k, v)| (k.as_str(), v.to_str().unwrap()))
            .collect();
        assert_eq!(
            got,
            vec![
                ("content-type", "application/json"),
                ("user-agent", "GitHub-Hookshot/760256b"),
                ("frifjlr", ""),
                ("accept", "*"),
            ]
        );
    }

    #[test]
    fn test_apply_duplicate_last_wins() {
        let text = "X-Trace: first\nAccept: */*\nx-trace: second";

        let mut headers = HeaderMap::new();
        apply_header_lines(text, &mut headers);

        assert_eq!(headers.len(), 2);
        assert_eq!(headers["x-trace"], "second");
        let names: Vec<&str> = headers.keys().map(|k| k.as_str()).collect();
        assert_eq!(names, vec!["x-trace", "accept"]);
    }

    #[test]
    fn test_apply_empty_text() {
        let mut headers = HeaderMap::new();
        assert_eq!(apply_header_lines("", &mut headers), 0);
        assert!(headers.is_empty());
    }
}
