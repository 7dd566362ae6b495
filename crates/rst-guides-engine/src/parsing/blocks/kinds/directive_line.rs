use std::sync::OnceLock;

use regex::Regex;

fn directive_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\.\. (?:\|([^|]+)\| )?(\S+?)::(?:\s+(.*?))?\s*$")
            .expect("Invalid directive regex")
    })
}

fn option_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s+:([^:]+):(?:\s+(.*?))?\s*$").expect("Invalid directive option regex")
    })
}

/// The opening line of a directive: `.. |var| name:: data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveLine {
    /// Substitution name when the directive defines `|var|`.
    pub variable: Option<String>,
    pub name: String,
    /// Text after `::` on the opening line.
    pub data: String,
}

impl DirectiveLine {
    pub const PREFIX: &'static str = ".. ";
    pub const MARKER: &'static str = "::";

    pub fn parse(line: &str) -> Option<DirectiveLine> {
        let caps = directive_regex().captures(line)?;
        Some(DirectiveLine {
            variable: caps.get(1).map(|m| m.as_str().trim().to_string()),
            name: caps[2].to_string(),
            data: caps.get(3).map_or_else(String::new, |m| m.as_str().to_string()),
        })
    }
}

/// A `:key: value` option line inside a directive block. Flags without a
/// value parse to an empty string.
pub fn parse_option(line: &str) -> Option<(String, String)> {
    let caps = option_regex().captures(line)?;
    Some((
        caps[1].trim().to_string(),
        caps.get(2).map_or_else(String::new, |m| m.as_str().to_string()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(".. note::", None, "note", "")]
    #[case(".. image:: img/logo.png", None, "image", "img/logo.png")]
    #[case(".. code-block:: rust  ", None, "code-block", "rust")]
    #[case(".. |version| replace:: 1.0", Some("version"), "replace", "1.0")]
    #[case(".. |my logo| image:: logo.png", Some("my logo"), "image", "logo.png")]
    fn parses_directive_lines(
        #[case] line: &str,
        #[case] variable: Option<&str>,
        #[case] name: &str,
        #[case] data: &str,
    ) {
        let parsed = DirectiveLine::parse(line).unwrap();
        assert_eq!(parsed.variable.as_deref(), variable);
        assert_eq!(parsed.name, name);
        assert_eq!(parsed.data, data);
    }

    #[rstest]
    #[case(".. just a comment")]
    #[case("..note::")]
    #[case(".. _target: http://example.com")]
    #[case("text:: more")]
    fn rejects_other_lines(#[case] line: &str) {
        assert_eq!(DirectiveLine::parse(line), None);
    }

    #[rstest]
    #[case("   :width: 200px", Some(("width", "200px")))]
    #[case("  :literal:", Some(("literal", "")))]
    #[case(":width: 200px", None)]
    #[case("   body text", None)]
    fn parses_options(#[case] line: &str, #[case] expected: Option<(&str, &str)>) {
        let parsed = parse_option(line);
        assert_eq!(
            parsed.as_ref().map(|(k, v)| (k.as_str(), v.as_str())),
            expected
        );
    }
}
