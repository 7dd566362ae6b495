use std::sync::OnceLock;

use regex::Regex;

/// Explicit hyperlink target lines.
///
/// - `.. _name: url` and ``.. _`phrase name`: url`` bind a name to a URL
/// - `.. __: url` and `__ url` declare an anonymous target
/// - `.. _name:` declares an anchor at this point of the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    Named { name: String, url: String },
    Anonymous { url: String },
    Anchor { name: String },
}

fn phrase_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\.\. _`([^`]+)`:(?:\s+(.+?))?\s*$").expect("Invalid target regex"))
}

fn named_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\.\. _([^`:][^:]*|):(?:\s+(.+?))?\s*$").expect("Invalid target regex"))
}

impl LinkTarget {
    pub fn parse(line: &str) -> Option<LinkTarget> {
        if let Some(url) = line.strip_prefix("__ ") {
            return Some(LinkTarget::Anonymous {
                url: url.trim().to_string(),
            });
        }

        let (name, url) = if let Some(caps) = phrase_regex().captures(line) {
            (caps[1].to_string(), caps.get(2).map(|m| m.as_str().to_string()))
        } else {
            let caps = named_regex().captures(line)?;
            (caps[1].to_string(), caps.get(2).map(|m| m.as_str().to_string()))
        };

        match (name.as_str(), url) {
            ("_", Some(url)) => Some(LinkTarget::Anonymous { url }),
            ("", _) | ("_", None) => None,
            (_, Some(url)) => Some(LinkTarget::Named { name, url }),
            (_, None) => Some(LinkTarget::Anchor { name }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn named_target() {
        assert_eq!(
            LinkTarget::parse(".. _Python: https://www.python.org/"),
            Some(LinkTarget::Named {
                name: "Python".into(),
                url: "https://www.python.org/".into()
            })
        );
    }

    #[test]
    fn phrase_target() {
        assert_eq!(
            LinkTarget::parse(".. _`Read the docs`: https://docs.example.org"),
            Some(LinkTarget::Named {
                name: "Read the docs".into(),
                url: "https://docs.example.org".into()
            })
        );
    }

    #[test]
    fn anonymous_targets() {
        assert_eq!(
            LinkTarget::parse("__ http://a.example"),
            Some(LinkTarget::Anonymous {
                url: "http://a.example".into()
            })
        );
        assert_eq!(
            LinkTarget::parse(".. __: http://b.example"),
            Some(LinkTarget::Anonymous {
                url: "http://b.example".into()
            })
        );
    }

    #[test]
    fn anchor_target() {
        assert_eq!(
            LinkTarget::parse(".. _installation:"),
            Some(LinkTarget::Anchor {
                name: "installation".into()
            })
        );
    }

    #[test]
    fn non_targets() {
        assert_eq!(LinkTarget::parse(".. note::"), None);
        assert_eq!(LinkTarget::parse(".. a comment"), None);
        assert_eq!(LinkTarget::parse("_not: a target"), None);
    }
}
