use std::sync::OnceLock;

use regex::Regex;

use crate::parsing::inline::types::{InlineNode, Link, LinkRef};

/// Bare URLs and e-mail addresses found in plain text.
pub struct StandaloneLink;

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?i)\b(?:[a-z][a-z0-9+.\-]*://|mailto:|www\d{0,3}\.)[^\s<>]*[^\s<>`!()\[\]{};:'".,?«»“”‘’]"#,
        )
        .expect("Invalid URL regex")
    })
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9](?:[a-zA-Z0-9\-]*[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9\-]*[a-zA-Z0-9])?)+",
        )
        .expect("Invalid email regex")
    })
}

impl StandaloneLink {
    /// Splits `text` into text and link nodes: URLs first, then e-mail
    /// addresses in whatever text is left.
    pub fn split(text: &str, out: &mut Vec<InlineNode>) {
        Self::split_with(text, url_regex(), out, &|found| {
            if found.to_ascii_lowercase().starts_with("www") {
                format!("http://{found}")
            } else {
                found.to_string()
            }
        });
    }

    fn split_with(
        text: &str,
        re: &Regex,
        out: &mut Vec<InlineNode>,
        to_url: &dyn Fn(&str) -> String,
    ) {
        let mut last = 0usize;
        for m in re.find_iter(text) {
            Self::split_emails(&text[last..m.start()], out);
            let url = to_url(m.as_str());
            out.push(InlineNode::Link(Link {
                text: m.as_str().to_string(),
                reference: LinkRef::Url(url.clone()),
                url: Some(url),
            }));
            last = m.end();
        }
        Self::split_emails(&text[last..], out);
    }

    fn split_emails(text: &str, out: &mut Vec<InlineNode>) {
        let mut last = 0usize;
        for m in email_regex().find_iter(text) {
            push_text(out, &text[last..m.start()]);
            let url = format!("mailto:{}", m.as_str());
            out.push(InlineNode::Link(Link {
                text: m.as_str().to_string(),
                reference: LinkRef::Url(url.clone()),
                url: Some(url),
            }));
            last = m.end();
        }
        push_text(out, &text[last..]);
    }
}

/// Appends text, merging with a preceding text node.
pub fn push_text(out: &mut Vec<InlineNode>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(InlineNode::Text(prev)) = out.last_mut() {
        prev.push_str(text);
    } else {
        out.push(InlineNode::Text(text.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn split(text: &str) -> Vec<InlineNode> {
        let mut out = vec![];
        StandaloneLink::split(text, &mut out);
        out
    }

    fn link(text: &str, url: &str) -> InlineNode {
        InlineNode::Link(Link {
            text: text.into(),
            reference: LinkRef::Url(url.into()),
            url: Some(url.into()),
        })
    }

    #[test]
    fn finds_urls_without_trailing_punctuation() {
        assert_eq!(
            split("See http://example.com/docs. Then"),
            vec![
                InlineNode::Text("See ".into()),
                link("http://example.com/docs", "http://example.com/docs"),
                InlineNode::Text(". Then".into()),
            ]
        );
    }

    #[test]
    fn www_gets_a_scheme() {
        assert_eq!(
            split("www.example.org"),
            vec![link("www.example.org", "http://www.example.org")]
        );
    }

    #[test]
    fn finds_emails() {
        assert_eq!(
            split("mail jane.doe@example.com now"),
            vec![
                InlineNode::Text("mail ".into()),
                link("jane.doe@example.com", "mailto:jane.doe@example.com"),
                InlineNode::Text(" now".into()),
            ]
        );
    }

    #[test]
    fn mailto_urls_are_not_split_twice() {
        assert_eq!(
            split("mailto:a@example.com"),
            vec![link("mailto:a@example.com", "mailto:a@example.com")]
        );
    }

    #[test]
    fn plain_text_untouched() {
        assert_eq!(split("<a>"), vec![InlineNode::Text("<a>".into())]);
        assert_eq!(split(""), vec![]);
    }
}
