use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// Bullet characters that open an unordered list item.
pub const BULLETS: &[char] = &['*', '-', '+', '\u{2022}', '\u{2023}', '\u{2043}'];

/// Regex for enumerated markers: `1.`, `a)`, `(3)`, `#.`.
fn enumerator_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\()?([0-9]+|#|[a-zA-Z])([.)])(?:\s+|$)").expect("Invalid enumerator regex")
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EnumStyle {
    Arabic,
    Auto,
    LowerAlpha,
    UpperAlpha,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EnumFormat {
    /// `1.`
    Period,
    /// `1)`
    Paren,
    /// `(1)`
    Enclosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MarkerKind {
    Bullet(char),
    Enumerated { style: EnumStyle, format: EnumFormat },
}

/// A list item marker found at the start of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListMarker {
    /// Marker text as written, e.g. `-` or `2.`.
    pub text: String,
    pub kind: MarkerKind,
    /// Column at which the item text starts, or `None` when the marker line
    /// carries no text and the content begins on the next line.
    pub content_offset: Option<usize>,
}

impl ListMarker {
    /// Parses a marker at column 0 of `line`.
    pub fn parse(line: &str) -> Option<ListMarker> {
        let first = line.chars().next()?;
        if BULLETS.contains(&first) {
            let rest = &line[first.len_utf8()..];
            if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
                return None;
            }
            return Some(ListMarker {
                text: first.to_string(),
                kind: MarkerKind::Bullet(first),
                content_offset: content_offset(line, first.len_utf8()),
            });
        }

        let caps = enumerator_regex().captures(line)?;
        let enclosed = caps.get(1).is_some();
        let closer = &caps[3];
        let format = match (enclosed, closer) {
            (true, ")") => EnumFormat::Enclosed,
            (true, _) => return None,
            (false, ".") => EnumFormat::Period,
            (false, _) => EnumFormat::Paren,
        };
        let label = &caps[2];
        let style = match label.chars().next() {
            Some('#') => EnumStyle::Auto,
            Some(c) if c.is_ascii_digit() => EnumStyle::Arabic,
            Some(c) if c.is_ascii_lowercase() => EnumStyle::LowerAlpha,
            _ => EnumStyle::UpperAlpha,
        };
        let end = caps.get(3).map_or(0, |m| m.end());

        Some(ListMarker {
            text: line[..end].to_string(),
            kind: MarkerKind::Enumerated { style, format },
            content_offset: content_offset(line, end),
        })
    }

    #[must_use]
    pub fn is_ordered(&self) -> bool {
        matches!(self.kind, MarkerKind::Enumerated { .. })
    }

    /// True if `other` continues the same list as `self`.
    ///
    /// Bullets must use the same character; enumerators the same format, with
    /// `#` compatible with any style.
    #[must_use]
    pub fn same_list(&self, other: &ListMarker) -> bool {
        match (self.kind, other.kind) {
            (MarkerKind::Bullet(a), MarkerKind::Bullet(b)) => a == b,
            (
                MarkerKind::Enumerated {
                    style: sa,
                    format: fa,
                },
                MarkerKind::Enumerated {
                    style: sb,
                    format: fb,
                },
            ) => fa == fb && (sa == sb || sa == EnumStyle::Auto || sb == EnumStyle::Auto),
            _ => false,
        }
    }
}

fn content_offset(line: &str, marker_end: usize) -> Option<usize> {
    let rest = &line[marker_end..];
    let text = rest.trim_start();
    if text.is_empty() {
        return None;
    }
    let spaces = rest.len() - text.len();
    Some(line[..marker_end].chars().count() + spaces)
}
