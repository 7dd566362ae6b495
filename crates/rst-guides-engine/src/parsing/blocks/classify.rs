//! Pure line predicates shared by every block state.
//!
//! Nothing here keeps state; predicates that need context take the following
//! line as `next`.

use super::kinds::{Adornment, DirectiveLine, ListMarker, MarkerKind};

/// True for empty and whitespace-only lines.
pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Number of leading spaces.
pub fn indentation(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

/// True if the line has text and at least `min` leading spaces.
pub fn is_indented(line: &str, min: usize) -> bool {
    !is_blank(line) && indentation(line) >= min.max(1)
}

/// A `..` explicit markup line that is not a directive.
pub fn is_comment_line(line: &str) -> bool {
    let Some(rest) = line.strip_prefix("..") else {
        return false;
    };
    (rest.is_empty() || rest.starts_with(' ')) && !is_directive_line(line)
}

/// `.. name::` or `.. |var| name::`.
pub fn is_directive_line(line: &str) -> bool {
    DirectiveLine::parse(line).is_some()
}

/// The repeated adornment character, if the whole trimmed line is one.
pub fn section_adornment(line: &str) -> Option<char> {
    Adornment::letter(line)
}

/// A list marker at column 0 followed by whitespace.
///
/// Enumerated markers need confirmation from the next line: a following line
/// that is neither blank, indented, nor another item means the "marker" was
/// just the start of a sentence (`A. Smith wrote...`).
pub fn is_list_item_line(line: &str, next: Option<&str>) -> bool {
    let Some(marker) = ListMarker::parse(line) else {
        return false;
    };
    if let MarkerKind::Bullet(_) = marker.kind {
        return true;
    }
    match next {
        None => true,
        Some(next) => is_blank(next) || is_indented(next, 1) || ListMarker::parse(next).is_some(),
    }
}

/// Non-indented text whose next line is indented text: a definition term.
pub fn is_definition_list_term_end(line: &str, next: Option<&str>) -> bool {
    !is_blank(line) && indentation(line) == 0 && next.is_some_and(|n| is_indented(n, 1))
}

/// A non-indented line that is not followed by an indented one ends a
/// definition list. Blank and indented lines never end it.
pub fn is_definition_list_ended(line: &str, next: Option<&str>) -> bool {
    if is_blank(line) || indentation(line) > 0 {
        return false;
    }
    !next.is_some_and(|n| is_indented(n, 1))
}

/// Composed only of `+`, `-`, `=`, `|` and spaces, with at least one rule
/// character.
pub fn is_table_border_line(line: &str) -> bool {
    !is_blank(line)
        && line.contains(['-', '='])
        && line.chars().all(|c| matches!(c, '+' | '-' | '=' | '|' | ' '))
}

/// A paragraph ending with `::` announces a literal block.
pub fn ends_with_literal_marker(text: &str) -> bool {
    text.trim_end().ends_with("::")
}
