use crate::environment::Environment;
use crate::parsing::inline::{cursor::Cursor, tokens::Tokens, types::TokenPayload};

/// Inline literals: ``` ``text`` ```.
///
/// Content is kept verbatim; nothing inside is parsed further.
pub struct Literal;

impl Literal {
    pub const DELIM: &'static str = "``";

    /// Replaces every closed literal with a placeholder.
    pub fn replace(text: &str, env: &mut Environment, tokens: &mut Tokens) -> String {
        let mut cur = Cursor::new(text);
        let mut out = String::with_capacity(text.len());
        let mut copied = 0usize;

        while let Some(open) = cur.find(Self::DELIM) {
            cur.i = open;
            match Self::closing(&cur) {
                Some(close) => {
                    let content = &text[open + Self::DELIM.len()..close];
                    out.push_str(&text[copied..open]);
                    out.push_str(&tokens.insert(env, TokenPayload::Literal(content.to_string())));
                    cur.i = close + Self::DELIM.len();
                    copied = cur.i;
                }
                None => {
                    // Skip the whole run of backticks so ```` ``` ```` is not
                    // retried one tick later.
                    while cur.peek() == Some('`') {
                        cur.bump();
                    }
                }
            }
        }
        out.push_str(&text[copied..]);
        out
    }

    /// Byte offset of the delimiter closing the literal opened at the cursor.
    /// The content must be non-empty and the closer must not be followed by
    /// another backtick.
    fn closing(open: &Cursor<'_>) -> Option<usize> {
        let mut cur = open.clone();
        cur.bump_n(Self::DELIM.len());
        // at least one content char
        cur.bump()?;
        while let Some(pos) = cur.find(Self::DELIM) {
            let after = pos + Self::DELIM.len();
            if !open.s[after..].starts_with('`') {
                return Some(pos);
            }
            cur.i = pos + 1;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::inline::tokens::{Segment, segments};
    use pretty_assertions::assert_eq;
    use rst_guides_config::ParserConfig;

    fn literals(text: &str) -> (Vec<String>, usize) {
        let mut env = Environment::new(ParserConfig::default());
        let mut tokens = Tokens::default();
        let out = Literal::replace(text, &mut env, &mut tokens);
        let count = tokens.len();
        let contents = segments(&out)
            .into_iter()
            .map(|s| match s {
                Segment::Text(t) => t.to_string(),
                Segment::Token(id) => match tokens.take(id).map(|t| t.payload) {
                    Some(TokenPayload::Literal(l)) => format!("<{l}>"),
                    other => panic!("unexpected token {other:?}"),
                },
            })
            .collect();
        (contents, count)
    }

    #[test]
    fn replaces_closed_literals() {
        let (parts, count) = literals("use ``*not emphasis*`` here and ``x``");
        assert_eq!(count, 2);
        assert_eq!(parts, vec!["use ", "<*not emphasis*>", " here and ", "<x>"]);
    }

    #[test]
    fn closer_followed_by_backtick_is_skipped() {
        let (parts, _) = literals("``a```");
        assert_eq!(parts, vec!["<a`>"]);
    }

    #[test]
    fn unclosed_and_empty_literals_stay_text() {
        assert_eq!(literals("`` mis-used").1, 0);
        assert_eq!(literals("````").1, 0);
        assert_eq!(literals("no literal").0, vec!["no literal"]);
    }

    #[test]
    fn literal_may_span_lines() {
        let (parts, _) = literals("``one\ntwo``");
        assert_eq!(parts, vec!["<one\ntwo>"]);
    }
}
