use std::collections::HashMap;

use crate::environment::{Environment, TokenIds};

use super::types::{SpanToken, TokenPayload};

/// Tokens recognised so far in one span, keyed by placeholder id.
#[derive(Debug, Default)]
pub struct Tokens {
    by_id: HashMap<String, SpanToken>,
}

impl Tokens {
    /// Stores `payload` and returns the placeholder that stands in for it.
    pub fn insert(&mut self, env: &mut Environment, payload: TokenPayload) -> String {
        let id = env.next_token_id();
        let placeholder = TokenIds::placeholder(&id);
        self.by_id.insert(id.clone(), SpanToken { id, payload });
        placeholder
    }

    pub fn take(&mut self, id: &str) -> Option<SpanToken> {
        self.by_id.remove(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Token(&'a str),
}

/// Splits working text into plain runs and placeholder ids.
pub fn segments(text: &str) -> Vec<Segment<'_>> {
    let mut out = vec![];
    let mut rest = text;
    while let Some(open) = rest.find(TokenIds::OPEN) {
        let after = &rest[open + TokenIds::OPEN.len_utf8()..];
        let Some(close) = after.find(TokenIds::CLOSE) else {
            break;
        };
        if open > 0 {
            out.push(Segment::Text(&rest[..open]));
        }
        out.push(Segment::Token(&after[..close]));
        rest = &after[close + TokenIds::CLOSE.len_utf8()..];
    }
    if !rest.is_empty() {
        out.push(Segment::Text(rest));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rst_guides_config::ParserConfig;

    #[test]
    fn placeholders_split_back_out() {
        let mut env = Environment::new(ParserConfig::default());
        let mut tokens = Tokens::default();
        let p = tokens.insert(&mut env, TokenPayload::Literal("x".into()));
        let text = format!("before {p} after");

        let segs = segments(&text);
        assert_eq!(segs.len(), 3);
        assert_eq!(segs[0], Segment::Text("before "));
        let Segment::Token(id) = segs[1] else {
            panic!("expected token segment");
        };
        assert_eq!(
            tokens.take(id).map(|t| t.payload),
            Some(TokenPayload::Literal("x".into()))
        );
        assert_eq!(segs[2], Segment::Text(" after"));
        assert!(tokens.is_empty());
    }

    #[test]
    fn unterminated_placeholder_is_text() {
        let text = format!("a{}b", TokenIds::OPEN);
        assert_eq!(segments(&text), vec![Segment::Text(text.as_str())]);
    }
}
