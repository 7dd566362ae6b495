use crate::environment::{Environment, TokenIds};
use crate::parsing::blocks::buffer::normalize_whitespace;
use crate::parsing::inline::{cursor::Cursor, tokens::Tokens, types::TokenPayload};

/// Substitution references: `|name|`.
pub struct Substitution;

impl Substitution {
    pub const DELIM: char = '|';

    /// Replaces `|name|` with placeholders. The start must not follow a
    /// word character, the name must not start or end with whitespace, and
    /// the end must not run into a word character.
    pub fn replace(text: &str, env: &mut Environment, tokens: &mut Tokens) -> String {
        let mut cur = Cursor::new(text);
        let mut out = String::with_capacity(text.len());
        let mut copied = 0usize;

        while !cur.eof() {
            if cur.peek() != Some(Self::DELIM) || cur.prev().is_some_and(char::is_alphanumeric) {
                cur.bump();
                continue;
            }
            let start = cur.i;
            cur.bump();
            let Some(close) = cur.find("|") else {
                break;
            };
            let name = &text[cur.i..close];
            let after = text[close + 1..].chars().next();
            let valid = !name.is_empty()
                && !name.starts_with(char::is_whitespace)
                && !name.ends_with(char::is_whitespace)
                && !name.contains([TokenIds::OPEN, TokenIds::CLOSE, '`'])
                && !after.is_some_and(char::is_alphanumeric);
            if !valid {
                continue;
            }
            out.push_str(&text[copied..start]);
            out.push_str(&tokens.insert(
                env,
                TokenPayload::Substitution {
                    name: normalize_whitespace(name),
                },
            ));
            cur.i = close + 1;
            copied = cur.i;
        }
        out.push_str(&text[copied..]);
        out
    }
}
