use crate::environment::Environment;
use crate::parsing::inline::{
    cursor::Cursor,
    tokens::Tokens,
    types::{CrossReference, TokenPayload},
};

/// Interpreted text with an explicit role: ``:doc:`install```.
pub struct Role;

/// Role name and content of one `:role:`content`` occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleMatch<'a> {
    pub role: &'a str,
    pub content: &'a str,
    /// Byte range of the whole construct in the scanned text.
    pub start: usize,
    pub end: usize,
}

impl Role {
    /// Roles rendered as inline literals instead of references.
    pub const LITERAL_ROLES: &'static [&'static str] = &["literal", "code"];

    fn is_name_char(c: char) -> bool {
        c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '+')
    }

    /// Tries to read `:role:`content`` at the cursor.
    pub fn try_match<'a>(cur: &Cursor<'a>) -> Option<RoleMatch<'a>> {
        if cur.peek() != Some(':') || cur.prev().is_some_and(char::is_alphanumeric) {
            return None;
        }
        let start = cur.i;
        let mut c = cur.clone();
        c.bump();
        let name_start = c.i;
        while c.peek().is_some_and(Self::is_name_char) {
            c.bump();
        }
        let role = &c.s[name_start..c.i];
        if role.is_empty() || !c.starts_with(":`") {
            return None;
        }
        c.bump_n(2);
        let content_start = c.i;
        let close = c.find("`")?;
        if close == content_start {
            return None;
        }
        Some(RoleMatch {
            role,
            content: &c.s[content_start..close],
            start,
            end: close + 1,
        })
    }

    /// Replaces role occurrences with placeholders. Roles that are neither
    /// literal nor registered reference roles are reported and left as text.
    pub fn replace(text: &str, env: &mut Environment, tokens: &mut Tokens) -> String {
        let mut cur = Cursor::new(text);
        let mut out = String::with_capacity(text.len());
        let mut copied = 0usize;

        while !cur.eof() {
            let Some(m) = Self::try_match(&cur) else {
                cur.bump();
                continue;
            };
            let payload = if Self::LITERAL_ROLES.contains(&m.role) {
                Some(TokenPayload::Literal(m.content.to_string()))
            } else {
                let reference = Self::split(m.role, m.content);
                env.found(&reference.role, &reference.target)
                    .then_some(TokenPayload::Reference(reference))
            };
            if let Some(payload) = payload {
                out.push_str(&text[copied..m.start]);
                out.push_str(&tokens.insert(env, payload));
                copied = m.end;
            }
            cur.i = m.end;
        }
        out.push_str(&text[copied..]);
        out
    }

    /// Splits `text <target#anchor>` content into its parts.
    pub fn split(role: &str, content: &str) -> CrossReference {
        let content = content.trim();
        let (text, target) = match content.strip_suffix('>').and_then(|c| c.rsplit_once('<')) {
            Some((text, target)) => {
                let text = text.trim();
                ((!text.is_empty()).then(|| text.to_string()), target.trim())
            }
            None => (None, content),
        };
        let (target, anchor) = match target.split_once('#') {
            Some((target, anchor)) => (target, Some(anchor.to_string())),
            None => (target, None),
        };
        CrossReference {
            role: role.to_string(),
            target: target.to_string(),
            text,
            anchor,
            resolved: None,
        }
    }
}
