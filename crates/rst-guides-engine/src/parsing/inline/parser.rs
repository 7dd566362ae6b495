use crate::environment::{Environment, TokenIds};
use crate::parsing::blocks::buffer::normalize_whitespace;

use super::{
    kinds::{Literal, Role, StandaloneLink, Substitution, push_text},
    lexer::{SpanLexeme, TokenCursor},
    tokens::{Segment, Tokens, segments},
    types::{InlineNode, Link, LinkRef, SpanNode, TokenPayload},
};

/// Parses a text run into a [`SpanNode`].
///
/// # Passes
/// 1. Literals, roles and substitutions are swapped for placeholders, in
///    that order, so nothing inside a literal is seen by later passes.
/// 2. A token walk over the remaining text resolves phrase references,
///    simple references and internal targets. An unterminated backtick group
///    rewinds the walk and the backtick stays as text.
/// 3. Bare URLs and e-mail addresses are detected in the plain text left
///    between placeholders, then every placeholder becomes its inline node.
///
/// Named, anonymous and substitution references are resolved later, once the
/// whole document has been read.
pub fn parse_span(env: &mut Environment, text: &str) -> SpanNode {
    SpanParser::new(env).parse(text)
}

pub struct SpanParser<'e> {
    env: &'e mut Environment,
    tokens: Tokens,
}

impl<'e> SpanParser<'e> {
    pub fn new(env: &'e mut Environment) -> Self {
        Self {
            env,
            tokens: Tokens::default(),
        }
    }

    pub fn parse(mut self, text: &str) -> SpanNode {
        let working = Literal::replace(text, self.env, &mut self.tokens);
        let working = Role::replace(&working, self.env, &mut self.tokens);
        let working = Substitution::replace(&working, self.env, &mut self.tokens);
        let working = self.parse_tokens(&working);
        let content = self.assemble(&working);
        SpanNode::new(text, content)
    }

    fn parse_tokens(&mut self, text: &str) -> String {
        let mut cur = TokenCursor::new(text);
        let mut out = String::with_capacity(text.len());

        while let Some(lx) = cur.next() {
            match lx.kind {
                SpanLexeme::Backtick => self.parse_phrase(&mut cur, &mut out),
                SpanLexeme::InternalReferenceStart => self.parse_internal_target(&mut cur, &mut out),
                SpanLexeme::NamedReference | SpanLexeme::AnonymousReference => {
                    self.parse_simple_reference(lx.kind, lx.text, &cur, &mut out)
                }
                SpanLexeme::Escape => push_escaped(&mut out, lx.text),
                _ => out.push_str(lx.text),
            }
        }
        out
    }

    /// After an opening backtick: `` `phrase`_ ``, `` `phrase`__ ``, or
    /// interpreted text `` `text` `` which is kept as written.
    fn parse_phrase(&mut self, cur: &mut TokenCursor<'_>, out: &mut String) {
        let saved = cur.position();
        let mut raw = String::from("`");
        let mut phrase = String::new();

        loop {
            let Some(lx) = cur.next() else {
                cur.reset(saved);
                out.push('`');
                return;
            };
            raw.push_str(lx.text);
            match lx.kind {
                SpanLexeme::Backtick => {
                    out.push_str(&raw);
                    return;
                }
                SpanLexeme::NamedReferenceEnd | SpanLexeme::AnonymousReferenceEnd => {
                    if phrase.trim().is_empty() || followed_by_word(cur) {
                        out.push_str(&raw);
                    } else {
                        let anonymous = lx.kind == SpanLexeme::AnonymousReferenceEnd;
                        let placeholder = self.phrase_reference(&phrase, anonymous);
                        out.push_str(&placeholder);
                    }
                    return;
                }
                SpanLexeme::Escape => push_escaped(&mut phrase, lx.text),
                _ => phrase.push_str(lx.text),
            }
        }
    }

    fn phrase_reference(&mut self, phrase: &str, anonymous: bool) -> String {
        let phrase = self.expand_placeholders(phrase);
        let (text, url) = split_embedded(&phrase);

        let link = match url {
            Some(url) if is_alias(&url) => {
                let alias = url.trim_end_matches('_').to_string();
                Link {
                    text: if text.is_empty() { alias.clone() } else { text },
                    reference: LinkRef::Named(alias),
                    url: None,
                }
            }
            Some(url) => {
                if !anonymous && !text.is_empty() {
                    self.env.set_link(&text, &url);
                }
                Link {
                    text: if text.is_empty() { url.clone() } else { text },
                    reference: LinkRef::Url(url.clone()),
                    url: Some(url),
                }
            }
            None if anonymous => Link {
                text,
                reference: LinkRef::Anonymous(self.env.next_anonymous_index()),
                url: None,
            },
            None => Link {
                reference: LinkRef::Named(text.clone()),
                text,
                url: None,
            },
        };
        self.tokens.insert(self.env, TokenPayload::Link(link))
    }

    /// `` _`name` `` declares an inline anchor.
    fn parse_internal_target(&mut self, cur: &mut TokenCursor<'_>, out: &mut String) {
        let saved = cur.position();
        let mut name = String::new();

        loop {
            match cur.next() {
                Some(lx) if lx.kind == SpanLexeme::Backtick => break,
                Some(lx) if lx.kind == SpanLexeme::Escape => push_escaped(&mut name, lx.text),
                Some(lx)
                    if !matches!(
                        lx.kind,
                        SpanLexeme::NamedReferenceEnd | SpanLexeme::AnonymousReferenceEnd
                    ) =>
                {
                    name.push_str(lx.text)
                }
                _ => {
                    cur.reset(saved);
                    out.push_str("_`");
                    return;
                }
            }
        }

        let name = normalize_whitespace(&self.expand_placeholders(&name));
        if name.is_empty() {
            out.push_str("_``");
            return;
        }
        let anchor = self.env.add_anchor(&name, None);
        let placeholder = self
            .tokens
            .insert(self.env, TokenPayload::Target { name, anchor });
        out.push_str(&placeholder);
    }

    /// `name_` or `name__`. Reference names may contain single internal
    /// `-`, `.`, `_`, `+` or `:` between alphanumerics; the lexer splits those
    /// off, so the preceding part is pulled back out of `out`.
    fn parse_simple_reference(
        &mut self,
        kind: SpanLexeme,
        text: &str,
        cur: &TokenCursor<'_>,
        out: &mut String,
    ) {
        if followed_by_word(cur) {
            out.push_str(text);
            return;
        }
        let tail = glued_tail(out);
        let before = out[..out.len() - tail.len()].chars().next_back();
        if before.is_some_and(|c| c == '_' || c.is_alphanumeric()) {
            out.push_str(text);
            return;
        }

        let name = format!("{tail}{}", text.trim_end_matches('_'));
        out.truncate(out.len() - tail.len());
        let reference = if kind == SpanLexeme::AnonymousReference {
            LinkRef::Anonymous(self.env.next_anonymous_index())
        } else {
            LinkRef::Named(name.clone())
        };
        let placeholder = self.tokens.insert(
            self.env,
            TokenPayload::Link(Link {
                text: name,
                reference,
                url: None,
            }),
        );
        out.push_str(&placeholder);
    }

    /// Replaces placeholders inside link text with their plain text.
    fn expand_placeholders(&mut self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for segment in segments(text) {
            match segment {
                Segment::Text(t) => out.push_str(t),
                Segment::Token(id) => match self.tokens.take(id) {
                    Some(token) => out.push_str(&token.into_inline().plain_text()),
                    None => out.push_str(&TokenIds::placeholder(id)),
                },
            }
        }
        out
    }

    fn assemble(&mut self, working: &str) -> Vec<InlineNode> {
        let mut out = vec![];
        for segment in segments(working) {
            match segment {
                Segment::Text(text) => StandaloneLink::split(text, &mut out),
                Segment::Token(id) => match self.tokens.take(id) {
                    Some(token) => out.push(token.into_inline()),
                    None => push_text(&mut out, &TokenIds::placeholder(id)),
                },
            }
        }
        out
    }
}

fn followed_by_word(cur: &TokenCursor<'_>) -> bool {
    cur.peek().is_some_and(|next| {
        matches!(
            next.kind,
            SpanLexeme::Word
                | SpanLexeme::NamedReference
                | SpanLexeme::AnonymousReference
                | SpanLexeme::Placeholder
        )
    })
}

/// Trailing characters of `out` that belong to a reference name, starting
/// at an alphanumeric.
fn glued_tail(out: &str) -> &str {
    let is_name_char = |c: char| c.is_alphanumeric() || matches!(c, '-' | '.' | '_' | '+' | ':');
    let start = out
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_name_char(*c))
        .last()
        .map_or(out.len(), |(i, _)| i);
    let tail = &out[start..];
    if tail.ends_with("__") {
        return "";
    }
    tail.trim_start_matches(|c: char| !c.is_alphanumeric())
}

/// Splits `text <url>` into normalized text and the URL with whitespace
/// removed.
fn split_embedded(phrase: &str) -> (String, Option<String>) {
    let trimmed = phrase.trim();
    if let Some(inner) = trimmed.strip_suffix('>')
        && let Some(open) = inner.rfind('<')
        && (open == 0 || inner[..open].ends_with(char::is_whitespace))
    {
        let url: String = inner[open + 1..].split_whitespace().collect();
        if !url.is_empty() {
            return (normalize_whitespace(&inner[..open]), Some(url));
        }
    }
    (normalize_whitespace(trimmed), None)
}

fn is_alias(url: &str) -> bool {
    url.ends_with('_') && !url.ends_with("__") && !url.contains(['/', ':', '#'])
}

/// Backslash escapes drop the backslash; an escaped space disappears.
fn push_escaped(out: &mut String, escape: &str) {
    if let Some(c) = escape.chars().nth(1)
        && !c.is_whitespace()
    {
        out.push(c);
    }
}
