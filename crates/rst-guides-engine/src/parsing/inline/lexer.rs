//! # Span Lexer
//!
//! Breaks a text run into the atoms the span parser cares about, using the
//! [Logos] lexer generator. Every byte of the input lands in exactly one
//! lexeme; bytes Logos cannot classify come back as [`SpanLexeme::Text`].
//!
//! Literals, roles and substitutions are already placeholders by the time
//! this runs, so the lexer only has to know about backtick groups, simple
//! references and the embedded URL brackets.
//!
//! [Logos]: https://docs.rs/logos

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanLexeme {
    #[regex(r"\s+")]
    Whitespace,

    /// Opens or closes interpreted text / a phrase reference.
    #[token("`")]
    Backtick,

    /// `` `_ `` closes a named phrase reference.
    #[token("`_")]
    NamedReferenceEnd,

    /// `` `__ `` closes an anonymous phrase reference.
    #[token("`__")]
    AnonymousReferenceEnd,

    /// ``_` `` opens an internal target.
    #[token("_`")]
    InternalReferenceStart,

    #[token("<")]
    EmbeddedUrlStart,

    #[token(">")]
    EmbeddedUrlEnd,

    /// `word_`
    #[regex(r"[0-9A-Za-z]+_")]
    NamedReference,

    /// `word__`
    #[regex(r"[0-9A-Za-z]+__")]
    AnonymousReference,

    #[regex(r"[0-9A-Za-z]+")]
    Word,

    #[regex(r"_+")]
    Underscores,

    /// Backslash escape with the escaped char, if any.
    #[regex(r"\\[^\n\x{E000}]?")]
    Escape,

    /// A token placeholder inserted by an earlier pass.
    #[regex(r"\x{E000}[0-9a-f]+\x{E001}")]
    Placeholder,

    /// Anything else, grouped into runs.
    #[regex(r"[^\s0-9A-Za-z_<>`\\\x{E000}\x{E001}]+")]
    Text,
}

/// A lexed atom with its source slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lexeme<'a> {
    pub kind: SpanLexeme,
    pub text: &'a str,
}

/// Lex the input into a sequence of lexemes.
pub fn lex(input: &str) -> Vec<Lexeme<'_>> {
    let mut lexemes = Vec::new();
    let mut lexer = SpanLexeme::lexer(input);

    while let Some(result) = lexer.next() {
        let text = lexer.slice();
        let kind = result.unwrap_or(SpanLexeme::Text);
        lexemes.push(Lexeme { kind, text });
    }

    lexemes
}

/// Index cursor over lexemes with explicit save/restore for backtracking.
#[derive(Debug, Clone)]
pub struct TokenCursor<'a> {
    lexemes: Vec<Lexeme<'a>>,
    pos: usize,
}

impl<'a> TokenCursor<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            lexemes: lex(input),
            pos: 0,
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<Lexeme<'a>> {
        let lexeme = self.lexemes.get(self.pos).copied()?;
        self.pos += 1;
        Some(lexeme)
    }

    /// The lexeme `next` would return.
    #[must_use]
    pub fn peek(&self) -> Option<Lexeme<'a>> {
        self.lexemes.get(self.pos).copied()
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn reset(&mut self, pos: usize) {
        self.pos = pos.min(self.lexemes.len());
    }
}
