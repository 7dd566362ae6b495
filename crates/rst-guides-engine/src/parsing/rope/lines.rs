use xi_rope::Rope;

use super::span::Span;

/// A reference to a single source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRef {
    /// Byte span of this line in the rope (includes the newline if present).
    pub span: Span,
    /// 1-based line number.
    pub number: usize,
    /// Line text without its line ending, tabs expanded to spaces.
    pub text: String,
}

/// Returns an iterator over lines with their byte spans.
///
/// Uses `lines_raw` so spans stay exact even for CRLF input; the stored text
/// has its line ending removed.
pub fn lines_with_spans(rope: &Rope, tab_width: usize) -> impl Iterator<Item = LineRef> + '_ {
    let mut offset = 0usize;
    rope.lines_raw(..).enumerate().map(move |(idx, line)| {
        let start = offset;
        offset += line.len();
        LineRef {
            span: Span { start, end: offset },
            number: idx + 1,
            text: expand_tabs(line.trim_end_matches(['\r', '\n']), tab_width),
        }
    })
}

/// Replaces tabs with spaces up to the next multiple of `tab_width`.
pub fn expand_tabs(line: &str, tab_width: usize) -> String {
    if !line.contains('\t') || tab_width == 0 {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len() + tab_width);
    let mut column = 0usize;
    for ch in line.chars() {
        if ch == '\t' {
            let pad = tab_width - (column % tab_width);
            out.extend(std::iter::repeat_n(' ', pad));
            column += pad;
        } else {
            out.push(ch);
            column += 1;
        }
    }
    out
}

/// Peekable, rewindable sequence of source lines.
///
/// The block driver only ever looks one or two lines ahead; `position` and
/// `reset` exist for callers that want to try a parse and roll back.
#[derive(Debug, Clone, Default)]
pub struct Lines {
    lines: Vec<LineRef>,
    pos: usize,
}

impl Lines {
    pub fn from_rope(rope: &Rope, tab_width: usize) -> Self {
        Self {
            lines: lines_with_spans(rope, tab_width).collect(),
            pos: 0,
        }
    }

    /// Builds a line sequence from already split text, numbering lines from
    /// `first_line`.
    pub fn from_text(text: &str, first_line: usize, tab_width: usize) -> Self {
        let rope = Rope::from(text);
        let mut lines = Self::from_rope(&rope, tab_width);
        for line in &mut lines.lines {
            line.number += first_line.saturating_sub(1);
        }
        lines
    }

    #[must_use]
    pub fn current(&self) -> Option<&LineRef> {
        self.lines.get(self.pos)
    }

    /// Looks `n` lines past the current one without consuming anything.
    #[must_use]
    pub fn peek_n(&self, n: usize) -> Option<&LineRef> {
        self.lines.get(self.pos + n)
    }

    #[must_use]
    pub fn peek(&self) -> Option<&LineRef> {
        self.peek_n(1)
    }

    pub fn advance(&mut self) {
        if self.pos < self.lines.len() {
            self.pos += 1;
        }
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn reset(&mut self, pos: usize) {
        self.pos = pos.min(self.lines.len());
    }

    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.lines.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
