use super::classify::{indentation, is_blank};

/// Raw lines accumulated by the active block state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buffer {
    lines: Vec<String>,
    /// Source line number of the first pushed line.
    first_line: usize,
}

impl Buffer {
    pub fn new(first_line: usize) -> Self {
        Self {
            lines: Vec::new(),
            first_line,
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.lines.pop()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.lines.last().map(String::as_str)
    }

    #[must_use]
    pub fn first_line(&self) -> usize {
        self.first_line
    }

    /// Lines joined with `\n`.
    #[must_use]
    pub fn joined(&self) -> String {
        self.lines.join("\n")
    }

    /// Lines joined and every whitespace run collapsed to one space.
    #[must_use]
    pub fn normalized(&self) -> String {
        normalize_whitespace(&self.lines.join(" "))
    }

    /// Removes trailing blank lines.
    pub fn trim_trailing_blanks(&mut self) {
        while self.lines.last().is_some_and(|l| is_blank(l)) {
            self.lines.pop();
        }
    }

    /// Lines with the smallest common indentation of non-blank lines removed.
    /// Blank lines come back empty.
    #[must_use]
    pub fn unindented(&self) -> Vec<String> {
        let min = self
            .lines
            .iter()
            .filter(|l| !is_blank(l))
            .map(|l| indentation(l))
            .min()
            .unwrap_or(0);
        self.lines
            .iter()
            .map(|l| {
                if is_blank(l) {
                    String::new()
                } else {
                    l[min..].trim_end().to_string()
                }
            })
            .collect()
    }
}

/// Collapses runs of whitespace into single spaces and trims the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn joined_views() {
        let mut buf = Buffer::new(3);
        buf.push("first   line");
        buf.push("  second");
        assert_eq!(buf.joined(), "first   line\n  second");
        assert_eq!(buf.normalized(), "first line second");
        assert_eq!(buf.first_line(), 3);
    }

    #[test]
    fn push_pop_clear() {
        let mut buf = Buffer::default();
        buf.push("a");
        buf.push("b");
        assert_eq!(buf.pop().as_deref(), Some("b"));
        assert_eq!(buf.len(), 1);
        buf.clear();
        assert!(buf.is_empty());
    }

    #[test]
    fn unindent_keeps_relative_indentation() {
        let mut buf = Buffer::default();
        buf.push("    fn main() {");
        buf.push("");
        buf.push("        body();");
        buf.push("    }");
        buf.push("   ");
        buf.trim_trailing_blanks();
        assert_eq!(
            buf.unindented(),
            vec!["fn main() {", "", "    body();", "}"]
        );
    }
}
