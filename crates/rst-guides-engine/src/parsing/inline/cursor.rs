/// A cursor for the character-level pre-passes over a text run.
///
/// Cloning the cursor saves its position; assigning the clone back restores
/// it.
#[derive(Clone)]
pub struct Cursor<'a> {
    /// The string being scanned.
    pub s: &'a str,
    /// Current byte index into `s`, always on a char boundary.
    pub i: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    /// Returns true if at end of string.
    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    /// The unread remainder.
    pub fn rest(&self) -> &'a str {
        &self.s[self.i..]
    }

    /// Peeks at the current char without advancing.
    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// The char just before the cursor.
    pub fn prev(&self) -> Option<char> {
        self.s[..self.i].chars().next_back()
    }

    /// Checks if the remaining input starts with `pat`.
    pub fn starts_with(&self, pat: &str) -> bool {
        self.rest().starts_with(pat)
    }

    /// Advances by one char, returning it.
    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.i += c.len_utf8();
        Some(c)
    }

    /// Advances by `n` bytes. `n` must land on a char boundary.
    pub fn bump_n(&mut self, n: usize) {
        self.i = (self.i + n).min(self.s.len());
    }

    /// Byte offset of the next `pat` at or after the cursor.
    pub fn find(&self, pat: &str) -> Option<usize> {
        self.rest().find(pat).map(|off| self.i + off)
    }
}
