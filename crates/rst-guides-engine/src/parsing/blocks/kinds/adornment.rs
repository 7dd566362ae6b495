/// Section adornment lines (`=====`, `-----`, `~~~~~`).
///
/// All knowledge about which punctuation may adorn a title lives here.
pub struct Adornment;

impl Adornment {
    /// Characters allowed in a section adornment.
    pub const LETTERS: &'static [char] = &[
        '=', '-', '~', '*', '+', '^', '"', '.', '`', '\'', '_', '#', ':', '!', '$', '%', '&',
        ',', '/', ';', '<', '>', '?', '@', '\\', '|', '(', ')', '[', ']', '{', '}',
    ];

    /// Shortest run that counts as an adornment.
    pub const MIN_LEN: usize = 2;

    /// Returns the adornment character if the trimmed line is one repeated
    /// adornment letter of at least [`Self::MIN_LEN`] characters.
    pub fn letter(line: &str) -> Option<char> {
        let trimmed = line.trim();
        let mut chars = trimmed.chars();
        let first = chars.next()?;
        if !Self::LETTERS.contains(&first) {
            return None;
        }
        let mut count = 1usize;
        for ch in chars {
            if ch != first {
                return None;
            }
            count += 1;
        }
        (count >= Self::MIN_LEN).then_some(first)
    }

    /// True if `adornment` is long enough to underline `text`.
    pub fn covers(text: &str, adornment: &str) -> bool {
        adornment.trim().chars().count() >= text.trim().chars().count()
    }
}
