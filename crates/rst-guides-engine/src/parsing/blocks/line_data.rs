//! Splits a buffered definition list into terms and definitions.

use super::buffer::Buffer;
use super::classify::{indentation, is_blank};

/// Separator between a term and its classifiers: `term : classifier`.
pub const CLASSIFIER_DELIMITER: &str = " : ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionEntry {
    pub term: String,
    pub classifiers: Vec<String>,
    /// Definition lines with their common indentation removed.
    pub definition: Vec<String>,
    /// Source line of the term.
    pub line: usize,
}

/// Groups the buffered lines of a definition list into entries. Every
/// non-indented line opens a new term; the indented lines below it form its
/// definition.
pub fn split_definition_list(buffer: &Buffer) -> Vec<DefinitionEntry> {
    let mut entries: Vec<(DefinitionEntry, Buffer)> = vec![];

    for (i, line) in buffer.lines().iter().enumerate() {
        let number = buffer.first_line() + i;
        if !is_blank(line) && indentation(line) == 0 {
            let (term, classifiers) = split_term(line);
            entries.push((
                DefinitionEntry {
                    term,
                    classifiers,
                    definition: vec![],
                    line: number,
                },
                Buffer::new(number + 1),
            ));
        } else if let Some((_, body)) = entries.last_mut() {
            body.push(line.as_str());
        }
    }

    entries
        .into_iter()
        .map(|(mut entry, mut body)| {
            body.trim_trailing_blanks();
            entry.definition = body.unindented();
            entry
        })
        .collect()
}

/// Splits `term : classifier : other` into the term and its classifiers.
pub fn split_term(line: &str) -> (String, Vec<String>) {
    let mut parts = line.trim().split(CLASSIFIER_DELIMITER).map(str::trim);
    let term = parts.next().unwrap_or_default().to_string();
    let classifiers = parts
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();
    (term, classifiers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("term", "term", vec![])]
    #[case("term : string", "term", vec!["string"])]
    #[case("term : a : b", "term", vec!["a", "b"])]
    #[case("a:b", "a:b", vec![])]
    fn terms_and_classifiers(
        #[case] line: &str,
        #[case] term: &str,
        #[case] classifiers: Vec<&str>,
    ) {
        let (t, c) = split_term(line);
        assert_eq!(t, term);
        assert_eq!(c, classifiers);
    }

    #[test]
    fn groups_definitions_under_terms() {
        let mut buf = Buffer::new(4);
        for line in [
            "apple",
            "   A fruit.",
            "",
            "   Often red.",
            "",
            "carrot : vegetable",
            "   Orange.",
            "",
        ] {
            buf.push(line);
        }

        let entries = split_definition_list(&buf);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].term, "apple");
        assert_eq!(entries[0].line, 4);
        assert_eq!(entries[0].definition, vec!["A fruit.", "", "Often red."]);
        assert_eq!(entries[1].term, "carrot");
        assert_eq!(entries[1].classifiers, vec!["vegetable"]);
        assert_eq!(entries[1].definition, vec!["Orange."]);
        assert_eq!(entries[1].line, 9);
    }
}
