use std::fmt;

use crate::environment::TokenIds;
use crate::models::{Node, NodeKind};
use crate::parsing::inline::InlineNode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A `SectionEnd` with no matching open `SectionBegin`.
    UnopenedSection(String),
    /// A `SectionBegin` never closed in the same node list.
    UnclosedSection(String),
    /// A placeholder id survived inline parsing.
    LeakedPlaceholder(String),
    /// A title with level 0.
    TitleWithoutLevel(String),
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnopenedSection(id) => write!(f, "section {id} closed but never opened"),
            Self::UnclosedSection(id) => write!(f, "section {id} opened but never closed"),
            Self::LeakedPlaceholder(text) => write!(f, "placeholder leaked into {text:?}"),
            Self::TitleWithoutLevel(text) => write!(f, "title {text:?} has no level"),
        }
    }
}

/// Structural checks every parsed tree passes: section markers nest within
/// each node list and no placeholder id is left in any text.
pub fn check_invariants(nodes: &[Node]) -> Result<(), Vec<InvariantViolation>> {
    let mut violations = vec![];
    check_list(nodes, &mut violations);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

fn check_list(nodes: &[Node], violations: &mut Vec<InvariantViolation>) {
    let mut open: Vec<&str> = vec![];
    for node in nodes {
        match node.kind() {
            NodeKind::SectionBegin { title } => open.push(title),
            NodeKind::SectionEnd { title } => {
                if open.last() == Some(&title.as_str()) {
                    open.pop();
                } else {
                    violations.push(InvariantViolation::UnopenedSection(title.clone()));
                }
            }
            NodeKind::Title(title) if title.level == 0 => violations.push(
                InvariantViolation::TitleWithoutLevel(title.text.plain_text()),
            ),
            _ => {}
        }

        node.for_each_own_span(&mut |span| {
            for inline in span.content() {
                check_inline(inline, violations);
            }
        });
        if let NodeKind::Raw(text) | NodeKind::Generic { value: text, .. } = node.kind() {
            check_text(text, violations);
        }
        if let NodeKind::Code(code) = node.kind() {
            check_text(&code.value, violations);
        }

        match node.kind() {
            NodeKind::List(list) => {
                for item in &list.items {
                    check_list(&item.contents, violations);
                }
            }
            NodeKind::DefinitionList(items) => {
                for item in items {
                    check_list(&item.definition, violations);
                }
            }
            NodeKind::BlockQuote(children) | NodeKind::Container(children) => {
                check_list(children, violations)
            }
            NodeKind::Admonition(a) => check_list(&a.body, violations),
            NodeKind::Figure(f) => check_list(&f.caption, violations),
            _ => {}
        }
    }
    for id in open {
        violations.push(InvariantViolation::UnclosedSection(id.to_string()));
    }
}

fn check_inline(inline: &InlineNode, violations: &mut Vec<InvariantViolation>) {
    match inline {
        InlineNode::Text(text) | InlineNode::Literal(text) => check_text(text, violations),
        InlineNode::Link(link) => {
            check_text(&link.text, violations);
            if let Some(url) = &link.url {
                check_text(url, violations);
            }
        }
        InlineNode::Reference(r) => check_text(&r.target, violations),
        InlineNode::Target { name, .. } => check_text(name, violations),
        InlineNode::Substitution { name, value } => {
            check_text(name, violations);
            for node in value.iter().flatten() {
                check_inline(node, violations);
            }
        }
        InlineNode::Image { uri, .. } => check_text(uri, violations),
    }
}

fn check_text(text: &str, violations: &mut Vec<InvariantViolation>) {
    if text.contains([TokenIds::OPEN, TokenIds::CLOSE]) {
        violations.push(InvariantViolation::LeakedPlaceholder(text.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::Parser;
    use crate::parsing::inline::SpanNode;
    use pretty_assertions::assert_eq;

    #[test]
    fn parsed_documents_pass() {
        let mut parser = Parser::default();
        let doc = parser.parse(
            "Aa\n==\n\nBb\n--\n\nText ``lit`` and `x <http://x.example>`_.\n\nCc\n==\n\n   Quote\n   -----\n",
        );
        assert_eq!(check_invariants(doc.nodes()), Ok(()));
    }

    #[test]
    fn unbalanced_sections_are_reported() {
        let nodes = vec![
            Node::new(NodeKind::SectionEnd { title: "title.9".into() }),
            Node::new(NodeKind::SectionBegin { title: "title.1".into() }),
        ];
        assert_eq!(
            check_invariants(&nodes),
            Err(vec![
                InvariantViolation::UnopenedSection("title.9".into()),
                InvariantViolation::UnclosedSection("title.1".into()),
            ])
        );
    }

    #[test]
    fn leaked_placeholders_are_reported() {
        let leaked = format!("x{}1{}", TokenIds::OPEN, TokenIds::CLOSE);
        let nodes = vec![Node::paragraph(SpanNode::text(leaked.clone()))];
        assert_eq!(
            check_invariants(&nodes),
            Err(vec![InvariantViolation::LeakedPlaceholder(leaked)])
        );
    }
}
