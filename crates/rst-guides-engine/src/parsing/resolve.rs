//! End-of-document resolution.
//!
//! Named and anonymous references and substitutions may point forward, so
//! they are only resolved once every block of the document has been read.

use crate::environment::{Environment, alias_of};
use crate::models::{Node, NodeKind};
use crate::parsing::inline::{InlineNode, LinkRef};

/// Resolves links and substitutions in every span of `nodes`.
pub fn resolve(nodes: &mut [Node], env: &mut Environment) {
    for node in nodes.iter_mut() {
        node.for_each_span_mut(&mut |span| resolve_inline(span.content_mut(), env, 0));
    }

    let (targets, uses) = env.anonymous_counts();
    if targets > uses {
        env.warning(format!(
            "{targets} anonymous targets declared but only {uses} anonymous references used"
        ));
    }
}

/// Substitutions may contain substitutions; this bounds the expansion.
const MAX_SUBSTITUTION_DEPTH: usize = 8;

fn resolve_inline(content: &mut Vec<InlineNode>, env: &mut Environment, depth: usize) {
    let report = !env.config().ignore_invalid_references;

    for inline in content.iter_mut() {
        match inline {
            InlineNode::Link(link) if link.url.is_none() => match &link.reference {
                LinkRef::Url(url) => link.url = Some(url.clone()),
                LinkRef::Named(name) => {
                    link.url = env.resolve_link(name);
                    if link.url.is_none() && report {
                        env.error(format!("Unknown link target \"{name}\""));
                    }
                }
                LinkRef::Anonymous(index) => {
                    let index = *index;
                    link.url = env
                        .anonymous_target(index)
                        .and_then(|target| match alias_of(target) {
                            Some(alias) => env.resolve_link(alias),
                            None => Some(target.to_string()),
                        });
                    if link.url.is_none() && report {
                        env.error(format!(
                            "Anonymous reference #{} has no matching target",
                            index + 1
                        ));
                    }
                }
            },
            InlineNode::Substitution { name, value } if value.is_none() => {
                let expanded = env.variable(name).map(substitution_content);
                match expanded {
                    Some(mut nodes) => {
                        if depth < MAX_SUBSTITUTION_DEPTH {
                            resolve_inline(&mut nodes, env, depth + 1);
                        }
                        *value = Some(nodes);
                    }
                    None if report => {
                        env.error(format!("Undefined substitution referenced: \"{name}\""))
                    }
                    None => {}
                }
            }
            _ => {}
        }
    }
}

/// Inline content of a substitution variable's nodes.
fn substitution_content(nodes: &[Node]) -> Vec<InlineNode> {
    let mut out = vec![];
    for node in nodes {
        match node.kind() {
            NodeKind::Paragraph(span) => out.extend(span.content().iter().cloned()),
            NodeKind::Image(image) => out.push(InlineNode::Image {
                uri: image.uri.clone(),
                alt: node.option("alt").map(str::to_string),
            }),
            NodeKind::Generic { value, .. } => out.push(InlineNode::Text(value.clone())),
            NodeKind::Raw(raw) => out.push(InlineNode::Text(raw.clone())),
            NodeKind::Code(code) => out.push(InlineNode::Literal(code.value.clone())),
            NodeKind::BlockQuote(inner) | NodeKind::Container(inner) => {
                out.extend(substitution_content(inner))
            }
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use crate::models::NodeKind;
    use crate::parsing::Parser;
    use crate::parsing::inline::{InlineNode, Link};
    use pretty_assertions::assert_eq;
    use rst_guides_config::ParserConfig;

    fn links(parser: &mut Parser, text: &str) -> Vec<Link> {
        let doc = parser.parse(text);
        let mut out = vec![];
        doc.walk(&mut |node, _| node.for_each_own_span(&mut |span| out.extend(span.links().cloned())));
        out
    }

    #[test]
    fn forward_named_reference() {
        let mut parser = Parser::default();
        let found = links(&mut parser, "See Python_.\n\n.. _Python: https://python.org\n");
        assert_eq!(found[0].url.as_deref(), Some("https://python.org"));
        assert_eq!(parser.environment().errors().count(), 0);
    }

    #[test]
    fn alias_targets_are_followed() {
        let mut parser = Parser::default();
        let found = links(
            &mut parser,
            "Use py_.\n\n.. _py: Python_\n.. _Python: https://python.org\n",
        );
        assert_eq!(found[0].url.as_deref(), Some("https://python.org"));
    }

    #[test]
    fn anonymous_references_are_fifo() {
        let mut parser = Parser::default();
        let found = links(
            &mut parser,
            "`second use`__ then first__\n\n__ http://a.example\n__ http://b.example\n",
        );
        let urls: Vec<_> = found.iter().map(|l| l.url.as_deref()).collect();
        assert_eq!(urls, vec![Some("http://a.example"), Some("http://b.example")]);
    }

    #[test]
    fn anonymous_underflow_is_reported() {
        let mut parser = Parser::default();
        let found = links(&mut parser, "one__ and two__\n\n__ http://a.example\n");
        assert_eq!(found[1].url, None);
        assert_eq!(parser.environment().errors().count(), 1);
    }

    #[test]
    fn dangling_reference_is_reported_unless_ignored() {
        let mut parser = Parser::default();
        links(&mut parser, "missing_\n");
        assert_eq!(parser.environment().errors().count(), 1);

        let mut quiet = Parser::new(ParserConfig {
            ignore_invalid_references: true,
            ..ParserConfig::default()
        });
        links(&mut quiet, "missing_\n");
        assert_eq!(quiet.environment().errors().count(), 0);
    }

    #[test]
    fn substitutions_are_expanded() {
        let mut parser = Parser::default();
        let doc = parser.parse(
            "Version |version| with |logo|.\n\n\
             .. |version| replace:: 1.2 `docs <http://d.example>`_\n\
             .. |logo| image:: /img/logo.png\n",
        );
        let NodeKind::Paragraph(span) = doc.nodes()[0].kind() else {
            panic!("expected paragraph, got {:?}", doc.nodes()[0]);
        };
        assert_eq!(span.plain_text(), "Version 1.2 docs with .");
        let InlineNode::Substitution { value: Some(logo), .. } = &span.content()[3] else {
            panic!("expected substitution, got {:?}", span.content());
        };
        assert_eq!(
            logo,
            &vec![InlineNode::Image {
                uri: "img/logo.png".into(),
                alt: None
            }]
        );
        assert_eq!(parser.environment().errors().count(), 0);
    }

    #[test]
    fn undefined_substitution_is_reported() {
        let mut parser = Parser::default();
        parser.parse("A |nothing| here\n");
        let errors: Vec<_> = parser
            .environment()
            .errors()
            .map(|d| d.message.clone())
            .collect();
        assert_eq!(errors, vec!["Undefined substitution referenced: \"nothing\""]);
    }
}
