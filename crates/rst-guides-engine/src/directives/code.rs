use crate::error::DirectiveError;
use crate::models::{Code, Node, NodeKind};
use crate::parsing::Parser;

use super::{BodyMode, Directive, Invocation};

/// `.. code-block:: lang` (aliases `code`, `sourcecode`).
pub struct CodeBlockDirective;

impl Directive for CodeBlockDirective {
    fn name(&self) -> &'static str {
        "code-block"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["code", "sourcecode"]
    }

    fn body_mode(&self) -> BodyMode {
        BodyMode::Literal
    }

    fn process(
        &self,
        _parser: &mut Parser,
        invocation: Invocation,
    ) -> Result<Vec<Node>, DirectiveError> {
        let value = invocation.require_body()?;
        let language = Some(invocation.data.trim())
            .filter(|l| !l.is_empty())
            .map(str::to_string);
        let node = Node::new(NodeKind::Code(Code {
            value,
            language,
            raw: false,
        }));
        Ok(vec![node.with_options(&invocation.options)])
    }
}

/// `.. uml::` diagrams, written inline or read from the file named after `::`.
pub struct UmlDirective;

impl Directive for UmlDirective {
    fn name(&self) -> &'static str {
        "uml"
    }

    fn body_mode(&self) -> BodyMode {
        BodyMode::Literal
    }

    fn process(
        &self,
        parser: &mut Parser,
        invocation: Invocation,
    ) -> Result<Vec<Node>, DirectiveError> {
        let data = invocation.data.trim();
        let value = if data.is_empty() {
            invocation.require_body()?
        } else {
            let path = parser
                .environment()
                .canonical_path(data)
                .filter(|p| parser.origin().has(p))
                .ok_or_else(|| DirectiveError::InvalidOption {
                    option: "file".to_string(),
                    value: data.to_string(),
                })?;
            let source = parser.origin().read_to_string(&path).map_err(|source| {
                DirectiveError::IncludeUnreadable {
                    path: path.to_string(),
                    source,
                }
            })?;
            parser.environment_mut().add_dependency(path.as_str());
            source.trim_end().to_string()
        };

        let mut node = Node::new(NodeKind::Generic {
            name: "uml".to_string(),
            value,
        })
        .with_options(&invocation.options);
        if !data.is_empty() {
            node.set_option("file", data);
        }
        Ok(vec![node])
    }
}

#[cfg(test)]
mod tests {
    use crate::io::MemoryOrigin;
    use crate::models::NodeKind;
    use crate::parsing::Parser;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("code-block")]
    #[case("code")]
    #[case("sourcecode")]
    fn code_block_and_aliases(#[case] name: &str) {
        let mut parser = Parser::default();
        let doc = parser.parse(&format!(
            ".. {name}:: python\n   :linenos:\n\n   def f():\n       return `x`\n"
        ));
        let node = &doc.nodes()[0];
        let NodeKind::Code(code) = node.kind() else {
            panic!("expected code, got {node:?}");
        };
        assert_eq!(code.value, "def f():\n    return `x`");
        assert_eq!(code.language.as_deref(), Some("python"));
        assert_eq!(node.option("linenos"), Some(""));
    }

    #[test]
    fn uml_reads_inline_source() {
        let mut parser = Parser::default();
        let doc = parser.parse(".. uml::\n\n   Alice -> Bob\n");
        assert_eq!(
            doc.nodes()[0].kind(),
            &NodeKind::Generic {
                name: "uml".into(),
                value: "Alice -> Bob".into()
            }
        );
    }

    #[test]
    fn uml_reads_external_file() {
        let origin = MemoryOrigin::new()
            .with_file("docs/index.rst", ".. uml:: diagrams/flow.puml\n")
            .with_file("docs/diagrams/flow.puml", "A -> B\n");
        let mut parser = Parser::default().with_origin(origin);
        let doc = parser.parse_file("docs/index.rst").unwrap();
        let node = &doc.nodes()[0];
        assert!(matches!(node.kind(), NodeKind::Generic { value, .. } if value == "A -> B"));
        assert_eq!(node.option("file"), Some("diagrams/flow.puml"));
        assert_eq!(parser.environment().dependencies(), ["docs/diagrams/flow.puml"]);
    }
}
