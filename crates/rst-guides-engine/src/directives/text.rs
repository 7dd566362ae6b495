use crate::error::DirectiveError;
use crate::models::{Node, NodeKind};
use crate::parsing::Parser;

use super::{BodyMode, Directive, Invocation};

/// `.. |name| replace:: text` binds inline text to a substitution.
pub struct ReplaceDirective;

impl Directive for ReplaceDirective {
    fn name(&self) -> &'static str {
        "replace"
    }

    fn body_mode(&self) -> BodyMode {
        BodyMode::Literal
    }

    fn process(
        &self,
        parser: &mut Parser,
        invocation: Invocation,
    ) -> Result<Vec<Node>, DirectiveError> {
        if invocation.variable.is_none() {
            return Err(DirectiveError::MissingVariable {
                directive: invocation.name,
            });
        }
        let text = std::iter::once(invocation.data.as_str())
            .chain(invocation.body.iter().map(String::as_str))
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if text.is_empty() {
            return Err(DirectiveError::MissingData {
                directive: invocation.name,
            });
        }
        Ok(vec![Node::paragraph(parser.parse_span(&text))])
    }
}

/// `.. title:: Text` sets the document's meta title.
pub struct TitleDirective;

impl Directive for TitleDirective {
    fn name(&self) -> &'static str {
        "title"
    }

    fn body_mode(&self) -> BodyMode {
        BodyMode::None
    }

    fn process(
        &self,
        parser: &mut Parser,
        invocation: Invocation,
    ) -> Result<Vec<Node>, DirectiveError> {
        let title = invocation.require_data()?;
        parser.environment_mut().set_meta_title(title);
        Ok(vec![])
    }
}

/// `.. meta::` with `:key: value` options recorded as document metadata.
pub struct MetaDirective;

impl Directive for MetaDirective {
    fn name(&self) -> &'static str {
        "meta"
    }

    fn body_mode(&self) -> BodyMode {
        BodyMode::None
    }

    fn process(
        &self,
        parser: &mut Parser,
        invocation: Invocation,
    ) -> Result<Vec<Node>, DirectiveError> {
        for (key, value) in &invocation.options {
            parser.environment_mut().set_meta(key, value);
        }
        Ok(vec![])
    }
}

/// `.. raw:: format` passes its body through untouched.
pub struct RawDirective;

impl Directive for RawDirective {
    fn name(&self) -> &'static str {
        "raw"
    }

    fn body_mode(&self) -> BodyMode {
        BodyMode::Literal
    }

    fn process(
        &self,
        _parser: &mut Parser,
        invocation: Invocation,
    ) -> Result<Vec<Node>, DirectiveError> {
        let payload = invocation.require_body()?;
        let mut node = Node::new(NodeKind::Raw(payload)).with_options(&invocation.options);
        let format = invocation.data.trim();
        if !format.is_empty() {
            node.set_option("format", format);
        }
        Ok(vec![node])
    }
}

#[cfg(test)]
mod tests {
    use crate::models::NodeKind;
    use crate::parsing::Parser;
    use pretty_assertions::assert_eq;

    #[test]
    fn replace_needs_a_variable() {
        let mut parser = Parser::default();
        let doc = parser.parse(".. replace:: text\n");
        assert_eq!(doc.nodes()[0].name(), "error");
    }

    #[test]
    fn replace_joins_continuation_lines() {
        let mut parser = Parser::default();
        let doc = parser.parse("|name|\n\n.. |name| replace:: Read\n   the docs\n");
        let NodeKind::Paragraph(span) = doc.nodes()[0].kind() else {
            panic!("expected paragraph");
        };
        assert_eq!(span.plain_text(), "Read the docs");
    }

    #[test]
    fn meta_and_title_record_metadata() {
        let mut parser = Parser::default();
        let doc = parser.parse(".. title:: Install Guide\n\n.. meta::\n   :keywords: setup, install\n   :robots: noindex\n");
        assert!(doc.nodes().is_empty());
        let env = parser.environment();
        assert_eq!(env.meta_title(), Some("Install Guide"));
        assert_eq!(env.metas().get("keywords").map(String::as_str), Some("setup, install"));
        assert_eq!(env.metas().len(), 2);
    }

    #[test]
    fn raw_keeps_payload_verbatim() {
        let mut parser = Parser::default();
        let doc = parser.parse(".. raw:: html\n\n   <div class=\"x\">\n     *not emphasis*\n   </div>\n");
        let node = &doc.nodes()[0];
        assert_eq!(
            node.kind(),
            &NodeKind::Raw("<div class=\"x\">\n  *not emphasis*\n</div>".to_string())
        );
        assert_eq!(node.option("format"), Some("html"));
    }
}
