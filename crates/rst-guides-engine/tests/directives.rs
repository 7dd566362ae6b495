use std::collections::BTreeMap;

use rst_guides_engine::parsing::snapshot::outline_string;
use rst_guides_engine::{
    BodyMode, Directive, DirectiveError, Invocation, Node, NodeKind, Parser, ParserConfig,
};

use pretty_assertions::assert_eq;

/// Counts the words of its body and discards the text.
struct WordCount;

impl Directive for WordCount {
    fn name(&self) -> &'static str {
        "word-count"
    }

    fn body_mode(&self) -> BodyMode {
        BodyMode::Literal
    }

    fn process(
        &self,
        _parser: &mut Parser,
        invocation: Invocation,
    ) -> Result<Vec<Node>, DirectiveError> {
        let words = invocation.require_body()?.split_whitespace().count();
        Ok(vec![Node::new(NodeKind::Generic {
            name: "word-count".into(),
            value: words.to_string(),
        })])
    }
}

#[test]
fn custom_directive_with_configured_alias() {
    let config = ParserConfig {
        directive_aliases: BTreeMap::from([("wc".to_string(), "word-count".to_string())]),
        ..ParserConfig::default()
    };
    // Aliases are applied when the parser is built, so they must name built-ins.
    let mut parser = Parser::new(config).with_directive(WordCount);
    let doc = parser.parse(".. word-count::\n\n   one two three\n");
    assert_eq!(
        doc.nodes()[0].kind(),
        &NodeKind::Generic {
            name: "word-count".into(),
            value: "3".into()
        }
    );

    let doc = parser.parse(".. wc::\n\n   one\n");
    assert_eq!(doc.nodes()[0].name(), "error");
}

#[test]
fn configured_alias_for_builtin() {
    let config = ParserConfig {
        directive_aliases: BTreeMap::from([("callout".to_string(), "tip".to_string())]),
        ..ParserConfig::default()
    };
    let mut parser = Parser::new(config);
    let doc = parser.parse(".. callout:: Use the cache.\n");
    insta::assert_snapshot!(outline_string(doc.nodes()), @r#"
    admonition tip "Tip"
      paragraph "Use the cache."
    "#);
}

#[test]
fn directives_compose() {
    let mut parser = Parser::default();
    let doc = parser.parse(
        "\
.. container:: panel

   .. figure:: /img/flow.png
      :alt: Flow

      The |product| pipeline.

   .. raw:: html

      <hr>

.. |product| replace:: **Acme**
",
    );
    insta::assert_snapshot!(outline_string(doc.nodes()), @r#"
    container .panel
      figure img/flow.png
        paragraph "The **Acme** pipeline."
          substitution |product|
      raw "<hr>"
    "#);
    assert!(parser.environment().diagnostics().is_empty());
}

#[test]
fn substitution_images_become_inline_images() {
    let mut parser = Parser::default();
    let doc = parser.parse("Press |btn| to start.\n\n.. |btn| image:: start.png\n   :alt: Start\n");
    let NodeKind::Paragraph(span) = doc.nodes()[0].kind() else {
        panic!("expected paragraph");
    };
    assert_eq!(span.plain_text(), "Press Start to start.");
}
