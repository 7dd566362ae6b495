//! # Directives
//!
//! `.. name:: data` blocks are handed to a [`Directive`] looked up by name
//! (or alias) in a [`DirectiveRegistry`]. The dispatcher parses the body
//! the way the handler asks for, applies the options every directive
//! understands (`:class:` and `:name:`) and binds the result to a
//! substitution variable when the directive was written as `.. |var| name::`.
//!
//! ## Modules
//!
//! - **`admonition`**: `note`, `warning` and the rest of the callout family
//! - **`image`**: `image` and `figure`
//! - **`include`**: splicing another source file into the document
//! - **`container`**: `container`/`div`, `wrap` and `class`
//! - **`toctree`**: table-of-contents declarations
//! - **`text`**: `replace`, `title`, `meta` and `raw`
//! - **`code`**: `code-block` and `uml`

pub mod admonition;
pub mod code;
pub mod container;
pub mod image;
pub mod include;
pub mod text;
pub mod toctree;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use log::debug;

use crate::error::DirectiveError;
use crate::models::{Node, NodeKind};
use crate::parsing::Parser;
use crate::parsing::blocks::states::DirectiveState;

/// How the indented body under a directive is handed to its handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyMode {
    /// Raw lines with the common indentation removed.
    Literal,
    /// Parsed as a nested document; the handler gets a `Container` node.
    Nested,
    /// The directive takes no body.
    None,
}

/// One use of a directive, as seen by its handler.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// `var` of `.. |var| name::`.
    pub variable: Option<String>,
    pub name: String,
    pub data: String,
    /// Options other than `class` and `name`.
    pub options: BTreeMap<String, String>,
    /// The parsed body for [`BodyMode::Nested`] directives.
    pub node: Option<Node>,
    /// Body lines, unindented.
    pub body: Vec<String>,
    pub line: usize,
}

impl Invocation {
    #[must_use]
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn body_text(&self) -> String {
        self.body.join("\n")
    }

    /// The nested body as a node list, empty when there was none.
    pub fn take_body(&mut self) -> Vec<Node> {
        self.node.take().map(Node::into_body).unwrap_or_default()
    }

    pub fn require_data(&self) -> Result<&str, DirectiveError> {
        let data = self.data.trim();
        if data.is_empty() {
            return Err(DirectiveError::MissingData {
                directive: self.name.clone(),
            });
        }
        Ok(data)
    }

    pub fn require_body(&self) -> Result<String, DirectiveError> {
        if self.body.iter().all(|l| l.trim().is_empty()) {
            return Err(DirectiveError::MissingContent {
                directive: self.name.clone(),
            });
        }
        Ok(self.body_text())
    }

    /// Parses an option as a number.
    pub fn usize_option(&self, key: &str) -> Result<Option<usize>, DirectiveError> {
        self.option(key)
            .map(|value| {
                value
                    .trim()
                    .parse()
                    .map_err(|_| DirectiveError::InvalidOption {
                        option: key.to_string(),
                        value: value.to_string(),
                    })
            })
            .transpose()
    }
}

/// A directive handler.
pub trait Directive: Send + Sync {
    fn name(&self) -> &'static str;

    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    fn body_mode(&self) -> BodyMode {
        BodyMode::Nested
    }

    /// The directive data is the first line of a nested body rather than an
    /// argument. Body lines directly under it continue the same paragraph.
    fn data_opens_body(&self) -> bool {
        false
    }

    /// Produces the nodes to splice in where the directive stood.
    fn process(
        &self,
        parser: &mut Parser,
        invocation: Invocation,
    ) -> Result<Vec<Node>, DirectiveError>;
}

/// Handlers by name, with aliases as a second lookup.
#[derive(Clone, Default)]
pub struct DirectiveRegistry {
    handlers: HashMap<String, Arc<dyn Directive>>,
    aliases: HashMap<String, String>,
}

impl DirectiveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in directive.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for kind in admonition::KINDS {
            registry.register(admonition::AdmonitionDirective::new(kind));
        }
        registry.register(admonition::GenericAdmonition);
        registry.register(image::ImageDirective);
        registry.register(image::FigureDirective);
        registry.register(include::IncludeDirective);
        registry.register(container::ContainerDirective);
        registry.register(container::WrapDirective);
        registry.register(container::ClassDirective);
        registry.register(toctree::TocTreeDirective);
        registry.register(text::ReplaceDirective);
        registry.register(text::TitleDirective);
        registry.register(text::MetaDirective);
        registry.register(text::RawDirective);
        registry.register(code::CodeBlockDirective);
        registry.register(code::UmlDirective);
        registry
    }

    /// Adds a handler and its aliases, replacing any previous owner.
    pub fn register(&mut self, directive: impl Directive + 'static) {
        let name = directive.name().to_string();
        for alias in directive.aliases() {
            self.aliases.insert((*alias).to_string(), name.clone());
        }
        self.aliases.remove(&name);
        self.handlers.insert(name, Arc::new(directive));
    }

    /// Points `alias` at the directive registered as `name`. Returns false
    /// when there is no such directive.
    pub fn alias(&mut self, alias: &str, name: &str) -> bool {
        let Some(target) = self.resolve_name(name).map(str::to_string) else {
            return false;
        };
        self.aliases.insert(alias.to_string(), target);
        true
    }

    fn resolve_name<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        if self.handlers.contains_key(name) {
            return Some(name);
        }
        self.aliases.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Directive>> {
        let name = self.resolve_name(name)?;
        self.handlers.get(name).cloned()
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for DirectiveRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectiveRegistry")
            .field("handlers", &self.names())
            .field("aliases", &self.aliases)
            .finish()
    }
}

/// Runs the directive buffered in `state` and returns the nodes it leaves.
pub fn dispatch(parser: &mut Parser, state: DirectiveState) -> Vec<Node> {
    let follows_directly = state.body_follows_directly();
    let DirectiveState {
        line: directive,
        number: line,
        mut options,
        mut body,
        ..
    } = state;
    parser.environment_mut().set_line(line);

    let Some(handler) = parser.directives().get(&directive.name) else {
        let message = format!("Unknown directive: \"{}\"", directive.name);
        parser.environment_mut().error(message.clone());
        let source = format!(".. {}:: {}", directive.name, directive.data);
        return vec![Node::error(message, source.trim_end())];
    };
    debug!("Dispatching {} directive at line {line}", directive.name);

    body.trim_trailing_blanks();
    let lines = body.unindented();
    let data_in_body = handler.body_mode() == BodyMode::Nested
        && handler.data_opens_body()
        && !directive.data.trim().is_empty();
    let node = match handler.body_mode() {
        BodyMode::Nested if data_in_body => {
            let mut text = vec![directive.data.trim().to_string()];
            if !body.is_empty() && !follows_directly {
                text.push(String::new());
            }
            text.extend(lines.iter().cloned());
            let nodes = parser.parse_fragment(&text.join("\n"), line);
            Some(Node::new(NodeKind::Container(nodes)))
        }
        BodyMode::Nested if !body.is_empty() => {
            let nodes = parser.parse_fragment(&lines.join("\n"), body.first_line());
            Some(Node::new(NodeKind::Container(nodes)))
        }
        BodyMode::None if !body.is_empty() => {
            parser.environment_mut().warning(format!(
                "The \"{}\" directive does not take content",
                directive.name
            ));
            None
        }
        _ => None,
    };

    let classes: Vec<String> = options
        .remove("class")
        .map(|c| c.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default();
    let anchor = options.remove("name").filter(|n| !n.trim().is_empty());

    let invocation = Invocation {
        variable: directive.variable.clone(),
        name: directive.name.clone(),
        data: if data_in_body {
            String::new()
        } else {
            directive.data.clone()
        },
        options,
        node,
        body: lines,
        line,
    };

    let mut nodes = match handler.process(parser, invocation) {
        Ok(nodes) => nodes,
        Err(e) => {
            let message = format!("Error while processing \"{}\" directive: {e}", directive.name);
            parser.environment_mut().error(message.clone());
            if !e.leaves_placeholder() {
                return vec![];
            }
            let source = format!(".. {}:: {}", directive.name, directive.data);
            vec![Node::error(message, source.trim_end())]
        }
    };

    if let Some(first) = nodes.first_mut() {
        for class in &classes {
            first.add_class(class.clone());
        }
    }

    if let Some(variable) = directive.variable {
        parser.environment_mut().set_variable(&variable, nodes);
        return vec![];
    }

    if let Some(name) = anchor
        && !nodes.is_empty()
    {
        let name = name.trim();
        parser.environment_mut().add_anchor(name, None);
        nodes.insert(
            0,
            Node::new(NodeKind::Anchor {
                name: name.to_string(),
            }),
        );
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Admonition;
    use pretty_assertions::assert_eq;

    struct Shout;

    impl Directive for Shout {
        fn name(&self) -> &'static str {
            "shout"
        }

        fn aliases(&self) -> &'static [&'static str] {
            &["yell"]
        }

        fn body_mode(&self) -> BodyMode {
            BodyMode::Literal
        }

        fn process(
            &self,
            _parser: &mut Parser,
            invocation: Invocation,
        ) -> Result<Vec<Node>, DirectiveError> {
            let text = invocation.require_body()?.to_uppercase();
            Ok(vec![Node::new(NodeKind::Generic {
                name: "shout".into(),
                value: text,
            })])
        }
    }

    fn generic_values(nodes: &[Node]) -> Vec<String> {
        nodes
            .iter()
            .filter_map(|n| match n.kind() {
                NodeKind::Generic { value, .. } => Some(value.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn registry_resolves_aliases() {
        let mut registry = DirectiveRegistry::with_defaults();
        assert_eq!(registry.get("code").map(|d| d.name()), Some("code-block"));
        assert_eq!(registry.get("rst-class").map(|d| d.name()), Some("class"));
        assert!(registry.get("nope").is_none());

        assert!(registry.alias("hint-box", "hint"));
        assert_eq!(registry.get("hint-box").map(|d| d.name()), Some("hint"));
        assert!(!registry.alias("broken", "missing"));
    }

    #[test]
    fn custom_directives_can_be_registered() {
        let mut parser = Parser::default().with_directive(Shout);
        let doc = parser.parse(".. yell::\n\n   quiet please\n");
        assert_eq!(generic_values(doc.nodes()), vec!["QUIET PLEASE"]);
    }

    #[test]
    fn unknown_directive_leaves_error_node() {
        let mut parser = Parser::default();
        let doc = parser.parse(".. frobnicate:: now\n\nAfter.\n");
        assert!(matches!(
            doc.nodes()[0].kind(),
            NodeKind::Error { message, source }
                if message == "Unknown directive: \"frobnicate\"" && source == ".. frobnicate:: now"
        ));
        assert_eq!(doc.nodes()[1].name(), "paragraph");
        assert_eq!(parser.environment().errors().count(), 1);
    }

    #[test]
    fn handler_errors_are_reported_with_placeholder() {
        let mut parser = Parser::default();
        let doc = parser.parse(".. image::\n");
        let errors: Vec<_> = parser
            .environment()
            .errors()
            .map(|d| d.message.clone())
            .collect();
        assert_eq!(
            errors,
            vec!["Error while processing \"image\" directive: image directive requires data"]
        );
        assert_eq!(doc.nodes()[0].name(), "error");
    }

    #[test]
    fn class_and_name_options_apply_to_output() {
        let mut parser = Parser::default();
        let doc = parser.parse(".. note::\n   :class: wide loud\n   :name: careful\n\n   Body.\n");
        assert!(matches!(
            doc.nodes()[0].kind(),
            NodeKind::Anchor { name } if name == "careful"
        ));
        let note = &doc.nodes()[1];
        assert_eq!(note.classes(), ["wide", "loud"]);
        assert!(note.option("class").is_none());
        assert_eq!(parser.environment().link("careful"), Some("#careful"));
    }

    #[test]
    fn variable_binding_stores_output() {
        let mut parser = Parser::default();
        let doc = parser.parse(".. |box| note:: Inside\n");
        assert!(doc.nodes().is_empty());
        let stored = parser.environment().variable("box").unwrap();
        assert!(matches!(
            stored[0].kind(),
            NodeKind::Admonition(Admonition { kind, .. }) if kind == "note"
        ));
    }

    #[test]
    fn nested_diagnostics_report_source_lines() {
        let mut parser = Parser::default();
        parser.parse("Intro.\n\n.. container::\n   :class: box\n\n   .. frobnicate::\n");
        let lines: Vec<usize> = parser.environment().errors().map(|d| d.line).collect();
        assert_eq!(lines, [6]);
    }

    #[test]
    fn content_on_bodiless_directive_is_a_warning() {
        let mut parser = Parser::default();
        parser.parse(".. title:: Guide\n\n   stray\n");
        assert_eq!(parser.environment().meta_title(), Some("Guide"));
        assert_eq!(parser.environment().diagnostics().len(), 1);
    }
}
