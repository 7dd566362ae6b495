use crate::error::DirectiveError;
use crate::models::{Admonition, Node, NodeKind};
use crate::parsing::Parser;

use super::{Directive, Invocation};

/// Built-in callout kinds with their display titles.
pub const KINDS: [(&str, &str); 10] = [
    ("note", "Note"),
    ("warning", "Warning"),
    ("important", "Important"),
    ("tip", "Tip"),
    ("caution", "Caution"),
    ("danger", "Danger"),
    ("attention", "Attention"),
    ("hint", "Hint"),
    ("error", "Error"),
    ("seealso", "See also"),
];

/// `.. note::` and friends. Text after `::` opens the body.
pub struct AdmonitionDirective {
    kind: &'static str,
    title: &'static str,
}

impl AdmonitionDirective {
    pub fn new((kind, title): (&'static str, &'static str)) -> Self {
        Self { kind, title }
    }
}

impl Directive for AdmonitionDirective {
    fn name(&self) -> &'static str {
        self.kind
    }

    fn data_opens_body(&self) -> bool {
        true
    }

    fn process(
        &self,
        _parser: &mut Parser,
        mut invocation: Invocation,
    ) -> Result<Vec<Node>, DirectiveError> {
        let body = invocation.take_body();
        if body.is_empty() {
            return Err(DirectiveError::MissingContent {
                directive: invocation.name,
            });
        }

        let node = Node::new(NodeKind::Admonition(Admonition {
            kind: self.kind.to_string(),
            title: self.title.to_string(),
            body,
        }));
        Ok(vec![node.with_options(&invocation.options)])
    }
}

/// `.. admonition:: Custom title`, a callout with its own title.
pub struct GenericAdmonition;

impl Directive for GenericAdmonition {
    fn name(&self) -> &'static str {
        "admonition"
    }

    fn process(
        &self,
        _parser: &mut Parser,
        mut invocation: Invocation,
    ) -> Result<Vec<Node>, DirectiveError> {
        let title = invocation.require_data()?.to_string();
        let body = invocation.take_body();
        let mut node = Node::new(NodeKind::Admonition(Admonition {
            kind: "admonition".to_string(),
            title: title.clone(),
            body,
        }))
        .with_options(&invocation.options);
        node.add_class(format!("admonition-{}", crate::environment::slugify(&title)));
        Ok(vec![node])
    }
}
