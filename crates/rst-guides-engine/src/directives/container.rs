use crate::error::DirectiveError;
use crate::models::{Node, NodeKind};
use crate::parsing::Parser;

use super::{Directive, Invocation};

fn class_names(data: &str) -> Vec<String> {
    data.split_whitespace().map(str::to_string).collect()
}

/// `.. container:: classes` (alias `div`).
pub struct ContainerDirective;

impl Directive for ContainerDirective {
    fn name(&self) -> &'static str {
        "container"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["div"]
    }

    fn process(
        &self,
        _parser: &mut Parser,
        mut invocation: Invocation,
    ) -> Result<Vec<Node>, DirectiveError> {
        let mut node =
            Node::new(NodeKind::Container(invocation.take_body())).with_options(&invocation.options);
        for class in class_names(&invocation.data) {
            node.add_class(class);
        }
        Ok(vec![node])
    }
}

/// `.. wrap:: class` wraps its body in a container with one class.
pub struct WrapDirective;

impl Directive for WrapDirective {
    fn name(&self) -> &'static str {
        "wrap"
    }

    fn process(
        &self,
        _parser: &mut Parser,
        mut invocation: Invocation,
    ) -> Result<Vec<Node>, DirectiveError> {
        let class = invocation.require_data()?.to_string();
        let mut node = Node::new(NodeKind::Container(invocation.take_body()));
        node.add_class(class);
        Ok(vec![node])
    }
}

/// `.. class:: names` (alias `rst-class`). With a body the classes cascade
/// into every body node; without one they go to the next block.
pub struct ClassDirective;

impl Directive for ClassDirective {
    fn name(&self) -> &'static str {
        "class"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["rst-class"]
    }

    fn process(
        &self,
        parser: &mut Parser,
        mut invocation: Invocation,
    ) -> Result<Vec<Node>, DirectiveError> {
        let classes = class_names(invocation.require_data()?);
        let mut body = invocation.take_body();
        if body.is_empty() {
            parser.push_pending_classes(&classes);
            return Ok(vec![]);
        }
        for node in &mut body {
            node.cascade_classes(&classes);
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use crate::parsing::Parser;
    use pretty_assertions::assert_eq;

    fn names_and_classes(source: &str) -> Vec<(&'static str, Vec<String>)> {
        let mut parser = Parser::default();
        let doc = parser.parse(source);
        let mut out = vec![];
        doc.walk(&mut |node, _| out.push((node.name(), node.classes().to_vec())));
        out
    }

    fn owned(classes: &[&str]) -> Vec<String> {
        classes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn container_and_div_take_classes_from_data() {
        assert_eq!(
            names_and_classes(".. div:: box shadow\n\n   Inside.\n"),
            vec![
                ("container", owned(&["box", "shadow"])),
                ("paragraph", vec![]),
            ]
        );
    }

    #[test]
    fn wrap_adds_a_single_class() {
        assert_eq!(
            names_and_classes(".. wrap:: aside\n\n   Inside.\n"),
            vec![("container", owned(&["aside"])), ("paragraph", vec![])]
        );
    }

    #[test]
    fn class_cascades_into_body() {
        assert_eq!(
            names_and_classes(".. rst-class:: special\n\n   Quoted.\n\n      Deeper.\n"),
            vec![
                ("paragraph", owned(&["special"])),
                ("quote", owned(&["special"])),
                ("paragraph", owned(&["special"])),
            ]
        );
    }

    #[test]
    fn bodiless_class_applies_to_next_block() {
        assert_eq!(
            names_and_classes(".. class:: lead\n\nFirst.\n\nSecond.\n"),
            vec![("paragraph", owned(&["lead"])), ("paragraph", vec![])]
        );
    }
}
