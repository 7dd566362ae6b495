use crate::error::DirectiveError;
use crate::models::{Figure, Image, Node, NodeKind};
use crate::parsing::Parser;

use super::{BodyMode, Directive, Invocation};

const ALIGNMENTS: [&str; 5] = ["left", "center", "right", "top", "middle"];

fn image_from(parser: &Parser, invocation: &Invocation) -> Result<Image, DirectiveError> {
    let uri = invocation.require_data()?;
    if let Some(align) = invocation.option("align")
        && !ALIGNMENTS.contains(&align)
    {
        return Err(DirectiveError::InvalidOption {
            option: "align".to_string(),
            value: align.to_string(),
        });
    }
    Ok(Image {
        uri: parser.relative_url(uri),
    })
}

/// `.. image:: path`; options such as `:alt:` and `:width:` are kept on the node.
pub struct ImageDirective;

impl Directive for ImageDirective {
    fn name(&self) -> &'static str {
        "image"
    }

    fn body_mode(&self) -> BodyMode {
        BodyMode::None
    }

    fn process(
        &self,
        parser: &mut Parser,
        invocation: Invocation,
    ) -> Result<Vec<Node>, DirectiveError> {
        let image = image_from(parser, &invocation)?;
        Ok(vec![
            Node::new(NodeKind::Image(image)).with_options(&invocation.options),
        ])
    }
}

/// `.. figure:: path` whose body becomes the caption.
pub struct FigureDirective;

impl Directive for FigureDirective {
    fn name(&self) -> &'static str {
        "figure"
    }

    fn process(
        &self,
        parser: &mut Parser,
        mut invocation: Invocation,
    ) -> Result<Vec<Node>, DirectiveError> {
        let image = image_from(parser, &invocation)?;
        let caption = invocation.take_body();
        Ok(vec![
            Node::new(NodeKind::Figure(Figure { image, caption }))
                .with_options(&invocation.options),
        ])
    }
}

#[cfg(test)]
mod tests {
    use crate::io::MemoryOrigin;
    use crate::models::NodeKind;
    use crate::parsing::Parser;
    use pretty_assertions::assert_eq;

    #[test]
    fn image_keeps_options_and_rewrites_rooted_paths() {
        let origin = MemoryOrigin::new().with_file(
            "guide/setup/index.rst",
            ".. image:: /img/logo.png\n   :alt: Logo\n   :width: 200px\n",
        );
        let mut parser = Parser::default().with_origin(origin);
        let doc = parser.parse_file("guide/setup/index.rst").unwrap();
        let node = &doc.nodes()[0];
        let NodeKind::Image(image) = node.kind() else {
            panic!("expected image, got {node:?}");
        };
        assert_eq!(image.uri, "../../img/logo.png");
        assert_eq!(node.option("alt"), Some("Logo"));
        assert_eq!(node.option("width"), Some("200px"));
    }

    #[test]
    fn bad_alignment_is_rejected() {
        let mut parser = Parser::default();
        let doc = parser.parse(".. image:: a.png\n   :align: sideways\n");
        assert_eq!(doc.nodes()[0].name(), "error");
        let message = &parser.environment().errors().next().unwrap().message;
        assert!(message.contains("invalid value \"sideways\" for option align"));
    }

    #[test]
    fn figure_body_is_the_caption() {
        let mut parser = Parser::default();
        let doc = parser.parse(".. figure:: chart.svg\n   :figwidth: 50%\n\n   Monthly *totals*.\n");
        let node = &doc.nodes()[0];
        let NodeKind::Figure(figure) = node.kind() else {
            panic!("expected figure, got {node:?}");
        };
        assert_eq!(figure.image.uri, "chart.svg");
        assert_eq!(figure.caption.len(), 1);
        assert_eq!(node.option("figwidth"), Some("50%"));
    }
}
