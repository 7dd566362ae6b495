use crate::error::DirectiveError;
use crate::models::{Node, NodeKind, Toc};
use crate::parsing::Parser;

use super::{BodyMode, Directive, Invocation};

/// `.. toctree::` lists documents, one path per body line. Entries are
/// filled in by the document set once every document has been parsed.
pub struct TocTreeDirective;

impl Directive for TocTreeDirective {
    fn name(&self) -> &'static str {
        "toctree"
    }

    fn body_mode(&self) -> BodyMode {
        BodyMode::Literal
    }

    fn process(
        &self,
        parser: &mut Parser,
        invocation: Invocation,
    ) -> Result<Vec<Node>, DirectiveError> {
        let depth = invocation.usize_option("maxdepth")?;
        let mut files = Vec::new();
        for entry in invocation.body.iter().map(|l| l.trim()).filter(|l| !l.is_empty()) {
            let entry = entry.strip_suffix(".rst").unwrap_or(entry);
            match parser.environment().canonical_path(entry) {
                Some(path) => {
                    let path = path.to_string();
                    parser.environment_mut().add_dependency(&path);
                    if !files.contains(&path) {
                        files.push(path);
                    }
                }
                None => parser
                    .environment_mut()
                    .warning(format!("Table of contents entry \"{entry}\" is outside the source root")),
            }
        }

        let node = Node::new(NodeKind::Toc(Toc {
            files,
            depth,
            entries: vec![],
        }));
        Ok(vec![node.with_options(&invocation.options)])
    }
}
