use log::debug;
use relative_path::RelativePath;

use crate::error::DirectiveError;
use crate::models::{Code, Node, NodeKind};
use crate::parsing::Parser;

use super::{BodyMode, Directive, Invocation};

/// `.. include:: path` splices another source file into the document.
///
/// The path is relative to the including file (or the source root with a
/// leading `/`). `:literal:` includes the file as a code block and
/// `:code: lang` as highlighted code.
pub struct IncludeDirective;

impl Directive for IncludeDirective {
    fn name(&self) -> &'static str {
        "include"
    }

    fn body_mode(&self) -> BodyMode {
        BodyMode::None
    }

    fn process(
        &self,
        parser: &mut Parser,
        invocation: Invocation,
    ) -> Result<Vec<Node>, DirectiveError> {
        let policy = parser.config().include.clone();
        if !policy.enabled {
            return Err(DirectiveError::IncludeDisabled);
        }

        let target = invocation.require_data()?;
        let env = parser.environment();
        let path = env
            .canonical_path(target)
            .ok_or_else(|| DirectiveError::IncludeOutsideRoot {
                path: target.to_string(),
                root: "the source root".to_string(),
            })?;
        if let Some(directory) = &policy.directory
            && !path.starts_with(RelativePath::new(directory.trim_matches('/')))
        {
            return Err(DirectiveError::IncludeOutsideRoot {
                path: path.to_string(),
                root: directory.clone(),
            });
        }
        if env.is_open(&path) {
            let chain: Vec<&str> = env.file_stack().iter().map(|p| p.as_str()).collect();
            return Err(DirectiveError::IncludeCycle(format!(
                "{} -> {path}",
                chain.join(" -> ")
            )));
        }
        let max_depth = parser.config().max_include_depth;
        if env.include_depth() >= max_depth {
            return Err(DirectiveError::IncludeTooDeep(max_depth));
        }

        let content = parser
            .origin()
            .read_to_string(&path)
            .map_err(|source| DirectiveError::IncludeUnreadable {
                path: path.to_string(),
                source,
            })?;
        parser.environment_mut().add_dependency(path.as_str());
        debug!("Including {path}");

        let code_language = invocation.option("code");
        if invocation.option("literal").is_some() || code_language.is_some() {
            let language = code_language
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string);
            let node = Node::new(NodeKind::Code(Code {
                value: content.trim_end_matches('\n').to_string(),
                language,
                raw: false,
            }));
            return Ok(vec![node]);
        }

        let line = parser.environment().line();
        parser.environment_mut().push_file(path);
        let nodes = parser.parse_fragment(&content, 1);
        parser.environment_mut().pop_file();
        parser.environment_mut().set_line(line);
        Ok(nodes)
    }
}
