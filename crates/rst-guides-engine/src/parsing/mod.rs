//! # Parsing
//!
//! [`Parser`] is the entry point: it owns the [`Environment`] of the current
//! parse, the directive registry and the collaborators used to read included
//! sources and build URLs.
//!
//! ## Modules
//!
//! - **`rope`**: line access over an `xi_rope::Rope`
//! - **`blocks`**: the block state machine
//! - **`inline`**: the span parser
//! - **`resolve`**: end-of-document resolution of links and substitutions
//! - **`snapshot`**: outline and invariant helpers for tests

pub mod blocks;
pub mod inline;
pub mod resolve;
pub mod rope;
pub mod snapshot;

use std::sync::Arc;

use log::{debug, warn};
use relative_path::RelativePathBuf;
use rst_guides_config::ParserConfig;

use crate::directives::{Directive, DirectiveRegistry};
use crate::environment::{Environment, normalize_path};
use crate::error::{OriginError, ParseError};
use crate::io::{FsOrigin, RelativeUrlGenerator, SourceOrigin, UrlGenerator};
use crate::models::{Document, Node};

use blocks::BlockBuilder;
use inline::SpanNode;

pub struct Parser {
    config: ParserConfig,
    env: Environment,
    directives: Arc<DirectiveRegistry>,
    origin: Arc<dyn SourceOrigin>,
    urls: Arc<dyn UrlGenerator>,
    /// Current recursion depth of nested fragment parses.
    depth: usize,
    /// Classes from a bodiless `class` directive, for the next block.
    pending_classes: Vec<String>,
}

impl Parser {
    /// A parser with the built-in directives, reading sources from the
    /// configured source root (or the working directory).
    pub fn new(config: ParserConfig) -> Self {
        let origin = FsOrigin::from_config(&config).unwrap_or_else(|| FsOrigin::new("."));
        let mut directives = DirectiveRegistry::with_defaults();
        for (alias, name) in &config.directive_aliases {
            if !directives.alias(alias, name) {
                warn!("Alias {alias} points at unknown directive {name}");
            }
        }
        Self {
            env: Environment::new(config.clone()),
            config,
            directives: Arc::new(directives),
            origin: Arc::new(origin),
            urls: Arc::new(RelativeUrlGenerator),
            depth: 0,
            pending_classes: vec![],
        }
    }

    #[must_use]
    pub fn with_origin(mut self, origin: impl SourceOrigin + 'static) -> Self {
        self.origin = Arc::new(origin);
        self
    }

    #[must_use]
    pub fn with_url_generator(mut self, urls: impl UrlGenerator + 'static) -> Self {
        self.urls = Arc::new(urls);
        self
    }

    /// Registers an extra directive, replacing any built-in of the same name.
    #[must_use]
    pub fn with_directive(mut self, directive: impl Directive + 'static) -> Self {
        Arc::make_mut(&mut self.directives).register(directive);
        self
    }

    #[must_use]
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parses a standalone document with a fresh environment.
    pub fn parse(&mut self, content: &str) -> Document {
        self.parse_source(None, content)
    }

    /// Reads `path` from the source origin and parses it with a fresh
    /// environment. Includes resolve relative to it.
    pub fn parse_file(&mut self, path: &str) -> Result<Document, ParseError> {
        let path = normalize_path(path).ok_or_else(|| OriginError::NotFound(path.to_string()))?;
        let content = self.origin.read_to_string(&path)?;
        Ok(self.parse_source(Some(path), &content))
    }

    fn parse_source(&mut self, path: Option<RelativePathBuf>, content: &str) -> Document {
        self.env = Environment::new(self.config.clone());
        self.depth = 0;
        self.pending_classes.clear();
        let name = path.as_ref().map(|p| p.as_str().to_string());
        if let Some(path) = path {
            self.env.push_file(path);
        }
        debug!("Parsing {}", name.as_deref().unwrap_or("<string>"));

        let mut nodes = self.parse_fragment(content, 1);
        resolve::resolve(&mut nodes, &mut self.env);
        Document::new(name, nodes)
    }

    /// Parses a nested block (quote, list item, directive body, included
    /// file) into nodes, sharing the current environment.
    pub fn parse_fragment(&mut self, text: &str, first_line: usize) -> Vec<Node> {
        if self.depth >= self.config.max_nesting_depth {
            let message = format!(
                "Maximum nesting depth of {} reached",
                self.config.max_nesting_depth
            );
            self.env.error(message.clone());
            return vec![Node::error(message, text)];
        }
        self.depth += 1;
        let nodes = BlockBuilder::new(self, text, first_line).build();
        self.depth -= 1;
        nodes
    }

    pub fn parse_span(&mut self, text: &str) -> SpanNode {
        inline::parse_span(&mut self.env, text)
    }

    /// URL of `target` as seen from the file being parsed.
    #[must_use]
    pub fn relative_url(&self, target: &str) -> String {
        self.urls.relative_url(self.env.current_file(), target)
    }

    #[must_use]
    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    /// Hands the environment of the last parse over for the second pass.
    pub fn into_environment(self) -> Environment {
        self.env
    }

    #[must_use]
    pub fn directives(&self) -> Arc<DirectiveRegistry> {
        Arc::clone(&self.directives)
    }

    #[must_use]
    pub fn origin(&self) -> Arc<dyn SourceOrigin> {
        Arc::clone(&self.origin)
    }

    pub(crate) fn push_pending_classes(&mut self, classes: &[String]) {
        self.pending_classes.extend(classes.iter().cloned());
    }

    pub(crate) fn take_pending_classes(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending_classes)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new(ParserConfig::default())
    }
}
