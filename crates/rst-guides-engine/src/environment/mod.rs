//! # Parse Environment
//!
//! Mutable state threaded through one top-level parse: heading levels, link
//! and anchor tables, the anonymous target queue, substitution variables, the
//! include file stack and collected diagnostics.
//!
//! ## Modules
//!
//! - **`registry`**: the second pass that merges finished environments of a
//!   document set and resolves cross-document references

pub mod registry;

use std::collections::{BTreeMap, HashMap};

use log::{error, warn};
use relative_path::{RelativePath, RelativePathBuf};
use rst_guides_config::ParserConfig;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{Diagnostic, Severity};
use crate::models::Node;
use crate::parsing::blocks::buffer::normalize_whitespace;

pub use registry::DocumentSet;

/// Maximum number of `name_` alias hops followed when resolving a link.
const MAX_ALIAS_HOPS: usize = 16;

/// A `:role:` reference seen during the first pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoundReference {
    pub role: String,
    pub target: String,
    pub file: Option<String>,
    pub line: usize,
}

/// An anchor declared in the document, with the title it labels if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnchorEntry {
    pub name: String,
    pub slug: String,
    pub title: Option<String>,
}

/// Generates placeholder ids that cannot collide with document text.
///
/// Ids are v5 UUIDs of a per-session random namespace and a counter, so
/// they are monotonically numbered but opaque.
#[derive(Debug, Clone)]
pub struct TokenIds {
    session: Uuid,
    counter: u64,
}

impl TokenIds {
    pub const OPEN: char = '\u{E000}';
    pub const CLOSE: char = '\u{E001}';

    pub fn new() -> Self {
        Self {
            session: Uuid::new_v4(),
            counter: 0,
        }
    }

    pub fn next_id(&mut self) -> String {
        self.counter += 1;
        Uuid::new_v5(&self.session, &self.counter.to_be_bytes())
            .simple()
            .to_string()
    }

    pub fn placeholder(id: &str) -> String {
        format!("{}{id}{}", Self::OPEN, Self::CLOSE)
    }
}

impl Default for TokenIds {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct Environment {
    config: ParserConfig,
    title_letters: Vec<char>,
    title_counters: Vec<usize>,
    links: HashMap<String, String>,
    anonymous_targets: Vec<String>,
    anonymous_uses: usize,
    anchors: Vec<AnchorEntry>,
    variables: HashMap<String, Vec<Node>>,
    metas: BTreeMap<String, String>,
    meta_title: Option<String>,
    file_stack: Vec<RelativePathBuf>,
    line: usize,
    references: Vec<FoundReference>,
    dependencies: Vec<String>,
    diagnostics: Vec<Diagnostic>,
    token_ids: TokenIds,
}

impl Environment {
    pub fn new(config: ParserConfig) -> Self {
        Self {
            config,
            title_letters: Vec::new(),
            title_counters: Vec::new(),
            links: HashMap::new(),
            anonymous_targets: Vec::new(),
            anonymous_uses: 0,
            anchors: Vec::new(),
            variables: HashMap::new(),
            metas: BTreeMap::new(),
            meta_title: None,
            file_stack: Vec::new(),
            line: 0,
            references: Vec::new(),
            dependencies: Vec::new(),
            diagnostics: Vec::new(),
            token_ids: TokenIds::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    // Titles

    /// Level of a heading adorned with `letter`. Letters are numbered in
    /// order of first appearance, starting at the initial header level.
    pub fn level_for(&mut self, letter: char) -> usize {
        let index = match self.title_letters.iter().position(|&c| c == letter) {
            Some(index) => index,
            None => {
                self.title_letters.push(letter);
                self.title_letters.len() - 1
            }
        };
        index + self.config.initial_header_level
    }

    /// Adornment letters in level order.
    #[must_use]
    pub fn title_letters(&self) -> &[char] {
        &self.title_letters
    }

    /// Bumps the counter for `level` and returns its hierarchical id,
    /// e.g. `title.2.1`.
    pub fn create_title_id(&mut self, level: usize) -> String {
        let depth = level.saturating_sub(self.config.initial_header_level) + 1;
        if self.title_counters.len() < depth {
            self.title_counters.resize(depth, 0);
        }
        self.title_counters.truncate(depth);
        self.title_counters[depth - 1] += 1;
        let parts: Vec<String> = self
            .title_counters
            .iter()
            .map(|c| c.to_string())
            .collect();
        format!("title.{}", parts.join("."))
    }

    // Links

    fn link_key(name: &str) -> String {
        normalize_whitespace(name).to_lowercase()
    }

    /// Binds a named target; the last registration wins.
    pub fn set_link(&mut self, name: &str, url: &str) {
        self.links
            .insert(Self::link_key(name), url.trim().to_string());
    }

    #[must_use]
    pub fn link(&self, name: &str) -> Option<&str> {
        self.links.get(&Self::link_key(name)).map(String::as_str)
    }

    /// Looks a name up, following `other_` alias targets.
    #[must_use]
    pub fn resolve_link(&self, name: &str) -> Option<String> {
        let mut url = self.link(name)?.to_string();
        for _ in 0..MAX_ALIAS_HOPS {
            match alias_of(&url) {
                Some(alias) => url = self.link(alias)?.to_string(),
                None => return Some(url),
            }
        }
        None
    }

    pub fn push_anonymous_target(&mut self, url: &str) {
        self.anonymous_targets.push(url.trim().to_string());
    }

    /// Claims the index of the next anonymous reference.
    pub fn next_anonymous_index(&mut self) -> usize {
        self.anonymous_uses += 1;
        self.anonymous_uses - 1
    }

    #[must_use]
    pub fn anonymous_target(&self, index: usize) -> Option<&str> {
        self.anonymous_targets.get(index).map(String::as_str)
    }

    /// Declared anonymous targets and anonymous references seen so far.
    #[must_use]
    pub fn anonymous_counts(&self) -> (usize, usize) {
        (self.anonymous_targets.len(), self.anonymous_uses)
    }

    /// Registers an anchor and the `#slug` link that points at it.
    pub fn add_anchor(&mut self, name: &str, title: Option<String>) -> String {
        let slug = slugify(name);
        self.set_link(name, &format!("#{slug}"));
        match self.anchors.iter_mut().find(|a| a.name == name) {
            Some(existing) => {
                if title.is_some() {
                    existing.title = title;
                }
            }
            None => self.anchors.push(AnchorEntry {
                name: name.to_string(),
                slug: slug.clone(),
                title,
            }),
        }
        slug
    }

    #[must_use]
    pub fn anchors(&self) -> &[AnchorEntry] {
        &self.anchors
    }

    // Variables and metadata

    pub fn set_variable(&mut self, name: &str, value: Vec<Node>) {
        self.variables.insert(Self::link_key(name), value);
    }

    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&[Node]> {
        self.variables.get(&Self::link_key(name)).map(Vec::as_slice)
    }

    pub fn set_meta_title(&mut self, title: &str) {
        self.meta_title = Some(title.to_string());
    }

    #[must_use]
    pub fn meta_title(&self) -> Option<&str> {
        self.meta_title.as_deref()
    }

    pub fn set_meta(&mut self, key: &str, value: &str) {
        self.metas.insert(key.to_string(), value.to_string());
    }

    #[must_use]
    pub fn metas(&self) -> &BTreeMap<String, String> {
        &self.metas
    }

    // Cross references

    /// Records a `:role:` reference for the second pass. Returns false for
    /// roles that are not configured.
    pub fn found(&mut self, role: &str, target: &str) -> bool {
        if !self.config.reference_roles.iter().any(|r| r == role) {
            self.error(format!("Unknown reference role \"{role}\""));
            return false;
        }
        self.references.push(FoundReference {
            role: role.to_string(),
            target: target.to_string(),
            file: self.current_file().map(|p| p.as_str().to_string()),
            line: self.line,
        });
        true
    }

    #[must_use]
    pub fn references(&self) -> &[FoundReference] {
        &self.references
    }

    pub fn add_dependency(&mut self, path: &str) {
        if !self.dependencies.iter().any(|d| d == path) {
            self.dependencies.push(path.to_string());
        }
    }

    #[must_use]
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    // File context

    pub fn push_file(&mut self, path: RelativePathBuf) {
        self.file_stack.push(path);
    }

    pub fn pop_file(&mut self) -> Option<RelativePathBuf> {
        self.file_stack.pop()
    }

    #[must_use]
    pub fn current_file(&self) -> Option<&RelativePath> {
        self.file_stack.last().map(RelativePathBuf::as_relative_path)
    }

    /// The root document of this parse.
    #[must_use]
    pub fn root_file(&self) -> Option<&RelativePath> {
        self.file_stack.first().map(RelativePathBuf::as_relative_path)
    }

    #[must_use]
    pub fn file_stack(&self) -> &[RelativePathBuf] {
        &self.file_stack
    }

    /// Depth of nested includes below the root document.
    #[must_use]
    pub fn include_depth(&self) -> usize {
        self.file_stack.len().saturating_sub(1)
    }

    #[must_use]
    pub fn is_open(&self, path: &RelativePath) -> bool {
        self.file_stack.iter().any(|p| p.as_relative_path() == path)
    }

    /// Resolves `target` against the current file's directory. A leading `/`
    /// is relative to the source root. `None` when the path escapes the root.
    #[must_use]
    pub fn canonical_path(&self, target: &str) -> Option<RelativePathBuf> {
        let joined = match target.strip_prefix('/') {
            Some(rooted) => rooted.to_string(),
            None => match self.current_file().and_then(RelativePath::parent) {
                Some(dir) if !dir.as_str().is_empty() => format!("{}/{target}", dir.as_str()),
                _ => target.to_string(),
            },
        };
        normalize_path(&joined)
    }

    pub fn set_line(&mut self, line: usize) {
        self.line = line;
    }

    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    // Diagnostics

    pub fn warning(&mut self, message: impl Into<String>) {
        self.report(Severity::Warning, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.report(Severity::Error, message.into());
    }

    fn report(&mut self, severity: Severity, message: String) {
        let diagnostic = Diagnostic {
            severity,
            file: self.current_file().map(|p| p.as_str().to_string()),
            line: self.line,
            message,
        };
        match severity {
            Severity::Warning => warn!("{diagnostic}"),
            Severity::Error => error!("{diagnostic}"),
        }
        self.diagnostics.push(diagnostic);
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    pub fn next_token_id(&mut self) -> String {
        self.token_ids.next_id()
    }
}

/// Target of an alias URL such as `python_`.
pub(crate) fn alias_of(url: &str) -> Option<&str> {
    let name = url.strip_suffix('_')?;
    (!name.is_empty() && !name.ends_with('_') && !name.contains(['/', ':', ' ', '#']))
        .then_some(name)
}

/// Collapses `.` and `..` segments. `None` if the path climbs above the root.
pub fn normalize_path(path: &str) -> Option<RelativePathBuf> {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }
    Some(RelativePathBuf::from(parts.join("/")))
}

/// Lowercase ASCII slug with dashes between words.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for ch in text.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn env() -> Environment {
        Environment::new(ParserConfig::default())
    }

    #[test]
    fn levels_follow_first_appearance() {
        let mut env = env();
        assert_eq!(env.level_for('='), 1);
        assert_eq!(env.level_for('-'), 2);
        assert_eq!(env.level_for('='), 1);
        assert_eq!(env.level_for('~'), 3);
        assert_eq!(env.title_letters(), ['=', '-', '~']);
    }

    #[test]
    fn levels_respect_initial_header_level() {
        let mut env = Environment::new(ParserConfig {
            initial_header_level: 2,
            ..ParserConfig::default()
        });
        assert_eq!(env.level_for('*'), 2);
        assert_eq!(env.level_for('='), 3);
    }

    #[test]
    fn title_ids_are_hierarchical() {
        let mut env = env();
        assert_eq!(env.create_title_id(1), "title.1");
        assert_eq!(env.create_title_id(2), "title.1.1");
        assert_eq!(env.create_title_id(2), "title.1.2");
        assert_eq!(env.create_title_id(3), "title.1.2.1");
        assert_eq!(env.create_title_id(1), "title.2");
        assert_eq!(env.create_title_id(2), "title.2.1");
    }

    #[test]
    fn links_are_case_and_space_insensitive() {
        let mut env = env();
        env.set_link("Read  The\nDocs", "https://docs.example.org");
        assert_eq!(env.link("read the docs"), Some("https://docs.example.org"));
        env.set_link("read the docs", "https://other.example.org");
        assert_eq!(env.link("READ THE DOCS"), Some("https://other.example.org"));
    }

    #[test]
    fn link_aliases_are_followed() {
        let mut env = env();
        env.set_link("python", "https://www.python.org");
        env.set_link("py", "python_");
        env.set_link("loop", "loop_");
        assert_eq!(env.resolve_link("py").as_deref(), Some("https://www.python.org"));
        assert_eq!(env.resolve_link("loop"), None);
        assert_eq!(env.resolve_link("missing"), None);
    }

    #[test]
    fn anonymous_targets_are_fifo() {
        let mut env = env();
        env.push_anonymous_target("A");
        env.push_anonymous_target("B");
        let first = env.next_anonymous_index();
        let second = env.next_anonymous_index();
        let third = env.next_anonymous_index();
        assert_eq!(env.anonymous_target(first), Some("A"));
        assert_eq!(env.anonymous_target(second), Some("B"));
        assert_eq!(env.anonymous_target(third), None);
    }

    #[test]
    fn anchors_register_slug_links() {
        let mut env = env();
        let slug = env.add_anchor("Getting Started", None);
        assert_eq!(slug, "getting-started");
        assert_eq!(env.link("getting started"), Some("#getting-started"));
        env.add_anchor("Getting Started", Some("Intro".into()));
        assert_eq!(env.anchors().len(), 1);
        assert_eq!(env.anchors()[0].title.as_deref(), Some("Intro"));
    }

    #[test]
    fn unknown_roles_are_reported() {
        let mut env = env();
        env.push_file(RelativePathBuf::from("index.rst"));
        env.set_line(4);
        assert!(env.found("doc", "install"));
        assert!(!env.found("foo", "bar"));

        assert_eq!(env.references().len(), 1);
        assert_eq!(env.references()[0].file.as_deref(), Some("index.rst"));
        let errors: Vec<_> = env.errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 4);
    }

    #[rstest]
    #[case(Some("guide/index.rst"), "part.rst", Some("guide/part.rst"))]
    #[case(Some("guide/index.rst"), "../shared/a.rst", Some("shared/a.rst"))]
    #[case(Some("guide/index.rst"), "/root.rst", Some("root.rst"))]
    #[case(Some("index.rst"), "./a/./b.rst", Some("a/b.rst"))]
    #[case(Some("index.rst"), "../outside.rst", None)]
    #[case(None, "a.rst", Some("a.rst"))]
    fn canonical_paths(
        #[case] current: Option<&str>,
        #[case] target: &str,
        #[case] expected: Option<&str>,
    ) {
        let mut env = env();
        if let Some(current) = current {
            env.push_file(RelativePathBuf::from(current));
        }
        assert_eq!(
            env.canonical_path(target).as_ref().map(|p| p.as_str()),
            expected
        );
    }

    #[rstest]
    #[case("Hello, World!", "hello-world")]
    #[case("  API  reference ", "api-reference")]
    #[case("Étape 2", "étape-2")]
    #[case("---", "")]
    fn slugs(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(slugify(text), expected);
    }

    #[test]
    fn token_ids_are_distinct_and_opaque() {
        let mut ids = TokenIds::new();
        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
        let placeholder = TokenIds::placeholder(&a);
        assert!(placeholder.starts_with(TokenIds::OPEN));
        assert!(placeholder.ends_with(TokenIds::CLOSE));
    }
}
