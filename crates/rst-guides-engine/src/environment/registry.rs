//! Second pass over a set of parsed documents.
//!
//! Each document is parsed on its own; [`DocumentSet`] merges what every
//! parse exported (titles, anchors, table-of-contents declarations and
//! `:doc:`/`:ref:` references) and then links the documents against each
//! other.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, warn};
use relative_path::RelativePath;
use rst_guides_config::ParserConfig;

use crate::environment::{AnchorEntry, Environment, FoundReference, normalize_path, slugify};
use crate::error::{Diagnostic, Severity};
use crate::io::{RelativeUrlGenerator, UrlGenerator};
use crate::models::{Document, NodeKind, TocEntry};
use crate::parsing::inline::{CrossReference, InlineNode, ResolvedReference};

/// What one document exported for the second pass.
#[derive(Debug, Clone, Default)]
pub struct DocumentIndex {
    pub title: Option<String>,
    pub anchors: Vec<AnchorEntry>,
    /// Documents named by the document's toctrees, in order.
    pub toc_files: Vec<String>,
    pub references: Vec<FoundReference>,
    pub dependencies: Vec<String>,
}

#[derive(Debug, Default)]
pub struct DocumentSet {
    documents: BTreeMap<String, Document>,
    index: BTreeMap<String, DocumentIndex>,
    ignore_invalid_references: bool,
}

/// Document key: the root-relative path without its `.rst` extension.
#[must_use]
pub fn document_key(path: &str) -> String {
    path.strip_suffix(".rst").unwrap_or(path).to_string()
}

impl DocumentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &ParserConfig) -> Self {
        Self {
            ignore_invalid_references: config.ignore_invalid_references,
            ..Self::default()
        }
    }

    /// Adds a parsed document with the environment of its parse. Documents
    /// parsed from a string are keyed `index`.
    pub fn add(&mut self, document: Document, env: &Environment) {
        let key = document_key(document.path().unwrap_or("index"));
        let toc_files = document
            .tocs()
            .into_iter()
            .flat_map(|toc| toc.files.iter().cloned())
            .collect();
        let index = DocumentIndex {
            title: env
                .meta_title()
                .map(str::to_string)
                .or_else(|| document.title()),
            anchors: env.anchors().to_vec(),
            toc_files,
            references: env.references().to_vec(),
            dependencies: env.dependencies().to_vec(),
        };
        debug!("Adding {key} to the document set");
        self.index.insert(key.clone(), index);
        self.documents.insert(key, document);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Document> {
        self.documents.get(&document_key(key))
    }

    pub fn documents(&self) -> impl Iterator<Item = (&str, &Document)> {
        self.documents.iter().map(|(k, d)| (k.as_str(), d))
    }

    #[must_use]
    pub fn index(&self, key: &str) -> Option<&DocumentIndex> {
        self.index.get(&document_key(key))
    }

    /// Documents whose dependencies include `path`, for rebuilds.
    #[must_use]
    pub fn dependents_of(&self, path: &str) -> Vec<&str> {
        let key = document_key(path);
        self.index
            .iter()
            .filter(|(_, i)| i.dependencies.iter().any(|d| document_key(d) == key))
            .map(|(k, _)| k.as_str())
            .collect()
    }

    /// Resolves a `:role:` reference made from the document `from`.
    #[must_use]
    pub fn resolve(
        &self,
        role: &str,
        target: &str,
        anchor: Option<&str>,
        from: &str,
    ) -> Option<ResolvedReference> {
        match role {
            "doc" => {
                let key = self.target_key(target, from)?;
                let index = self.index.get(&key)?;
                let mut url = self.document_url(&key, from);
                if let Some(anchor) = anchor {
                    url = format!("{url}#{}", slugify(anchor));
                }
                Some(ResolvedReference {
                    url,
                    title: index.title.clone(),
                })
            }
            "ref" => {
                let slug = slugify(target);
                // The referencing document wins over the rest of the set.
                let from_key = document_key(from);
                let found = self
                    .index
                    .get(&from_key)
                    .and_then(|i| i.anchors.iter().find(|a| a.slug == slug))
                    .map(|a| (from_key.as_str(), a))
                    .or_else(|| {
                        self.index.iter().find_map(|(key, i)| {
                            i.anchors
                                .iter()
                                .find(|a| a.slug == slug)
                                .map(|a| (key.as_str(), a))
                        })
                    })?;
                let (key, entry) = found;
                let url = if key == from_key {
                    format!("#{}", entry.slug)
                } else {
                    format!("{}#{}", self.document_url(key, from), entry.slug)
                };
                Some(ResolvedReference {
                    url,
                    title: entry.title.clone(),
                })
            }
            _ => None,
        }
    }

    /// Fills every cross reference and table of contents in the set.
    /// Returns the references that could not be resolved.
    pub fn link(&mut self) -> Vec<Diagnostic> {
        let mut diagnostics = vec![];
        let keys: Vec<String> = self.documents.keys().cloned().collect();
        for key in keys {
            let mut unresolved: Vec<CrossReference> = vec![];
            let mut results: Vec<Option<ResolvedReference>> = vec![];
            let mut tocs = vec![];
            if let Some(document) = self.documents.get(&key) {
                document.walk(&mut |node, _| {
                    node.for_each_own_span(&mut |span| {
                        for reference in references_in(span.content()) {
                            let result = self.resolve(
                                &reference.role,
                                &reference.target,
                                reference.anchor.as_deref(),
                                &key,
                            );
                            if result.is_none() {
                                unresolved.push(reference.clone());
                            }
                            results.push(result);
                        }
                    });
                    if let NodeKind::Toc(toc) = node.kind() {
                        let mut visited = BTreeSet::from([key.clone()]);
                        tocs.push(self.toc_entries(&toc.files, toc.depth, &key, &mut visited));
                    }
                });
            }

            if let Some(document) = self.documents.get_mut(&key) {
                let mut results = results.into_iter();
                let mut tocs = tocs.into_iter();
                for node in document.nodes_mut() {
                    node.walk_mut(&mut |node| {
                        node.for_each_own_span_mut(&mut |span| {
                            fill_references(span.content_mut(), &mut || results.next().flatten())
                        });
                        if let NodeKind::Toc(toc) = node.kind_mut() {
                            toc.entries = tocs.next().unwrap_or_default();
                        }
                    });
                }
            }

            if !self.ignore_invalid_references {
                for reference in unresolved {
                    diagnostics.push(self.unresolved(&key, &reference));
                }
            }
        }
        diagnostics
    }

    fn unresolved(&self, key: &str, reference: &CrossReference) -> Diagnostic {
        let found = self.index.get(key).and_then(|i| {
            i.references
                .iter()
                .find(|f| f.role == reference.role && f.target == reference.target)
        });
        let diagnostic = Diagnostic {
            severity: Severity::Error,
            file: found
                .and_then(|f| f.file.clone())
                .or_else(|| self.documents.get(key).and_then(|d| d.path().map(str::to_string))),
            line: found.map_or(0, |f| f.line),
            message: format!(
                "Unresolved :{}: reference to \"{}\"",
                reference.role, reference.target
            ),
        };
        warn!("{diagnostic}");
        diagnostic
    }

    fn toc_entries(
        &self,
        files: &[String],
        depth: Option<usize>,
        from: &str,
        visited: &mut BTreeSet<String>,
    ) -> Vec<TocEntry> {
        let mut entries = vec![];
        for file in files {
            let key = document_key(file);
            let title = self.index.get(&key).and_then(|i| i.title.clone());
            let children = match (self.index.get(&key), depth) {
                (Some(_), Some(d)) if d <= 1 => vec![],
                (Some(index), _) if visited.insert(key.clone()) => {
                    let children =
                        self.toc_entries(&index.toc_files, depth.map(|d| d - 1), from, visited);
                    visited.remove(&key);
                    children
                }
                _ => vec![],
            };
            entries.push(TocEntry {
                path: key.clone(),
                url: self.document_url(&key, from),
                title,
                children,
            });
        }
        entries
    }

    fn target_key(&self, target: &str, from: &str) -> Option<String> {
        let joined = match target.strip_prefix('/') {
            Some(rooted) => rooted.to_string(),
            None => match RelativePath::new(from).parent() {
                Some(dir) if !dir.as_str().is_empty() => format!("{}/{target}", dir.as_str()),
                _ => target.to_string(),
            },
        };
        normalize_path(&joined).map(|p| document_key(p.as_str()))
    }

    fn document_url(&self, key: &str, from: &str) -> String {
        RelativeUrlGenerator.relative_url(Some(RelativePath::new(from)), &format!("/{key}.html"))
    }
}

fn references_in(content: &[InlineNode]) -> Vec<&CrossReference> {
    let mut out = vec![];
    for inline in content {
        match inline {
            InlineNode::Reference(r) => out.push(r),
            InlineNode::Substitution {
                value: Some(nodes), ..
            } => out.extend(references_in(nodes)),
            _ => {}
        }
    }
    out
}

/// Visits references in the same order as [`references_in`].
fn fill_references(
    content: &mut [InlineNode],
    next: &mut dyn FnMut() -> Option<ResolvedReference>,
) {
    for inline in content {
        match inline {
            InlineNode::Reference(r) => r.resolved = next(),
            InlineNode::Substitution {
                value: Some(nodes), ..
            } => fill_references(nodes, next),
            _ => {}
        }
    }
}
