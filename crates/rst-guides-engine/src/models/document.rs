use serde::Serialize;

use super::node::{Node, NodeKind, Toc};

/// A title as listed in a document's outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitleEntry {
    pub text: String,
    pub level: usize,
    pub slug: String,
    pub id: String,
}

/// Root of a parsed source file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Document {
    path: Option<String>,
    nodes: Vec<Node>,
}

impl Document {
    pub fn new(path: Option<String>, nodes: Vec<Node>) -> Self {
        Self { path, nodes }
    }

    /// Canonical path of the source, when it was parsed from one.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut Vec<Node> {
        &mut self.nodes
    }

    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }

    /// Pre-order walk over every node.
    pub fn walk(&self, f: &mut dyn FnMut(&Node, usize)) {
        for node in &self.nodes {
            node.walk(0, f);
        }
    }

    /// Every title in document order, including titles nested in containers.
    #[must_use]
    pub fn titles(&self) -> Vec<TitleEntry> {
        let mut out = vec![];
        self.walk(&mut |node, _| {
            if let NodeKind::Title(t) = node.kind() {
                out.push(TitleEntry {
                    text: t.text.plain_text(),
                    level: t.level,
                    slug: t.slug.clone(),
                    id: t.id.clone(),
                });
            }
        });
        out
    }

    /// Text of the first, highest ranked title.
    #[must_use]
    pub fn title(&self) -> Option<String> {
        let titles = self.titles();
        let top = titles.iter().map(|t| t.level).min()?;
        titles.into_iter().find(|t| t.level == top).map(|t| t.text)
    }

    pub fn tocs(&self) -> Vec<&Toc> {
        let mut out = vec![];
        for node in &self.nodes {
            collect_tocs(node, &mut out);
        }
        out
    }
}

fn collect_tocs<'a>(node: &'a Node, out: &mut Vec<&'a Toc>) {
    if let NodeKind::Toc(toc) = node.kind() {
        out.push(toc);
    }
    match node.kind() {
        NodeKind::BlockQuote(nodes) | NodeKind::Container(nodes) => {
            nodes.iter().for_each(|n| collect_tocs(n, out))
        }
        NodeKind::Admonition(a) => a.body.iter().for_each(|n| collect_tocs(n, out)),
        _ => {}
    }
}
