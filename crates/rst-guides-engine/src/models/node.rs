use std::collections::BTreeMap;

use serde::Serialize;

use crate::parsing::inline::SpanNode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Title {
    pub text: SpanNode,
    pub level: usize,
    pub slug: String,
    /// Hierarchical id such as `title.1.2`.
    pub id: String,
    /// Anchor declared immediately before the title, if any.
    pub target: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct List {
    pub ordered: bool,
    pub items: Vec<ListItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListItem {
    /// Marker as written (`-`, `3.`).
    pub prefix: String,
    pub contents: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefinitionItem {
    pub term: SpanNode,
    pub classifiers: Vec<SpanNode>,
    pub definition: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableCell {
    pub content: SpanNode,
    pub colspan: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    pub headers: Vec<TableRow>,
    pub rows: Vec<TableRow>,
    pub columns: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Code {
    pub value: String,
    pub language: Option<String>,
    /// Raw passthrough payload rather than a literal block.
    pub raw: bool,
}

impl Code {
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.value.lines()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Admonition {
    /// Directive name, e.g. `note`.
    pub kind: String,
    /// Display label, e.g. `Note`.
    pub title: String,
    pub body: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Figure {
    pub image: Image,
    pub caption: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub path: String,
    pub url: String,
    pub title: Option<String>,
    pub children: Vec<TocEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toc {
    /// Canonical document paths, in declaration order.
    pub files: Vec<String>,
    pub depth: Option<usize>,
    /// Filled in by the document set once all documents are known.
    pub entries: Vec<TocEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    Paragraph(SpanNode),
    Title(Title),
    Separator { level: usize },
    List(List),
    DefinitionList(Vec<DefinitionItem>),
    Table(Table),
    Code(Code),
    BlockQuote(Vec<Node>),
    Admonition(Admonition),
    Figure(Figure),
    Image(Image),
    /// Wrapper produced by `container`, `div`, `class` and `wrap`.
    Container(Vec<Node>),
    Generic { name: String, value: String },
    Raw(String),
    Toc(Toc),
    Anchor { name: String },
    SectionBegin { title: String },
    SectionEnd { title: String },
    /// Stand-in for a construct that failed to resolve.
    Error { message: String, source: String },
}

/// One parsed block of a document.
///
/// The kind (the node's value) is fixed once built; options and classes can
/// only grow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    kind: NodeKind,
    options: BTreeMap<String, String>,
    classes: Vec<String>,
}

impl From<NodeKind> for Node {
    fn from(kind: NodeKind) -> Self {
        Node::new(kind)
    }
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            options: BTreeMap::new(),
            classes: Vec::new(),
        }
    }

    pub fn paragraph(span: SpanNode) -> Self {
        Self::new(NodeKind::Paragraph(span))
    }

    pub fn error(message: impl Into<String>, source: impl Into<String>) -> Self {
        Self::new(NodeKind::Error {
            message: message.into(),
            source: source.into(),
        })
    }

    #[must_use]
    pub fn with_options(mut self, options: &BTreeMap<String, String>) -> Self {
        self.merge_options(options);
        self
    }

    #[must_use]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub(crate) fn kind_mut(&mut self) -> &mut NodeKind {
        &mut self.kind
    }

    pub fn into_kind(self) -> NodeKind {
        self.kind
    }

    /// Short lowercase name of the node kind.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match &self.kind {
            NodeKind::Paragraph(_) => "paragraph",
            NodeKind::Title(_) => "title",
            NodeKind::Separator { .. } => "separator",
            NodeKind::List(_) => "list",
            NodeKind::DefinitionList(_) => "definition-list",
            NodeKind::Table(_) => "table",
            NodeKind::Code(_) => "code",
            NodeKind::BlockQuote(_) => "quote",
            NodeKind::Admonition(_) => "admonition",
            NodeKind::Figure(_) => "figure",
            NodeKind::Image(_) => "image",
            NodeKind::Container(_) => "container",
            NodeKind::Generic { .. } => "generic",
            NodeKind::Raw(_) => "raw",
            NodeKind::Toc(_) => "toc",
            NodeKind::Anchor { .. } => "anchor",
            NodeKind::SectionBegin { .. } => "section-begin",
            NodeKind::SectionEnd { .. } => "section-end",
            NodeKind::Error { .. } => "error",
        }
    }

    #[must_use]
    pub fn options(&self) -> &BTreeMap<String, String> {
        &self.options
    }

    #[must_use]
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    pub fn set_option(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.options.insert(key.into(), value.into());
    }

    pub fn merge_options(&mut self, options: &BTreeMap<String, String>) {
        for (k, v) in options {
            self.options.insert(k.clone(), v.clone());
        }
    }

    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn add_class(&mut self, class: impl Into<String>) {
        let class = class.into();
        if !class.is_empty() && !self.classes.contains(&class) {
            self.classes.push(class);
        }
    }

    /// Adds `classes` to this node and every descendant, pre-order.
    pub fn cascade_classes(&mut self, classes: &[String]) {
        for class in classes {
            self.add_class(class.clone());
        }
        self.for_each_child_mut(&mut |child| child.cascade_classes(classes));
    }

    /// Content of a quote-shaped directive body, or the node itself.
    pub fn into_body(self) -> Vec<Node> {
        match self.kind {
            NodeKind::BlockQuote(nodes) | NodeKind::Container(nodes) => nodes,
            _ => vec![self],
        }
    }

    /// Visits the direct child nodes.
    pub fn for_each_child(&self, f: &mut dyn FnMut(&Node)) {
        match &self.kind {
            NodeKind::List(list) => list.items.iter().flat_map(|i| &i.contents).for_each(f),
            NodeKind::DefinitionList(items) => {
                items.iter().flat_map(|i| &i.definition).for_each(f)
            }
            NodeKind::BlockQuote(nodes) | NodeKind::Container(nodes) => nodes.iter().for_each(f),
            NodeKind::Admonition(a) => a.body.iter().for_each(f),
            NodeKind::Figure(fig) => fig.caption.iter().for_each(f),
            _ => {}
        }
    }

    pub(crate) fn for_each_child_mut(&mut self, f: &mut dyn FnMut(&mut Node)) {
        match &mut self.kind {
            NodeKind::List(list) => list
                .items
                .iter_mut()
                .flat_map(|i| &mut i.contents)
                .for_each(f),
            NodeKind::DefinitionList(items) => items
                .iter_mut()
                .flat_map(|i| &mut i.definition)
                .for_each(f),
            NodeKind::BlockQuote(nodes) | NodeKind::Container(nodes) => {
                nodes.iter_mut().for_each(f)
            }
            NodeKind::Admonition(a) => a.body.iter_mut().for_each(f),
            NodeKind::Figure(fig) => fig.caption.iter_mut().for_each(f),
            _ => {}
        }
    }

    /// Pre-order walk over this node and its descendants with their depth.
    pub fn walk(&self, depth: usize, f: &mut dyn FnMut(&Node, usize)) {
        f(self, depth);
        self.for_each_child(&mut |child| child.walk(depth + 1, f));
    }

    pub(crate) fn walk_mut(&mut self, f: &mut dyn FnMut(&mut Node)) {
        f(self);
        self.for_each_child_mut(&mut |child| child.walk_mut(f));
    }

    /// Visits the inline spans held directly by this node.
    pub fn for_each_own_span(&self, f: &mut dyn FnMut(&SpanNode)) {
        match &self.kind {
            NodeKind::Paragraph(span) => f(span),
            NodeKind::Title(title) => f(&title.text),
            NodeKind::DefinitionList(items) => {
                for item in items {
                    f(&item.term);
                    item.classifiers.iter().for_each(&mut *f);
                }
            }
            NodeKind::Table(table) => table
                .headers
                .iter()
                .chain(&table.rows)
                .flat_map(|r| &r.cells)
                .for_each(|c| f(&c.content)),
            _ => {}
        }
    }

    pub(crate) fn for_each_own_span_mut(&mut self, f: &mut dyn FnMut(&mut SpanNode)) {
        match &mut self.kind {
            NodeKind::Paragraph(span) => f(span),
            NodeKind::Title(title) => f(&mut title.text),
            NodeKind::DefinitionList(items) => {
                for item in items {
                    f(&mut item.term);
                    item.classifiers.iter_mut().for_each(&mut *f);
                }
            }
            NodeKind::Table(table) => table
                .headers
                .iter_mut()
                .chain(table.rows.iter_mut())
                .flat_map(|r| r.cells.iter_mut())
                .for_each(|c| f(&mut c.content)),
            _ => {}
        }
    }

    /// Visits every inline span in this node and its descendants.
    pub(crate) fn for_each_span_mut(&mut self, f: &mut dyn FnMut(&mut SpanNode)) {
        self.walk_mut(&mut |node| node.for_each_own_span_mut(f));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn quote(children: Vec<Node>) -> Node {
        Node::new(NodeKind::BlockQuote(children))
    }

    #[test]
    fn options_merge_and_overwrite() {
        let mut node = Node::paragraph(SpanNode::text("x"));
        node.set_option("width", "10");
        let mut more = BTreeMap::new();
        more.insert("width".to_string(), "20".to_string());
        more.insert("alt".to_string(), "pic".to_string());
        node.merge_options(&more);

        assert_eq!(node.option("width"), Some("20"));
        assert_eq!(node.option("alt"), Some("pic"));
    }

    #[test]
    fn classes_deduplicate() {
        let mut node = Node::paragraph(SpanNode::text("x"));
        node.add_class("wide");
        node.add_class("wide");
        node.add_class("");
        assert_eq!(node.classes(), ["wide"]);
    }

    #[test]
    fn class_cascade_reaches_all_descendants() {
        let mut tree = quote(vec![
            Node::paragraph(SpanNode::text("a")),
            quote(vec![Node::paragraph(SpanNode::text("b"))]),
        ]);
        tree.cascade_classes(&["special".to_string()]);

        let mut seen = vec![];
        tree.walk(0, &mut |node, depth| {
            seen.push((node.name(), depth, node.classes().to_vec()));
        });
        assert_eq!(
            seen,
            vec![
                ("quote", 0, vec!["special".to_string()]),
                ("paragraph", 1, vec!["special".to_string()]),
                ("quote", 1, vec!["special".to_string()]),
                ("paragraph", 2, vec!["special".to_string()]),
            ]
        );
    }

    #[test]
    fn into_body_unwraps_quotes() {
        let body = quote(vec![Node::paragraph(SpanNode::text("a"))]).into_body();
        assert_eq!(body.len(), 1);
        assert_eq!(body[0].name(), "paragraph");

        let single = Node::new(NodeKind::Raw("<b>".into())).into_body();
        assert_eq!(single[0].name(), "raw");
    }
}
