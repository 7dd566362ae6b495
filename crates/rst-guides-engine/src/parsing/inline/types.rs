use serde::Serialize;

/// How a hyperlink finds its URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LinkRef {
    /// URL given inline (embedded, standalone or e-mail).
    Url(String),
    /// `name_` or `` `phrase`_ `` resolved against named targets.
    Named(String),
    /// The n-th anonymous reference (0-based) of the document.
    Anonymous(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub text: String,
    pub reference: LinkRef,
    /// Filled once the reference is resolved; `None` means dangling.
    pub url: Option<String>,
}

/// Result of resolving a `:role:` reference in the second pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedReference {
    pub url: String,
    pub title: Option<String>,
}

/// `:role:`text <target#anchor>``.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossReference {
    pub role: String,
    pub target: String,
    pub text: Option<String>,
    pub anchor: Option<String>,
    pub resolved: Option<ResolvedReference>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum InlineNode {
    Text(String),
    /// ``` ``literal`` ``` content, never parsed further.
    Literal(String),
    Link(Link),
    Reference(CrossReference),
    /// ``_`internal target` ``.
    Target { name: String, anchor: String },
    /// `|name|`, with the variable's content once resolved.
    Substitution {
        name: String,
        value: Option<Vec<InlineNode>>,
    },
    Image { uri: String, alt: Option<String> },
}

impl InlineNode {
    /// Text of this node with markup stripped.
    #[must_use]
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.push_plain_text(&mut out);
        out
    }

    fn push_plain_text(&self, out: &mut String) {
        match self {
            InlineNode::Text(s) | InlineNode::Literal(s) => out.push_str(s),
            InlineNode::Link(link) => out.push_str(&link.text),
            InlineNode::Reference(r) => match (&r.text, &r.resolved) {
                (Some(text), _) => out.push_str(text),
                (None, Some(ResolvedReference { title: Some(t), .. })) => out.push_str(t),
                _ => out.push_str(&r.target),
            },
            InlineNode::Target { name, .. } => out.push_str(name),
            InlineNode::Substitution { name, value } => match value {
                Some(nodes) => nodes.iter().for_each(|n| n.push_plain_text(out)),
                None => {
                    out.push('|');
                    out.push_str(name);
                    out.push('|');
                }
            },
            InlineNode::Image { alt, .. } => out.push_str(alt.as_deref().unwrap_or_default()),
        }
    }
}

/// An inline-parsed run of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpanNode {
    raw: String,
    content: Vec<InlineNode>,
}

impl SpanNode {
    pub fn new(raw: impl Into<String>, content: Vec<InlineNode>) -> Self {
        Self {
            raw: raw.into(),
            content,
        }
    }

    /// A span holding plain text only.
    pub fn text(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let content = if raw.is_empty() {
            vec![]
        } else {
            vec![InlineNode::Text(raw.clone())]
        };
        Self { raw, content }
    }

    /// The source text before inline parsing.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn content(&self) -> &[InlineNode] {
        &self.content
    }

    pub(crate) fn content_mut(&mut self) -> &mut Vec<InlineNode> {
        &mut self.content
    }

    /// Text with markup stripped: link text for links, verbatim literals.
    #[must_use]
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for node in &self.content {
            node.push_plain_text(&mut out);
        }
        out
    }

    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.content.iter().filter_map(|n| match n {
            InlineNode::Link(link) => Some(link),
            _ => None,
        })
    }
}

/// Parse-time record of a recognised inline construct, keyed by the
/// placeholder id that stands in for it in the working text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanToken {
    pub id: String,
    pub payload: TokenPayload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanTokenKind {
    Literal,
    Reference,
    Link,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenPayload {
    Literal(String),
    Link(Link),
    Reference(CrossReference),
    Target { name: String, anchor: String },
    Substitution { name: String },
}

impl SpanToken {
    #[must_use]
    pub fn kind(&self) -> SpanTokenKind {
        match self.payload {
            TokenPayload::Literal(_) => SpanTokenKind::Literal,
            TokenPayload::Reference(_) | TokenPayload::Substitution { .. } => {
                SpanTokenKind::Reference
            }
            TokenPayload::Link(_) | TokenPayload::Target { .. } => SpanTokenKind::Link,
        }
    }

    pub fn into_inline(self) -> InlineNode {
        match self.payload {
            TokenPayload::Literal(text) => InlineNode::Literal(text),
            TokenPayload::Link(link) => InlineNode::Link(link),
            TokenPayload::Reference(r) => InlineNode::Reference(r),
            TokenPayload::Target { name, anchor } => InlineNode::Target { name, anchor },
            TokenPayload::Substitution { name } => InlineNode::Substitution { name, value: None },
        }
    }
}
