use crate::models::{Node, NodeKind};
use crate::parsing::inline::{InlineNode, SpanNode};

/// One line per node (and per list item, term, table row and link), indented
/// two spaces per nesting level.
#[must_use]
pub fn outline(nodes: &[Node]) -> Vec<String> {
    let mut lines = vec![];
    for node in nodes {
        push_node(node, 0, &mut lines);
    }
    lines
}

/// [`outline`] joined with newlines, for snapshot assertions.
#[must_use]
pub fn outline_string(nodes: &[Node]) -> String {
    outline(nodes).join("\n")
}

fn push(lines: &mut Vec<String>, depth: usize, text: String) {
    lines.push(format!("{}{text}", "  ".repeat(depth)));
}

fn push_node(node: &Node, depth: usize, lines: &mut Vec<String>) {
    let mut head = describe(node);
    if !node.classes().is_empty() {
        head.push_str(&format!(" .{}", node.classes().join(".")));
    }
    push(lines, depth, head);

    match node.kind() {
        NodeKind::Paragraph(span) => push_inline(span, depth + 1, lines),
        NodeKind::Title(title) => push_inline(&title.text, depth + 1, lines),
        NodeKind::List(list) => {
            for item in &list.items {
                push(lines, depth + 1, format!("item {}", item.prefix));
                push_children(&item.contents, depth + 2, lines);
            }
        }
        NodeKind::DefinitionList(items) => {
            for item in items {
                let mut term = format!("term {}", item.term.plain_text());
                for classifier in &item.classifiers {
                    term.push_str(&format!(" : {}", classifier.plain_text()));
                }
                push(lines, depth + 1, term);
                push_children(&item.definition, depth + 2, lines);
            }
        }
        NodeKind::Table(table) => {
            for (label, rows) in [("header", &table.headers), ("row", &table.rows)] {
                for row in rows {
                    let cells: Vec<String> = row
                        .cells
                        .iter()
                        .map(|c| match c.colspan {
                            1 => c.content.plain_text(),
                            n => format!("{} (span {n})", c.content.plain_text()),
                        })
                        .collect();
                    push(lines, depth + 1, format!("{label} | {} |", cells.join(" | ")));
                }
            }
        }
        NodeKind::Toc(toc) => {
            for entry in &toc.entries {
                push_toc_entry(entry, depth + 1, lines);
            }
        }
        _ => node.for_each_child(&mut |child| push_node(child, depth + 1, lines)),
    }
}

fn push_children(nodes: &[Node], depth: usize, lines: &mut Vec<String>) {
    for node in nodes {
        push_node(node, depth, lines);
    }
}

fn push_toc_entry(entry: &crate::models::TocEntry, depth: usize, lines: &mut Vec<String>) {
    push(
        lines,
        depth,
        format!(
            "entry {} \"{}\" -> {}",
            entry.path,
            entry.title.as_deref().unwrap_or_default(),
            entry.url
        ),
    );
    for child in &entry.children {
        push_toc_entry(child, depth + 1, lines);
    }
}

fn describe(node: &Node) -> String {
    match node.kind() {
        NodeKind::Paragraph(span) => format!("paragraph \"{}\"", span.plain_text()),
        NodeKind::Title(t) => format!("title[{}] \"{}\" #{}", t.level, t.text.plain_text(), t.slug),
        NodeKind::Separator { level } => format!("separator[{level}]"),
        NodeKind::List(list) => {
            let kind = if list.ordered { "ordered" } else { "bullet" };
            format!("list {kind}")
        }
        NodeKind::DefinitionList(_) => "definition-list".to_string(),
        NodeKind::Table(table) => format!("table {} columns", table.columns),
        NodeKind::Code(code) => {
            let language = code.language.as_deref().unwrap_or("-");
            format!("code[{language}] {:?}", code.value)
        }
        NodeKind::BlockQuote(_) => "quote".to_string(),
        NodeKind::Admonition(a) => format!("admonition {} \"{}\"", a.kind, a.title),
        NodeKind::Figure(f) => format!("figure {}", f.image.uri),
        NodeKind::Image(image) => format!("image {}", image.uri),
        NodeKind::Container(_) => "container".to_string(),
        NodeKind::Generic { name, value } => format!("generic {name} {value:?}"),
        NodeKind::Raw(raw) => format!("raw {raw:?}"),
        NodeKind::Toc(toc) => format!("toc [{}]", toc.files.join(", ")),
        NodeKind::Anchor { name } => format!("anchor {name}"),
        NodeKind::SectionBegin { title } => format!("section-begin {title}"),
        NodeKind::SectionEnd { title } => format!("section-end {title}"),
        NodeKind::Error { message, .. } => format!("error {message:?}"),
    }
}

/// Links, references, targets and substitutions inside a span.
fn push_inline(span: &SpanNode, depth: usize, lines: &mut Vec<String>) {
    for inline in span.content() {
        push_inline_node(inline, depth, lines);
    }
}

fn push_inline_node(inline: &InlineNode, depth: usize, lines: &mut Vec<String>) {
    let url = |u: &Option<String>| u.clone().unwrap_or_else(|| "?".to_string());
    match inline {
        InlineNode::Text(_) => {}
        InlineNode::Literal(text) => push(lines, depth, format!("literal {text:?}")),
        InlineNode::Link(link) => push(
            lines,
            depth,
            format!("link \"{}\" -> {}", link.text, url(&link.url)),
        ),
        InlineNode::Reference(r) => push(
            lines,
            depth,
            format!(
                ":{}:{} -> {}",
                r.role,
                r.target,
                url(&r.resolved.as_ref().map(|x| x.url.clone()))
            ),
        ),
        InlineNode::Target { name, anchor } => {
            push(lines, depth, format!("target \"{name}\" #{anchor}"))
        }
        InlineNode::Substitution { name, value } => {
            push(lines, depth, format!("substitution |{name}|"));
            for node in value.iter().flatten() {
                push_inline_node(node, depth + 1, lines);
            }
        }
        InlineNode::Image { uri, .. } => push(lines, depth, format!("image {uri}")),
    }
}
