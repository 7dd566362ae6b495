//! # Block States
//!
//! The closed set of states the block driver moves between. Each state owns
//! its buffered lines and decides, one line at a time, whether the line
//! still belongs to it (`accepts`). Producing nodes on leave is the driver's
//! job, since it needs the parser for inline and nested parsing.

use std::collections::BTreeMap;

use super::{
    buffer::Buffer,
    classify::{
        indentation, is_blank, is_comment_line, is_definition_list_ended, is_directive_line,
        is_indented, is_list_item_line, section_adornment,
    },
    kinds::{DirectiveLine, ListMarker, parse_option},
    table::TableMode,
};

#[derive(Debug)]
pub enum State {
    /// Between blocks. Never accepts a line; the driver classifies it.
    Begin,
    Paragraph(Buffer),
    Title(TitleState),
    Separator(char),
    List(ListState),
    DefinitionList(Buffer),
    Table(TableState),
    Code(Buffer),
    BlockQuote(Buffer),
    /// `empty` for a bare `..`, which ends at the first blank line.
    Comment { empty: bool },
    Directive(DirectiveState),
}

impl State {
    /// Short name used in trace logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            State::Begin => "begin",
            State::Paragraph(_) => "paragraph",
            State::Title(_) => "title",
            State::Separator(_) => "separator",
            State::List(_) => "list",
            State::DefinitionList(_) => "definition-list",
            State::Table(_) => "table",
            State::Code(_) => "code",
            State::BlockQuote(_) => "quote",
            State::Comment { .. } => "comment",
            State::Directive(_) => "directive",
        }
    }

    /// Offers `line` to the state. Accepted lines are buffered.
    pub fn accepts(&mut self, line: &str, next: Option<&str>) -> bool {
        match self {
            State::Begin | State::Title(_) | State::Separator(_) => false,
            State::Paragraph(buf) => {
                let accepted = !is_blank(line)
                    && section_adornment(line).is_none()
                    && !is_directive_line(line)
                    && !is_comment_line(line);
                if accepted {
                    buf.push(line);
                }
                accepted
            }
            State::List(list) => list.accepts(line, next),
            State::DefinitionList(buf) => {
                let accepted = if is_blank(line) || indentation(line) > 0 {
                    true
                } else {
                    !is_directive_line(line)
                        && !is_comment_line(line)
                        && !is_list_item_line(line, next)
                        && !is_definition_list_ended(line, next)
                };
                if accepted {
                    buf.push(line);
                }
                accepted
            }
            State::Table(table) => {
                let accepted = table.mode.accepts(line);
                if accepted {
                    table.lines.push(line);
                }
                accepted
            }
            State::Code(buf) | State::BlockQuote(buf) => {
                let accepted = is_indented(line, 1) || (is_blank(line) && continues_indented(next));
                if accepted {
                    buf.push(line);
                }
                accepted
            }
            State::Comment { empty } => {
                is_indented(line, 1) || (!*empty && is_blank(line) && continues_indented(next))
            }
            State::Directive(directive) => directive.accepts(line, next),
        }
    }
}

fn continues_indented(next: Option<&str>) -> bool {
    next.is_some_and(|n| is_indented(n, 1) || is_blank(n))
}

/// A title line with its adornment, waiting to be leveled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleState {
    pub text: String,
    /// Underline character; it alone decides the level.
    pub letter: char,
    pub overline: bool,
    pub line: usize,
}

#[derive(Debug)]
pub struct ListItemBuffer {
    pub prefix: String,
    pub lines: Buffer,
}

#[derive(Debug)]
pub struct ListState {
    pub marker: ListMarker,
    pub items: Vec<ListItemBuffer>,
    /// Column where the current item's text starts.
    offset: Option<usize>,
    last_blank: bool,
}

impl ListState {
    /// Opens a list with the item on `line`.
    pub fn new(line: &str, number: usize) -> Option<Self> {
        let marker = ListMarker::parse(line)?;
        let mut state = Self {
            marker: marker.clone(),
            items: vec![],
            offset: None,
            last_blank: false,
        };
        state.open_item(&marker, line, number);
        Some(state)
    }

    fn open_item(&mut self, marker: &ListMarker, line: &str, number: usize) {
        let mut lines = Buffer::new(number);
        self.offset = marker.content_offset;
        if let Some(offset) = marker.content_offset {
            lines.push(line.chars().skip(offset).collect::<String>());
        }
        self.items.push(ListItemBuffer {
            prefix: marker.text.clone(),
            lines,
        });
        self.last_blank = false;
    }

    fn push(&mut self, line: String) {
        if let Some(item) = self.items.last_mut() {
            item.lines.push(line);
        }
    }

    pub fn accepts(&mut self, line: &str, next: Option<&str>) -> bool {
        if is_blank(line) {
            let continues = next.is_some_and(|n| {
                is_indented(n, 1)
                    || (is_list_item_line(n, None)
                        && ListMarker::parse(n).is_some_and(|m| m.same_list(&self.marker)))
            });
            if continues {
                self.push(String::new());
                self.last_blank = true;
            }
            return continues;
        }

        if let Some(marker) = ListMarker::parse(line)
            && marker.same_list(&self.marker)
            && is_list_item_line(line, next)
        {
            let number = self
                .items
                .last()
                .map_or(0, |i| i.lines.first_line() + i.lines.len());
            self.open_item(&marker, line, number);
            return true;
        }

        let indent = indentation(line);
        if indent > 0 {
            let offset = *self.offset.get_or_insert(indent);
            self.push(line[indent.min(offset)..].to_string());
            self.last_blank = false;
            return true;
        }

        // Lazy continuation of the item's last paragraph.
        if !self.last_blank
            && section_adornment(line).is_none()
            && !is_directive_line(line)
            && !is_comment_line(line)
            && ListMarker::parse(line).is_none()
        {
            self.push(line.to_string());
            return true;
        }
        false
    }
}

#[derive(Debug)]
pub struct TableState {
    pub mode: TableMode,
    pub lines: Buffer,
}

#[derive(Debug)]
pub struct DirectiveState {
    pub line: DirectiveLine,
    /// Source line of the `.. name::` line.
    pub number: usize,
    pub options: BTreeMap<String, String>,
    pub body: Buffer,
    in_options: bool,
    /// Lines accepted after the directive line.
    seen: usize,
}

impl DirectiveState {
    pub fn new(line: DirectiveLine, number: usize) -> Self {
        Self {
            line,
            number,
            options: BTreeMap::new(),
            body: Buffer::new(number + 1),
            in_options: true,
            seen: 0,
        }
    }

    /// Whether the body starts on the line right after the directive.
    #[must_use]
    pub fn body_follows_directly(&self) -> bool {
        !self.body.is_empty() && self.body.first_line() == self.number + 1
    }

    pub fn accepts(&mut self, line: &str, next: Option<&str>) -> bool {
        let accepted = self.accept_line(line, next);
        if accepted {
            self.seen += 1;
        }
        accepted
    }

    fn accept_line(&mut self, line: &str, next: Option<&str>) -> bool {
        if is_blank(line) {
            self.in_options = false;
            let continues = continues_indented(next);
            if continues && !self.body.is_empty() {
                self.body.push(String::new());
            }
            return continues;
        }
        if !is_indented(line, 1) {
            return false;
        }
        if self.in_options
            && let Some((key, value)) = parse_option(line)
        {
            self.options.insert(key, value);
            return true;
        }
        self.in_options = false;
        if self.body.is_empty() {
            self.body = Buffer::new(self.number + self.seen + 1);
        }
        self.body.push(line);
        true
    }
}
