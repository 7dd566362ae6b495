use log::{debug, trace};

use crate::directives;
use crate::models::{
    Code, DefinitionItem, List, ListItem, Node, NodeKind, Table, TableCell, TableRow, Title,
};
use crate::parsing::Parser;
use crate::parsing::rope::{LineRef, Lines};

use super::{
    buffer::Buffer,
    classify::{
        ends_with_literal_marker, is_blank, is_comment_line, is_definition_list_term_end,
        is_indented, is_list_item_line, section_adornment,
    },
    kinds::{Adornment, DirectiveLine, LinkTarget},
    line_data::split_definition_list,
    states::{DirectiveState, ListState, State, TableState, TitleState},
    table::{RawCell, TableMode, parse_table},
};

/// Drives the block states over the lines of one document or fragment.
pub struct BlockBuilder<'p> {
    parser: &'p mut Parser,
    lines: Lines,
    state: State,
    out: Vec<Node>,
    /// Open sections as (level, title id), outermost first.
    sections: Vec<(usize, String)>,
    /// Anchor declared just before the next block, if any.
    pending_anchor: Option<String>,
    /// The previous paragraph ended with `::`.
    literal_pending: bool,
}

impl<'p> BlockBuilder<'p> {
    pub fn new(parser: &'p mut Parser, text: &str, first_line: usize) -> Self {
        let tab_width = parser.environment().config().tab_width;
        Self {
            parser,
            lines: Lines::from_text(text, first_line, tab_width),
            state: State::Begin,
            out: vec![],
            sections: vec![],
            pending_anchor: None,
            literal_pending: false,
        }
    }

    pub fn build(mut self) -> Vec<Node> {
        while let Some(line) = self.lines.current().cloned() {
            let next = self.lines.peek().map(|l| l.text.clone());
            self.parser.environment_mut().set_line(line.number);

            let mut state = std::mem::replace(&mut self.state, State::Begin);
            if state.accepts(&line.text, next.as_deref()) {
                self.state = state;
                self.lines.advance();
                continue;
            }

            if let State::Paragraph(buf) = &mut state
                && let Some(letter) = section_adornment(&line.text)
                && let Some(text) = buf.pop()
            {
                let rest = std::mem::take(buf);
                self.leave(State::Paragraph(rest));
                if !Adornment::covers(&text, &line.text) {
                    self.parser
                        .environment_mut()
                        .warning(format!("Title underline too short for \"{}\"", text.trim()));
                }
                self.lines.advance();
                self.state = State::Title(TitleState {
                    text: text.trim().to_string(),
                    letter,
                    overline: false,
                    line: line.number.saturating_sub(1),
                });
                continue;
            }

            trace!("{} rejected line {}", state.name(), line.number);
            self.leave(state);
            self.state = self.begin(&line, next.as_deref());
        }

        let state = std::mem::replace(&mut self.state, State::Begin);
        self.leave(state);
        if self.literal_pending {
            self.literal_pending = false;
            self.parser
                .environment_mut()
                .warning("Literal block expected after \"::\"");
        }
        self.close_sections(0);
        self.out
    }

    /// Classifies `line` and enters the state it opens, consuming the line.
    fn begin(&mut self, line: &LineRef, next: Option<&str>) -> State {
        let text = line.text.as_str();
        self.lines.advance();

        if is_blank(text) {
            return State::Begin;
        }

        let literal_pending = std::mem::take(&mut self.literal_pending);
        if literal_pending {
            if is_indented(text, 1) {
                debug!("Literal block at line {}", line.number);
                let mut buf = Buffer::new(line.number);
                buf.push(text);
                return State::Code(buf);
            }
            self.parser
                .environment_mut()
                .warning("Literal block expected after \"::\"");
        }

        if let Some(target) = LinkTarget::parse(text) {
            self.register_target(target);
            return State::Begin;
        }

        if let Some(directive) = DirectiveLine::parse(text) {
            debug!("Directive {} at line {}", directive.name, line.number);
            return State::Directive(DirectiveState::new(directive, line.number));
        }

        if is_comment_line(text) {
            return State::Comment {
                empty: text.trim() == "..",
            };
        }

        if is_list_item_line(text, next)
            && let Some(list) = ListState::new(text, line.number)
        {
            return State::List(list);
        }

        if let Some(letter) = section_adornment(text) {
            return self.begin_adorned(letter, line.number);
        }

        if let Some(mode) = TableMode::detect(text) {
            let mut lines = Buffer::new(line.number);
            lines.push(text);
            return State::Table(TableState { mode, lines });
        }

        if is_indented(text, 1) {
            let mut buf = Buffer::new(line.number);
            buf.push(text);
            return State::BlockQuote(buf);
        }

        let mut buf = Buffer::new(line.number);
        buf.push(text);
        if is_definition_list_term_end(text, next) {
            return State::DefinitionList(buf);
        }
        State::Paragraph(buf)
    }

    /// An adornment line outside a paragraph: an overlined title when text
    /// and a matching underline follow, otherwise a separator.
    fn begin_adorned(&mut self, letter: char, number: usize) -> State {
        let title = self.lines.current().map(|l| l.text.clone());
        let underline = self.lines.peek().map(|l| l.text.clone());

        if let (Some(title), Some(underline)) = (title, underline)
            && !is_blank(&title)
            && let Some(under_letter) = section_adornment(&underline)
        {
            if under_letter != letter {
                self.parser.environment_mut().warning(format!(
                    "Title overline and underline differ for \"{}\"",
                    title.trim()
                ));
            }
            self.lines.advance();
            self.lines.advance();
            return State::Title(TitleState {
                text: title.trim().to_string(),
                letter: under_letter,
                overline: true,
                line: number + 1,
            });
        }
        State::Separator(letter)
    }

    fn register_target(&mut self, target: LinkTarget) {
        let env = self.parser.environment_mut();
        match target {
            LinkTarget::Named { name, url } => env.set_link(&name, &url),
            LinkTarget::Anonymous { url } => env.push_anonymous_target(&url),
            LinkTarget::Anchor { name } => {
                env.add_anchor(&name, None);
                self.out.push(Node::new(NodeKind::Anchor { name: name.clone() }));
                self.pending_anchor = Some(name);
            }
        }
    }

    fn leave(&mut self, state: State) {
        match state {
            State::Begin | State::Comment { .. } => {}
            State::Paragraph(buf) => self.leave_paragraph(buf),
            State::Title(title) => self.leave_title(title),
            State::Separator(letter) => {
                let level = self.parser.environment_mut().level_for(letter);
                self.emit(Node::new(NodeKind::Separator { level }));
            }
            State::List(list) => self.leave_list(list),
            State::DefinitionList(buf) => self.leave_definition_list(buf),
            State::Table(table) => self.leave_table(table),
            State::Code(mut buf) => {
                buf.trim_trailing_blanks();
                let value = buf.unindented().join("\n");
                self.emit(Node::new(NodeKind::Code(Code {
                    value,
                    language: None,
                    raw: false,
                })));
            }
            State::BlockQuote(mut buf) => {
                buf.trim_trailing_blanks();
                let body = buf.unindented().join("\n");
                let nodes = self.parser.parse_fragment(&body, buf.first_line());
                self.emit(Node::new(NodeKind::BlockQuote(nodes)));
            }
            State::Directive(directive) => {
                for node in directives::dispatch(self.parser, directive) {
                    self.emit(node);
                }
            }
        }
    }

    fn leave_paragraph(&mut self, buf: Buffer) {
        if buf.is_empty() {
            return;
        }
        let mut text = buf
            .lines()
            .iter()
            .map(|l| l.trim())
            .collect::<Vec<_>>()
            .join("\n");
        if ends_with_literal_marker(&text) {
            self.literal_pending = true;
            text = strip_literal_marker(&text);
        }
        if text.trim().is_empty() {
            return;
        }
        let span = self.parser.parse_span(&text);
        self.emit(Node::paragraph(span));
    }

    fn leave_title(&mut self, title: TitleState) {
        let env = self.parser.environment_mut();
        env.set_line(title.line);
        let level = env.level_for(title.letter);
        let id = env.create_title_id(level);
        let span = self.parser.parse_span(&title.text);
        let plain = span.plain_text();

        let env = self.parser.environment_mut();
        let slug = env.add_anchor(&plain, Some(plain.clone()));
        let target = self.pending_anchor.take().map(|name| {
            env.add_anchor(&name, Some(plain.clone()));
            name
        });
        debug!("Title {id} \"{plain}\" at level {level}");

        self.close_sections(level);
        self.out.push(Node::new(NodeKind::SectionBegin { title: id.clone() }));
        self.sections.push((level, id.clone()));
        self.emit(Node::new(NodeKind::Title(Title {
            text: span,
            level,
            slug,
            id,
            target,
        })));
    }

    fn leave_list(&mut self, list: ListState) {
        let ordered = list.marker.is_ordered();
        let mut items = Vec::with_capacity(list.items.len());
        for mut item in list.items {
            item.lines.trim_trailing_blanks();
            let body = item.lines.unindented().join("\n");
            let contents = self.parser.parse_fragment(&body, item.lines.first_line());
            items.push(ListItem {
                prefix: item.prefix,
                contents,
            });
        }
        self.emit(Node::new(NodeKind::List(List { ordered, items })));
    }

    fn leave_definition_list(&mut self, mut buf: Buffer) {
        buf.trim_trailing_blanks();
        let mut items = vec![];
        for entry in split_definition_list(&buf) {
            self.parser.environment_mut().set_line(entry.line);
            let term = self.parser.parse_span(&entry.term);
            let classifiers = entry
                .classifiers
                .iter()
                .map(|c| self.parser.parse_span(c))
                .collect();
            let definition = self
                .parser
                .parse_fragment(&entry.definition.join("\n"), entry.line + 1);
            items.push(DefinitionItem {
                term,
                classifiers,
                definition,
            });
        }
        self.emit(Node::new(NodeKind::DefinitionList(items)));
    }

    fn leave_table(&mut self, table: TableState) {
        let raw = parse_table(table.mode, table.lines.lines());
        for problem in &raw.problems {
            self.parser.environment_mut().warning(problem.clone());
        }
        let mut rows_of = |rows: Vec<Vec<RawCell>>| -> Vec<TableRow> {
            rows.into_iter()
                .map(|cells| TableRow {
                    cells: cells
                        .into_iter()
                        .map(|cell| TableCell {
                            content: self.parser.parse_span(&cell.text),
                            colspan: cell.colspan,
                        })
                        .collect(),
                })
                .collect()
        };
        let headers = rows_of(raw.headers);
        let rows = rows_of(raw.rows);
        self.emit(Node::new(NodeKind::Table(Table {
            headers,
            rows,
            columns: raw.columns,
        })));
    }

    /// Appends a block, attaching classes left by a bodiless `class`
    /// directive. A pending anchor only survives until the next block.
    fn emit(&mut self, mut node: Node) {
        let marker = matches!(
            node.kind(),
            NodeKind::Anchor { .. } | NodeKind::SectionBegin { .. } | NodeKind::SectionEnd { .. }
        );
        if !marker {
            self.pending_anchor = None;
            for class in self.parser.take_pending_classes() {
                node.add_class(class);
            }
        }
        self.out.push(node);
    }

    /// Closes every open section at `level` or deeper.
    fn close_sections(&mut self, level: usize) {
        while let Some((open, _)) = self.sections.last()
            && *open >= level
        {
            if let Some((_, id)) = self.sections.pop() {
                self.out.push(Node::new(NodeKind::SectionEnd { title: id }));
            }
        }
    }
}

/// `Text::` becomes `Text:`, `Text ::` becomes `Text` and a lone `::`
/// disappears.
fn strip_literal_marker(text: &str) -> String {
    let trimmed = text.trim_end();
    let without = &trimmed[..trimmed.len() - 2];
    if without.trim().is_empty() {
        String::new()
    } else if without.ends_with(char::is_whitespace) {
        without.trim_end().to_string()
    } else {
        format!("{without}:")
    }
}
