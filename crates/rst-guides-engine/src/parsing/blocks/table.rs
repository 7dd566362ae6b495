//! # Table Parser
//!
//! Grid tables are drawn with `+`, `-`, `=` and `|`:
//!
//! ```text
//! +-------+-------+
//! | Name  | Value |
//! +=======+=======+
//! | a     | 1     |
//! +-------+-------+
//! ```
//!
//! Simple tables only use `=` borders and whitespace between columns:
//!
//! ```text
//! =====  =====
//! Name   Value
//! =====  =====
//! a      1
//! =====  =====
//! ```
//!
//! Parsing is pure: cells come back as raw text together with any problems
//! found, and the block driver inline-parses and reports them.

use super::classify::{is_blank, is_table_border_line};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableMode {
    Grid,
    Simple,
}

impl TableMode {
    /// Mode of a table whose first line is `line`, if it opens one.
    pub fn detect(line: &str) -> Option<TableMode> {
        if !is_table_border_line(line) {
            return None;
        }
        let trimmed = line.trim_end();
        if trimmed.starts_with('+') && trimmed.ends_with('+') && trimmed.len() > 2 {
            return Some(TableMode::Grid);
        }
        if trimmed.chars().all(|c| c == '=' || c == ' ') && column_runs(trimmed, '=').len() > 1 {
            return Some(TableMode::Simple);
        }
        None
    }

    /// Whether a line can still belong to a table of this mode.
    pub fn accepts(self, line: &str) -> bool {
        match self {
            TableMode::Grid => matches!(line.trim_start().chars().next(), Some('+' | '|')),
            TableMode::Simple => !is_blank(line),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCell {
    pub text: String,
    pub colspan: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<Vec<RawCell>>,
    pub rows: Vec<Vec<RawCell>>,
    pub columns: usize,
    /// Non-fatal problems, in the order found.
    pub problems: Vec<String>,
}

pub fn parse_table(mode: TableMode, lines: &[String]) -> RawTable {
    let lines: Vec<Vec<char>> = lines.iter().map(|l| l.trim_end().chars().collect()).collect();
    let mut table = match mode {
        TableMode::Grid => parse_grid(&lines),
        TableMode::Simple => parse_simple(&lines),
    };
    pad_rows(&mut table);
    table
}

fn is_full_separator(line: &[char]) -> bool {
    line.first() == Some(&'+') && line.iter().all(|c| matches!(c, '+' | '-' | '='))
}

fn is_partial_separator(line: &[char]) -> bool {
    line.first() == Some(&'|')
        && line
            .windows(2)
            .any(|w| (w[0] == '+' && w[1] == '-') || (w[0] == '-' && w[1] == '+'))
}

fn parse_grid(lines: &[Vec<char>]) -> RawTable {
    let mut table = RawTable::default();

    let mut boundaries: Vec<usize> = lines
        .iter()
        .filter(|l| is_full_separator(l))
        .flat_map(|l| l.iter().enumerate().filter(|(_, c)| **c == '+').map(|(i, _)| i))
        .collect();
    boundaries.sort_unstable();
    boundaries.dedup();
    if boundaries.len() < 2 {
        table.problems.push("Malformed grid table: no column borders".to_string());
        return table;
    }
    table.columns = boundaries.len() - 1;

    let mut header_separators = 0usize;
    let mut rows: Vec<Vec<RawCell>> = vec![];
    let mut header_rows: Option<usize> = None;
    let mut pending: Vec<&[char]> = vec![];

    for line in lines {
        if is_full_separator(line) {
            if !pending.is_empty() {
                rows.push(grid_row(&pending, &boundaries));
                pending.clear();
            }
            if line.contains(&'=') {
                header_separators += 1;
                if header_rows.is_none() {
                    header_rows = Some(rows.len());
                }
            }
            continue;
        }
        if is_partial_separator(line) {
            table
                .problems
                .push("Row spans are not supported in grid tables".to_string());
            continue;
        }
        pending.push(line);
    }
    if !pending.is_empty() {
        table
            .problems
            .push("Malformed grid table: missing bottom border".to_string());
        rows.push(grid_row(&pending, &boundaries));
    }
    if header_separators > 1 {
        table
            .problems
            .push("Malformed grid table: multiple header separators".to_string());
    }

    match header_rows {
        Some(n) => {
            table.rows = rows.split_off(n.min(rows.len()));
            table.headers = rows;
        }
        None => table.rows = rows,
    }
    table
}

/// One grid row from its content lines. A boundary only splits cells when
/// every line of the row has a `|` there.
fn grid_row(lines: &[&[char]], boundaries: &[usize]) -> Vec<RawCell> {
    let is_border = |col: usize| {
        lines
            .iter()
            .all(|l| matches!(l.get(col), Some('|' | '+') | None))
    };

    let mut cells = vec![];
    let mut start = 0usize;
    for end in 1..boundaries.len() {
        if end + 1 < boundaries.len() && !is_border(boundaries[end]) {
            continue;
        }
        let (from, to) = (boundaries[start] + 1, boundaries[end]);
        let text = lines
            .iter()
            .map(|l| slice(l, from, to).trim().to_string())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        cells.push(RawCell {
            text,
            colspan: end - start,
        });
        start = end;
    }
    cells
}

fn parse_simple(lines: &[Vec<char>]) -> RawTable {
    let mut table = RawTable::default();
    let Some(first) = lines.first() else {
        return table;
    };
    let first: String = first.iter().collect();
    let columns = column_runs(&first, '=');
    table.columns = columns.len();

    let borders: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| is_simple_border(l))
        .map(|(i, _)| i)
        .collect();
    // A second border that is not the last line closes the header.
    let header_end = borders.get(1).copied().filter(|&i| i + 1 < lines.len());

    let mut headers: Vec<Vec<String>> = vec![];
    let mut rows: Vec<Vec<String>> = vec![];

    for (i, line) in lines.iter().enumerate().skip(1) {
        if is_simple_border(line) || is_span_rule(line) || line.is_empty() {
            continue;
        }
        let in_header = header_end.is_some_and(|end| i < end);
        let target = if in_header { &mut headers } else { &mut rows };

        let mut texts = Vec::with_capacity(columns.len());
        for (c, &(from, to)) in columns.iter().enumerate() {
            let to = if c + 1 == columns.len() { line.len() } else { to };
            texts.push(slice(line, from, to).trim().to_string());
            if let Some(&(next_from, _)) = columns.get(c + 1)
                && !slice(line, to, next_from).trim().is_empty()
            {
                table.problems.push(format!(
                    "Text in the column margin of a simple table on row {}",
                    i + 1
                ));
            }
        }

        let continues = !target.is_empty() && texts.first().is_some_and(String::is_empty);
        if !continues {
            target.push(texts);
            continue;
        }
        if let Some(previous) = target.last_mut() {
            for (cell, text) in previous.iter_mut().zip(texts) {
                if !text.is_empty() {
                    if !cell.is_empty() {
                        cell.push('\n');
                    }
                    cell.push_str(&text);
                }
            }
        }
    }

    let to_cells = |row: Vec<String>| {
        row.into_iter()
            .map(|text| RawCell { text, colspan: 1 })
            .collect::<Vec<_>>()
    };
    table.headers = headers.into_iter().map(to_cells).collect();
    table.rows = rows.into_iter().map(to_cells).collect();
    table
}

fn is_simple_border(line: &[char]) -> bool {
    !line.is_empty() && line.iter().all(|c| *c == '=' || *c == ' ')
}

/// A `---` rule under header cells; column spans are not tracked.
fn is_span_rule(line: &[char]) -> bool {
    !line.is_empty() && line.iter().all(|c| *c == '-' || *c == ' ')
}

/// Char ranges of the runs of `letter` in `line`.
fn column_runs(line: &str, letter: char) -> Vec<(usize, usize)> {
    let mut runs = vec![];
    let mut start = None;
    for (i, c) in line.chars().enumerate() {
        match (c == letter, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                runs.push((s, i));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push((s, line.chars().count()));
    }
    runs
}

fn slice(line: &[char], from: usize, to: usize) -> String {
    let to = to.min(line.len());
    if from >= to {
        return String::new();
    }
    line[from..to].iter().collect()
}

fn pad_rows(table: &mut RawTable) {
    let columns = table.columns;
    for row in table.headers.iter_mut().chain(table.rows.iter_mut()) {
        let used: usize = row.iter().map(|c| c.colspan).sum();
        for _ in used..columns {
            row.push(RawCell {
                text: String::new(),
                colspan: 1,
            });
        }
    }
}
