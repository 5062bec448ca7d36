use pulldown_cmark::{Alignment, Event, Options, Parser, Tag, TagEnd};
use ratatui::style::Style;
use ratatui::text::Span;
use unicode_width::UnicodeWidthStr;

use super::code::{code_block_lines, language_hint};
use crate::ui::ansi::paint;
use crate::ui::theme::Theme;
use crate::ui::wrap::wrap_spans;

const QUOTE_MARKER: &str = "▌ ";
const MIN_CONTENT_WIDTH: usize = 10;

#[derive(Debug, Clone, Copy)]
enum ListKind {
    Unordered,
    Ordered(u64),
}

#[derive(Debug)]
struct ListLevel {
    kind: ListKind,
    /// Display width of the marker of the item currently open at this level.
    marker_width: usize,
}

#[derive(Debug)]
struct CodeBuffer {
    lang: String,
    text: String,
}

#[derive(Debug, Default)]
struct TableBuffer {
    alignments: Vec<Alignment>,
    rows: Vec<Vec<Vec<Span<'static>>>>,
    current_row: Vec<Vec<Span<'static>>>,
    header_rows: usize,
}

pub(super) struct AnsiMarkdownRenderer<'a> {
    content: &'a str,
    theme: &'a Theme,
    width: usize,
    out: Vec<String>,
    spans: Vec<Span<'static>>,
    style_stack: Vec<Style>,
    list_stack: Vec<ListLevel>,
    quote_depth: usize,
    /// Marker waiting to prefix the first line of the open list item.
    pending_marker: Option<Span<'static>>,
    /// Target and accumulated text of each open link.
    link_stack: Vec<(String, String)>,
    code: Option<CodeBuffer>,
    table: Option<TableBuffer>,
}

impl<'a> AnsiMarkdownRenderer<'a> {
    pub(super) fn new(content: &'a str, theme: &'a Theme, width: usize) -> Self {
        Self {
            content,
            theme,
            width,
            out: Vec::new(),
            spans: Vec::new(),
            style_stack: Vec::new(),
            list_stack: Vec::new(),
            quote_depth: 0,
            pending_marker: None,
            link_stack: Vec::new(),
            code: None,
            table: None,
        }
    }

    fn current_style(&self) -> Style {
        self.style_stack
            .iter()
            .fold(Style::default(), |acc, style| acc.patch(*style))
    }

    fn push_text(&mut self, text: &str, style: Style) {
        if text.is_empty() {
            return;
        }
        for (_, link_text) in &mut self.link_stack {
            link_text.push_str(text);
        }
        if let Some(last) = self.spans.last_mut() {
            if last.style == style {
                last.content.to_mut().push_str(text);
                return;
            }
        }
        self.spans.push(Span::styled(text.to_string(), style));
    }

    fn push_styled_text(&mut self, text: &str) {
        let style = self.current_style();
        self.push_text(text, style);
    }

    fn quote_prefix(&self) -> Vec<Span<'static>> {
        (0..self.quote_depth)
            .map(|_| Span::styled(QUOTE_MARKER, self.theme.md_quote_marker_style))
            .collect()
    }

    fn list_indent(&self) -> usize {
        self.list_stack.iter().map(|level| level.marker_width).sum()
    }

    fn content_width(&self) -> usize {
        let used = self.quote_depth * QUOTE_MARKER.width() + self.list_indent();
        self.width.saturating_sub(used).max(MIN_CONTENT_WIDTH)
    }

    /// Prefix for the next emitted line. Consumes the pending list marker.
    fn take_line_prefix(&mut self) -> Vec<Span<'static>> {
        let mut prefix = self.quote_prefix();
        match self.pending_marker.take() {
            Some(marker) => {
                let parent = self.list_indent() - self.list_stack.last().map_or(0, |l| l.marker_width);
                if parent > 0 {
                    prefix.push(Span::raw(" ".repeat(parent)));
                }
                prefix.push(marker);
            }
            None => {
                let indent = self.list_indent();
                if indent > 0 {
                    prefix.push(Span::raw(" ".repeat(indent)));
                }
            }
        }
        prefix
    }

    fn emit_line(&mut self, spans: Vec<Span<'static>>) {
        let mut line = self.take_line_prefix();
        line.extend(spans);
        self.out.push(spans_to_ansi(&line));
    }

    /// Blank line between blocks, except directly under a list marker.
    fn block_gap(&mut self) {
        if self.pending_marker.is_some() || self.out.is_empty() {
            return;
        }
        if self.out.last().is_some_and(|line| line.is_empty()) {
            return;
        }
        let prefix = self.quote_prefix();
        let gap = spans_to_ansi(&prefix).trim_end().to_string();
        self.out.push(gap);
    }

    fn flush_spans(&mut self) {
        if self.spans.is_empty() {
            return;
        }
        let spans = std::mem::take(&mut self.spans);
        let mut lines = wrap_spans(&spans, self.content_width());
        while lines.len() > 1 && lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }
        for line in lines {
            self.emit_line(line);
        }
    }

    fn start_list_item(&mut self) {
        self.flush_spans();
        let marker_style = self.theme.md_list_marker_style;
        let Some(level) = self.list_stack.last_mut() else {
            return;
        };
        let marker = match &mut level.kind {
            ListKind::Unordered => "• ".to_string(),
            ListKind::Ordered(n) => {
                let current = *n;
                *n += 1;
                format!("{current}. ")
            }
        };
        level.marker_width = marker.width();
        self.pending_marker = Some(Span::styled(marker, marker_style));
    }

    fn end_link(&mut self) {
        let Some((dest, text)) = self.link_stack.pop() else {
            return;
        };
        if !dest.is_empty() && dest != text {
            let url_style = self.theme.md_link_url_style;
            self.push_text(&format!(" ({dest})"), url_style);
        }
    }

    fn flush_code_block(&mut self) {
        let Some(code) = self.code.take() else {
            return;
        };
        let lines = code_block_lines(&code.lang, code.text.trim_end_matches('\n'));
        for line in lines {
            self.emit_line(line.spans);
        }
    }

    fn end_table_cell(&mut self) {
        let cell = std::mem::take(&mut self.spans);
        if let Some(table) = self.table.as_mut() {
            table.current_row.push(cell);
        }
    }

    fn end_table_row(&mut self, header: bool) {
        if let Some(table) = self.table.as_mut() {
            let row = std::mem::take(&mut table.current_row);
            table.rows.push(row);
            if header {
                table.header_rows = table.rows.len();
            }
        }
    }

    fn flush_table(&mut self) {
        let Some(table) = self.table.take() else {
            return;
        };
        let columns = table.rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut widths = vec![0usize; columns];
        for row in &table.rows {
            for (idx, cell) in row.iter().enumerate() {
                widths[idx] = widths[idx].max(spans_width(cell));
            }
        }

        let border = self.theme.md_table_border_style;
        let header_style = self.theme.md_table_header_style;
        for (row_idx, row) in table.rows.iter().enumerate() {
            let is_header = row_idx < table.header_rows;
            let mut line: Vec<Span<'static>> = Vec::new();
            for (col, width) in widths.iter().enumerate() {
                if col > 0 {
                    line.push(Span::styled(" │ ", border));
                }
                let cell = row.get(col).cloned().unwrap_or_default();
                let pad = width.saturating_sub(spans_width(&cell));
                let (left, right) = match table.alignments.get(col) {
                    Some(Alignment::Right) => (pad, 0),
                    Some(Alignment::Center) => (pad / 2, pad - pad / 2),
                    _ => (0, pad),
                };
                if left > 0 {
                    line.push(Span::raw(" ".repeat(left)));
                }
                for span in cell {
                    let style = if is_header {
                        span.style.patch(header_style)
                    } else {
                        span.style
                    };
                    line.push(Span::styled(span.content, style));
                }
                if right > 0 && col + 1 < columns {
                    line.push(Span::raw(" ".repeat(right)));
                }
            }
            self.emit_line(line);

            if is_header && row_idx + 1 == table.header_rows {
                let rule = widths
                    .iter()
                    .map(|w| "─".repeat(*w))
                    .collect::<Vec<_>>()
                    .join("─┼─");
                self.emit_line(vec![Span::styled(rule, border)]);
            }
        }
    }

    pub(super) fn render(mut self) -> String {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_GFM);
        let parser = Parser::new_ext(self.content, options);

        for event in parser {
            match event {
                Event::Start(tag) => match tag {
                    Tag::Paragraph => {
                        self.flush_spans();
                        self.block_gap();
                    }
                    Tag::Heading { level, .. } => {
                        self.flush_spans();
                        self.block_gap();
                        self.style_stack
                            .push(self.theme.md_heading_style(level as u8));
                    }
                    Tag::BlockQuote(_) => {
                        self.flush_spans();
                        self.block_gap();
                        self.quote_depth += 1;
                    }
                    Tag::CodeBlock(kind) => {
                        self.flush_spans();
                        self.block_gap();
                        self.code = Some(CodeBuffer {
                            lang: language_hint(&kind),
                            text: String::new(),
                        });
                    }
                    Tag::HtmlBlock => {
                        self.flush_spans();
                        self.block_gap();
                    }
                    Tag::List(start) => {
                        self.flush_spans();
                        if self.list_stack.is_empty() {
                            self.block_gap();
                        } else if self.pending_marker.is_some() {
                            // item opens directly with a nested list
                            self.emit_line(Vec::new());
                        }
                        self.list_stack.push(ListLevel {
                            kind: start.map_or(ListKind::Unordered, ListKind::Ordered),
                            marker_width: 0,
                        });
                    }
                    Tag::Item => self.start_list_item(),
                    Tag::FootnoteDefinition(label) => {
                        self.flush_spans();
                        self.block_gap();
                        let style = self.theme.md_link_url_style;
                        self.push_text(&format!("[{label}]: "), style);
                    }
                    Tag::Table(alignments) => {
                        self.flush_spans();
                        self.block_gap();
                        self.table = Some(TableBuffer {
                            alignments,
                            ..TableBuffer::default()
                        });
                    }
                    Tag::TableHead | Tag::TableRow => {}
                    Tag::TableCell => self.spans.clear(),
                    Tag::Emphasis => self.style_stack.push(self.theme.md_emphasis_style()),
                    Tag::Strong => self.style_stack.push(self.theme.md_strong_style()),
                    Tag::Strikethrough => {
                        self.style_stack.push(self.theme.md_strikethrough_style())
                    }
                    Tag::Link { dest_url, .. } => {
                        self.style_stack.push(self.theme.md_link_style);
                        self.link_stack.push((dest_url.to_string(), String::new()));
                    }
                    Tag::Image { .. } => self.style_stack.push(self.theme.md_emphasis_style()),
                    _ => {}
                },
                Event::End(tag_end) => match tag_end {
                    TagEnd::Paragraph | TagEnd::HtmlBlock | TagEnd::FootnoteDefinition => {
                        self.flush_spans()
                    }
                    TagEnd::Heading(_) => {
                        self.flush_spans();
                        self.style_stack.pop();
                    }
                    TagEnd::BlockQuote(_) => {
                        self.flush_spans();
                        self.quote_depth = self.quote_depth.saturating_sub(1);
                    }
                    TagEnd::CodeBlock => self.flush_code_block(),
                    TagEnd::List(_) => {
                        self.flush_spans();
                        self.list_stack.pop();
                    }
                    TagEnd::Item => {
                        self.flush_spans();
                        if self.pending_marker.is_some() {
                            self.emit_line(Vec::new());
                        }
                    }
                    TagEnd::Table => self.flush_table(),
                    TagEnd::TableHead => self.end_table_row(true),
                    TagEnd::TableRow => self.end_table_row(false),
                    TagEnd::TableCell => self.end_table_cell(),
                    TagEnd::Link => {
                        self.style_stack.pop();
                        self.end_link();
                    }
                    TagEnd::Emphasis
                    | TagEnd::Strong
                    | TagEnd::Strikethrough
                    | TagEnd::Image => {
                        self.style_stack.pop();
                    }
                    _ => {}
                },
                Event::Text(text) => {
                    if let Some(code) = self.code.as_mut() {
                        code.text.push_str(&text);
                    } else {
                        self.push_styled_text(&text.replace('\t', "    "));
                    }
                }
                Event::Code(code) | Event::InlineMath(code) | Event::DisplayMath(code) => {
                    let style = self.current_style().patch(self.theme.md_inline_code_style);
                    self.push_text(&code, style);
                }
                Event::Html(html) | Event::InlineHtml(html) => {
                    self.push_styled_text(&html);
                }
                Event::SoftBreak => self.push_styled_text(" "),
                Event::HardBreak => self.push_text("\n", Style::default()),
                Event::Rule => {
                    self.flush_spans();
                    self.block_gap();
                    let rule = "─".repeat(self.content_width());
                    let style = self.theme.md_rule_style;
                    self.emit_line(vec![Span::styled(rule, style)]);
                }
                Event::TaskListMarker(checked) => {
                    let marker = if checked { "☒ " } else { "☐ " };
                    let style = self.theme.md_list_marker_style;
                    self.push_text(marker, style);
                }
                Event::FootnoteReference(label) => {
                    let style = self.theme.md_link_url_style;
                    self.push_text(&format!("[{label}]"), style);
                }
            }
        }

        self.flush_spans();
        self.flush_code_block();
        self.flush_table();

        let mut rendered = self.out.join("\n");
        if !rendered.is_empty() {
            rendered.push('\n');
        }
        rendered
    }
}

fn spans_width(spans: &[Span<'_>]) -> usize {
    spans.iter().map(|s| s.content.width()).sum()
}

/// Serializes styled spans as ANSI text, resetting after each styled run.
pub(super) fn spans_to_ansi(spans: &[Span<'_>]) -> String {
    spans
        .iter()
        .map(|span| paint(span.style, &span.content))
        .collect()
}
