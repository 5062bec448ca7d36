//! Text buffers behind the two panes.
//!
//! [`OutputViewport`] is an append-only store of ANSI text with a line index
//! and a byte cursor. [`InputViewport`] wraps the editable `TextArea`.

use memchr::memchr_iter;
use ratatui::crossterm::event::KeyEvent;
use tui_textarea::TextArea;

use crate::core::constants::INPUT_VISIBLE_HEIGHT;
use crate::ui::theme::Theme;

#[derive(Debug, Clone)]
pub struct OutputViewport {
    content: String,
    /// Byte offset of the first character of every line. Never empty.
    line_starts: Vec<usize>,
    cursor: usize,
    scroll_top: usize,
}

impl Default for OutputViewport {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputViewport {
    pub fn new() -> Self {
        Self {
            content: String::new(),
            line_starts: vec![0],
            cursor: 0,
            scroll_top: 0,
        }
    }

    /// Appends text at the end and moves the cursor to the end.
    pub fn append(&mut self, text: &str) {
        let base = self.content.len();
        self.content.push_str(text);
        self.line_starts
            .extend(memchr_iter(b'\n', text.as_bytes()).map(|idx| base + idx + 1));
        self.cursor_down(usize::MAX);
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn text(&self) -> &str {
        &self.content
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Byte position of the cursor; always within `0..=len()`.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Line `index` without its trailing newline.
    pub fn line(&self, index: usize) -> Option<&str> {
        let start = *self.line_starts.get(index)?;
        let end = self
            .line_starts
            .get(index + 1)
            .map_or(self.content.len(), |next| next - 1);
        self.content.get(start..end)
    }

    pub fn cursor_line(&self) -> usize {
        self.line_starts
            .partition_point(|&start| start <= self.cursor)
            .saturating_sub(1)
    }

    /// Moves the cursor down by whole lines. Running past the last line
    /// leaves the cursor at the end of the content.
    pub fn cursor_down(&mut self, lines: usize) {
        let target = self.cursor_line().saturating_add(lines);
        self.cursor = match self.line_starts.get(target) {
            Some(&start) if target + 1 < self.line_starts.len() => start,
            _ => self.content.len(),
        };
    }

    pub fn cursor_up(&mut self, lines: usize) {
        let target = self.cursor_line().saturating_sub(lines);
        self.cursor = self.line_starts[target.min(self.line_starts.len() - 1)];
    }

    pub fn cursor_to_start(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_to_end(&mut self) {
        self.cursor = self.content.len();
    }

    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    pub fn set_scroll_top(&mut self, top: usize) {
        self.scroll_top = top.min(self.line_count() - 1);
    }

    /// First visible line that keeps the cursor line on screen, moving the
    /// current window as little as possible.
    ///
    /// `rows_for` reports how many display rows a line occupies once wrapped.
    pub fn visible_top<F>(&self, height: usize, rows_for: F) -> usize
    where
        F: Fn(usize) -> usize,
    {
        let cursor_line = self.cursor_line();
        if cursor_line < self.scroll_top {
            return cursor_line;
        }

        // Lowest first line that still shows the cursor line at the bottom.
        let mut min_top = cursor_line;
        let mut used = rows_for(cursor_line).max(1);
        while min_top > 0 {
            let rows = rows_for(min_top - 1).max(1);
            if used + rows > height {
                break;
            }
            used += rows;
            min_top -= 1;
        }

        self.scroll_top.max(min_top)
    }
}

pub struct InputViewport {
    textarea: TextArea<'static>,
    theme: Theme,
}

impl InputViewport {
    pub fn new(theme: &Theme) -> Self {
        let mut input = Self {
            textarea: TextArea::default(),
            theme: theme.clone(),
        };
        input.configure_textarea();
        input
    }

    fn configure_textarea(&mut self) {
        self.textarea.set_style(self.theme.input_text_style);
        self.textarea
            .set_cursor_style(self.theme.input_cursor_style);
        self.textarea
            .set_cursor_line_style(self.theme.input_cursor_line_style);
    }

    pub fn visible_height(&self) -> u16 {
        INPUT_VISIBLE_HEIGHT
    }

    pub fn text(&self) -> String {
        self.textarea.lines().join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.textarea.lines().iter().all(|line| line.is_empty())
    }

    pub fn clear(&mut self) {
        self.textarea = TextArea::default();
        self.configure_textarea();
    }

    pub fn insert_newline(&mut self) {
        self.textarea.insert_newline();
    }

    pub fn insert_str(&mut self, text: &str) {
        self.textarea.insert_str(text);
    }

    /// Forwards a key to the editor. Returns whether the buffer changed.
    pub fn input(&mut self, key: KeyEvent) -> bool {
        self.textarea.input(tui_textarea::Input::from(key))
    }

    /// Shows or hides the block cursor.
    pub fn set_focused(&mut self, focused: bool) {
        let style = if focused {
            self.theme.input_cursor_style
        } else {
            self.theme.input_text_style
        };
        self.textarea.set_cursor_style(style);
    }

    pub fn textarea(&self) -> &TextArea<'static> {
        &self.textarea
    }
}
