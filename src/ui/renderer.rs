//! Frame composition.
//!
//! Top to bottom: a one-line title, the response pane, the prompt pane and a
//! one-line status bar. The response pane wraps stored ANSI lines to its width
//! on every draw, so resizing never touches the stored text.

use ratatui::{
    layout::{Constraint, Layout, Margin, Rect},
    text::{Line, Span},
    widgets::{Block, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

use crate::core::app::{App, UiFocus, UiState};
use crate::ui::ansi::lex_lines;
use crate::ui::theme::Theme;
use crate::ui::wrap::wrap_spans;

pub const TITLE_HINT: &str = "Enter=Send • Alt+Enter=New line • Tab=Switch pane • Ctrl+C=Quit";
const PROMPT_MARKER: &str = "● ";

pub fn ui(f: &mut Frame, app: &mut App) {
    let input_height = app.ui.input.visible_height() + 2;
    let [title_area, output_area, input_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(input_height),
        Constraint::Length(1),
    ])
    .areas(f.area());

    f.render_widget(Paragraph::new(title_line(&app.ui.theme)), title_area);
    render_output(f, output_area, &mut app.ui);
    render_input(f, input_area, &mut app.ui);
    f.render_widget(Paragraph::new(status_line(&app.ui)), status_area);
}

pub fn title_line(theme: &Theme) -> Line<'static> {
    Line::from(vec![
        Span::styled("➤ ", theme.title_arrow_style),
        Span::styled("Neon Chat", theme.title_name_style),
        Span::raw(" "),
        Span::styled(TITLE_HINT, theme.hint_style),
    ])
}

pub fn status_line(ui: &UiState) -> Line<'static> {
    Line::from(vec![
        Span::styled("Status:", ui.theme.status_label_style),
        Span::raw(format!(" {}", ui.status)),
    ])
}

fn render_output(f: &mut Frame, area: Rect, ui: &mut UiState) {
    let theme = &ui.theme;
    let block = Block::bordered()
        .border_style(theme.border_for(ui.focus == UiFocus::Output))
        .title(Span::styled("➤ [Response]", theme.response_title_style));
    let inner = block.inner(area);
    f.render_widget(block, area);

    ui.output_page_rows = inner.height;
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let width = usize::from(inner.width);
    let height = usize::from(inner.height);
    let (top, rows, line_count, cursor_line) = {
        let output = &ui.output;
        let lexer = lex_lines(|idx| output.line(idx));
        let top = output.visible_top(height, |idx| wrap_line(&lexer(idx), width).len());
        let rows = visible_rows(&lexer, output.line_count(), top, width, height);
        (top, rows, output.line_count(), output.cursor_line())
    };
    ui.output.set_scroll_top(top);

    f.render_widget(Paragraph::new(rows), inner);

    if line_count > height {
        let mut state = ScrollbarState::new(line_count).position(cursor_line);
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(None)
            .end_symbol(None)
            .style(ui.theme.scrollbar_style);
        f.render_stateful_widget(
            scrollbar,
            area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut state,
        );
    }
}

fn wrap_line(line: &Line<'static>, width: usize) -> Vec<Line<'static>> {
    wrap_spans(&line.spans, width)
        .into_iter()
        .map(Line::from)
        .collect()
}

/// Display rows starting at logical line `top`, cut to `height`.
pub(crate) fn visible_rows<L>(
    lexer: L,
    line_count: usize,
    top: usize,
    width: usize,
    height: usize,
) -> Vec<Line<'static>>
where
    L: Fn(usize) -> Line<'static>,
{
    let mut rows = Vec::with_capacity(height);
    for idx in top..line_count {
        if rows.len() >= height {
            break;
        }
        rows.extend(wrap_line(&lexer(idx), width));
    }
    rows.truncate(height);
    rows
}

fn render_input(f: &mut Frame, area: Rect, ui: &mut UiState) {
    let focused = ui.focus == UiFocus::Input;
    let block = Block::bordered()
        .border_style(ui.theme.border_for(focused))
        .title(Span::styled("➤ [Prompt]", ui.theme.prompt_title_style));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [marker_area, text_area] =
        Layout::horizontal([Constraint::Length(2), Constraint::Min(1)]).areas(inner);
    f.render_widget(
        Paragraph::new(Span::styled(PROMPT_MARKER, ui.theme.prompt_marker_style)),
        marker_area,
    );

    ui.input.set_focused(focused);
    f.render_widget(ui.input.textarea(), text_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::app::StatusLabel;
    use crate::ui::ansi::{lex_document, paint};
    use crate::utils::test_utils::create_test_app;
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

    fn draw(app: &mut App, width: u16, height: u16) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).expect("terminal");
        terminal.draw(|f| ui(f, app)).expect("draw");
        terminal.backend().buffer().clone()
    }

    fn row_text(buffer: &Buffer, y: u16) -> String {
        (0..buffer.area.width)
            .map(|x| buffer[(x, y)].symbol())
            .collect::<String>()
    }

    fn screen_text(buffer: &Buffer) -> String {
        (0..buffer.area.height)
            .map(|y| row_text(buffer, y))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn layout_has_title_frames_and_status() {
        let mut app = create_test_app();
        let buffer = draw(&mut app, 100, 20);

        assert!(row_text(&buffer, 0).starts_with("➤ Neon Chat Enter=Send"));
        assert!(row_text(&buffer, 1).contains("➤ [Response]"));
        assert!(screen_text(&buffer).contains("➤ [Prompt]"));
        assert!(screen_text(&buffer).contains("● "));
        assert!(row_text(&buffer, 19).starts_with("Status: Ready"));
    }

    #[test]
    fn status_bar_shows_thinking() {
        let mut app = create_test_app();
        app.ui.status = StatusLabel::Thinking;
        let buffer = draw(&mut app, 60, 16);
        assert!(row_text(&buffer, 15).starts_with("Status: Thinking…"));
    }

    #[test]
    fn output_is_drawn_without_escape_codes() {
        let mut app = create_test_app();
        let theme = app.ui.theme.clone();
        app.ui
            .output
            .append(&format!("{} Hello\n", paint(theme.user_prefix_style, "➤ [You]:")));
        let buffer = draw(&mut app, 60, 16);
        let screen = screen_text(&buffer);
        assert!(screen.contains("➤ [You]: Hello"));
        assert!(!screen.contains("[38;2"));
    }

    #[test]
    fn long_output_keeps_latest_line_visible() {
        let mut app = create_test_app();
        for i in 0..100 {
            app.ui.output.append(&format!("entry {i}\n"));
        }
        app.ui.output.append("newest");
        let buffer = draw(&mut app, 60, 20);
        let screen = screen_text(&buffer);
        assert!(screen.contains("newest"));
        assert!(!screen.contains("entry 0 "));
        assert!(app.ui.output_page_rows > 0);
    }

    #[test]
    fn scrolling_to_start_shows_first_line() {
        let mut app = create_test_app();
        for i in 0..100 {
            app.ui.output.append(&format!("entry {i}\n"));
        }
        app.ui.output.cursor_to_start();
        let buffer = draw(&mut app, 60, 20);
        let screen = screen_text(&buffer);
        assert!(screen.contains("entry 0 "));
        assert!(!screen.contains("entry 99"));
        assert_eq!(app.ui.output.scroll_top(), 0);
    }

    #[test]
    fn redraws_keep_following_appended_output() {
        let mut app = create_test_app();
        for i in 0..40 {
            app.ui.output.append(&format!("row {i}\n"));
        }
        draw(&mut app, 40, 20);
        let first_top = app.ui.output.scroll_top();
        assert!(first_top > 0);

        app.ui.output.append("tail line\n");
        let buffer = draw(&mut app, 40, 20);
        assert!(screen_text(&buffer).contains("tail line"));
        assert_eq!(app.ui.output.scroll_top(), first_top + 1);
    }

    #[test]
    fn narrow_panes_wrap_long_lines() {
        let rows = visible_rows(lex_document("alpha beta gamma delta"), 1, 0, 11, 10);
        let text: Vec<String> = rows.iter().map(|line| line.to_string()).collect();
        assert_eq!(text, vec!["alpha beta", "gamma delta"]);
    }

    #[test]
    fn input_text_is_drawn_in_prompt_frame() {
        let mut app = create_test_app();
        app.ui.input.insert_str("draft message");
        let buffer = draw(&mut app, 60, 16);
        assert!(screen_text(&buffer).contains("● draft message"));
    }
}
