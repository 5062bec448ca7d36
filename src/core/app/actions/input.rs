use super::{App, AppAction, AppActionContext, AppCommand, ScrollDelta};

pub(super) fn handle_input_action(
    app: &mut App,
    action: AppAction,
    ctx: AppActionContext,
) -> Option<AppCommand> {
    match action {
        AppAction::EditInput { key } => {
            app.ui.focus_input();
            app.ui.input.input(key);
        }
        AppAction::InsertNewline => {
            app.ui.focus_input();
            app.ui.input.insert_newline();
        }
        AppAction::InsertIntoInput { text } => {
            app.ui.focus_input();
            app.ui.input.insert_str(&text);
        }
        AppAction::ScrollOutput { delta } => scroll_output(app, delta, ctx),
        AppAction::ToggleFocus => app.ui.toggle_focus(),
        AppAction::FocusInput => app.ui.focus_input(),
        _ => {}
    }
    None
}

fn scroll_output(app: &mut App, delta: ScrollDelta, ctx: AppActionContext) {
    let page = app.ui.output_page_size(ctx.term_height);
    let output = &mut app.ui.output;
    match delta {
        ScrollDelta::Up(lines) => output.cursor_up(lines),
        ScrollDelta::Down(lines) => output.cursor_down(lines),
        ScrollDelta::PageUp => output.cursor_up(page),
        ScrollDelta::PageDown => output.cursor_down(page),
        ScrollDelta::Start => output.cursor_to_start(),
        ScrollDelta::End => output.cursor_to_end(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::app::actions::apply_action;
    use crate::core::app::UiFocus;
    use crate::utils::test_utils::create_test_app;

    fn ctx() -> AppActionContext {
        AppActionContext {
            term_width: 80,
            term_height: 24,
        }
    }

    #[test]
    fn paste_inserts_text_and_focuses_input() {
        let mut app = create_test_app();
        app.ui.focus_output();
        apply_action(
            &mut app,
            AppAction::InsertIntoInput {
                text: "pasted\ntext".into(),
            },
            ctx(),
        );
        assert_eq!(app.ui.input.text(), "pasted\ntext");
        assert_eq!(app.ui.focus, UiFocus::Input);
    }

    #[test]
    fn edit_input_feeds_the_editor() {
        use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

        let mut app = create_test_app();
        app.ui.focus_output();
        for ch in ['o', 'k'] {
            apply_action(
                &mut app,
                AppAction::EditInput {
                    key: KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE),
                },
                ctx(),
            );
        }
        assert_eq!(app.ui.input.text(), "ok");
        assert_eq!(app.ui.focus, UiFocus::Input);
    }

    #[test]
    fn newline_action_splits_input() {
        let mut app = create_test_app();
        app.ui.input.insert_str("a");
        apply_action(&mut app, AppAction::InsertNewline, ctx());
        app.ui.input.insert_str("b");
        assert_eq!(app.ui.input.text(), "a\nb");
    }

    #[test]
    fn scrolling_moves_output_cursor_by_lines_and_pages() {
        let mut app = create_test_app();
        for i in 0..50 {
            app.ui.output.append(&format!("line {i}\n"));
        }
        app.ui.output_page_rows = 11;

        apply_action(
            &mut app,
            AppAction::ScrollOutput {
                delta: ScrollDelta::Up(3),
            },
            ctx(),
        );
        assert_eq!(app.ui.output.cursor_line(), 47);

        apply_action(
            &mut app,
            AppAction::ScrollOutput {
                delta: ScrollDelta::PageUp,
            },
            ctx(),
        );
        assert_eq!(app.ui.output.cursor_line(), 37);

        apply_action(
            &mut app,
            AppAction::ScrollOutput {
                delta: ScrollDelta::Start,
            },
            ctx(),
        );
        assert_eq!(app.ui.output.cursor(), 0);

        apply_action(
            &mut app,
            AppAction::ScrollOutput {
                delta: ScrollDelta::PageDown,
            },
            ctx(),
        );
        assert_eq!(app.ui.output.cursor_line(), 10);

        apply_action(
            &mut app,
            AppAction::ScrollOutput {
                delta: ScrollDelta::End,
            },
            ctx(),
        );
        assert_eq!(app.ui.output.cursor(), app.ui.output.len());
    }

    #[test]
    fn focus_actions_move_between_panes() {
        let mut app = create_test_app();
        apply_action(&mut app, AppAction::ToggleFocus, ctx());
        assert_eq!(app.ui.focus, UiFocus::Output);
        apply_action(&mut app, AppAction::FocusInput, ctx());
        assert_eq!(app.ui.focus, UiFocus::Input);
    }
}
