//! Markdown to ANSI conversion for assistant replies.
//!
//! Output is a plain `String` of terminal text: one line per `\n`, SGR
//! sequences for styling, each styled run closed with a reset. Width and the
//! code-block theme are fixed so the same reply always renders identically.

mod code;
mod render;

use crate::core::constants::RENDER_WIDTH;
use crate::ui::theme::Theme;

/// Renders markdown at the fixed output width with the neon theme.
///
/// Total over any input: constructs without a dedicated rendering come out
/// as their literal text, and code that cannot be highlighted is printed
/// unstyled.
pub fn render_markdown(markdown: &str) -> String {
    render_markdown_with(markdown, &Theme::neon(), RENDER_WIDTH)
}

pub fn render_markdown_with(markdown: &str, theme: &Theme, width: usize) -> String {
    render::AnsiMarkdownRenderer::new(markdown, theme, width).render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::ansi::{parse_styled_text, strip_ansi};
    use ratatui::style::{Color, Modifier};
    use unicode_width::UnicodeWidthStr;

    fn visible(markdown: &str) -> String {
        strip_ansi(&render_markdown(markdown))
    }

    #[test]
    fn plain_text_renders_unchanged() {
        assert_eq!(render_markdown("Hi there"), "Hi there\n");
        assert_eq!(render_markdown(""), "");
    }

    #[test]
    fn paragraphs_are_separated_by_one_blank_line() {
        assert_eq!(visible("one\n\ntwo"), "one\n\ntwo\n");
    }

    #[test]
    fn soft_breaks_join_lines() {
        assert_eq!(visible("one\ntwo"), "one two\n");
    }

    #[test]
    fn emphasis_and_strong_are_styled() {
        let rendered = render_markdown("a *b* **c**");
        let spans = parse_styled_text(rendered.trim_end());
        let b = spans.iter().find(|s| s.content == "b").expect("emphasis span");
        assert!(b.style.add_modifier.contains(Modifier::ITALIC));
        let c = spans.iter().find(|s| s.content == "c").expect("strong span");
        assert!(c.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn headings_are_bold_without_hash_marks() {
        let rendered = render_markdown("# Title\n\nbody");
        let first = rendered.lines().next().unwrap_or_default();
        let spans = parse_styled_text(first);
        assert_eq!(spans[0].content, "Title");
        assert!(spans[0]
            .style
            .add_modifier
            .contains(Modifier::BOLD | Modifier::UNDERLINED));
        assert_eq!(strip_ansi(&rendered), "Title\n\nbody\n");
    }

    #[test]
    fn bullet_and_numbered_lists() {
        assert_eq!(visible("- a\n- b"), "• a\n• b\n");
        assert_eq!(visible("3. x\n4. y"), "3. x\n4. y\n");
    }

    #[test]
    fn nested_list_items_are_indented_under_parent_text() {
        assert_eq!(visible("- outer\n  - inner\n- next"), "• outer\n  • inner\n• next\n");
    }

    #[test]
    fn list_continuation_lines_hang_under_the_text() {
        let long = format!("- {}", "word ".repeat(30));
        let rendered = strip_ansi(&render_markdown_with(&long, &Theme::neon(), 40));
        let lines: Vec<&str> = rendered.lines().collect();
        assert!(lines[0].starts_with("• word"));
        assert!(lines[1].starts_with("  word"));
    }

    #[test]
    fn task_list_markers_render_as_boxes() {
        assert_eq!(visible("- [ ] todo\n- [x] done"), "• ☐ todo\n• ☒ done\n");
    }

    #[test]
    fn inline_code_is_highlighted() {
        let rendered = render_markdown("run `cargo`");
        let spans = parse_styled_text(rendered.trim_end());
        let code = spans.iter().find(|s| s.content == "cargo").expect("code span");
        assert_eq!(code.style.fg, Some(Color::Cyan));
    }

    #[test]
    fn fenced_code_blocks_keep_their_lines() {
        let md = "before\n\n```python\ndef f():\n    return 1\n```\n\nafter";
        assert_eq!(
            visible(md),
            "before\n\ndef f():\n    return 1\n\nafter\n"
        );
        assert!(render_markdown(md).contains("\x1b[38;2;"));
    }

    #[test]
    fn code_blocks_are_not_wrapped() {
        let line = "x".repeat(150);
        let rendered = visible(&format!("```\n{line}\n```"));
        assert_eq!(rendered, format!("{line}\n"));
    }

    #[test]
    fn links_show_their_target() {
        assert_eq!(
            visible("see [docs](https://example.com)"),
            "see docs (https://example.com)\n"
        );
        assert_eq!(
            visible("<https://example.com>"),
            "https://example.com\n"
        );
    }

    #[test]
    fn block_quotes_get_a_bar() {
        assert_eq!(visible("> quoted"), "▌ quoted\n");
    }

    #[test]
    fn rules_span_the_render_width() {
        let rendered = visible("a\n\n---\n\nb");
        let rule = rendered.lines().nth(2).unwrap_or_default();
        assert_eq!(rule.width(), RENDER_WIDTH);
        assert!(rule.chars().all(|c| c == '─'));
    }

    #[test]
    fn tables_align_columns() {
        let md = "| a | bb |\n|---|---:|\n| ccc | d |";
        assert_eq!(
            visible(md),
            "a   │ bb\n────┼───\nccc │  d\n"
        );
    }

    #[test]
    fn long_paragraphs_wrap_at_render_width() {
        let md = "lorem ".repeat(60);
        let rendered = visible(&md);
        assert!(rendered.lines().count() > 1);
        assert!(rendered.lines().all(|l| l.width() <= RENDER_WIDTH));
    }

    #[test]
    fn raw_html_is_kept_as_text() {
        assert_eq!(visible("<div>hi</div>"), "<div>hi</div>\n");
    }

    #[test]
    fn rendering_is_deterministic() {
        let md = "# t\n\n- a\n- b\n\n```rust\nfn x() {}\n```\n";
        assert_eq!(render_markdown(md), render_markdown(md));
    }

    #[test]
    fn arbitrary_input_never_panics() {
        for md in [
            "***",
            "[unclosed",
            "```",
            "| a |\n|---|",
            "- \n-",
            "\u{1b}[31mraw escape",
            "> > > deep\n> quote",
            "1.\n\n  2.",
            "[^1]\n\n[^1]: note",
        ] {
            let _ = render_markdown(md);
        }
    }
}
