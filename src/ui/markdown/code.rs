use std::sync::OnceLock;

use pulldown_cmark::CodeBlockKind;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use tracing::debug;

use crate::core::constants::CODE_THEME;

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();

const TAB: &str = "    ";

pub(super) fn language_hint(kind: &CodeBlockKind<'_>) -> String {
    match kind {
        CodeBlockKind::Indented => String::new(),
        CodeBlockKind::Fenced(info) => info.split_ascii_whitespace().next().unwrap_or("").into(),
    }
}

fn normalize_lang_hint(s: &str) -> String {
    let t = s.trim().to_ascii_lowercase();
    match t.as_str() {
        "py" | "python" | "python3" => "python".into(),
        "bash" | "sh" | "zsh" | "shell" | "console" => "bash".into(),
        "js" | "javascript" | "jsx" => "javascript".into(),
        "ts" | "tsx" | "typescript" => "typescript".into(),
        "yaml" | "yml" => "yaml".into(),
        "rust" | "rs" => "rust".into(),
        "c" | "h" => "c".into(),
        "cpp" | "c++" | "cc" | "cxx" | "hpp" | "hxx" => "cpp".into(),
        "kotlin" | "kt" => "kotlin".into(),
        other => other.into(),
    }
}

fn detab(line: &str) -> String {
    line.replace('\t', TAB)
}

/// Unstyled fallback used when highlighting is unavailable.
pub(super) fn plain_code_lines(code: &str) -> Vec<Line<'static>> {
    code.lines()
        .map(|line| Line::from(Span::raw(detab(line))))
        .collect()
}

/// Highlights a fenced block with the fixed code theme. Returns `None` when
/// the theme is missing or syntect rejects a line.
pub(super) fn highlight_code_block(lang_hint: &str, code: &str) -> Option<Vec<Line<'static>>> {
    let ps = SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines);
    let ts = THEME_SET.get_or_init(ThemeSet::load_defaults);
    let theme = ts.themes.get(CODE_THEME)?;

    let lang = normalize_lang_hint(lang_hint);
    let syntax = ps
        .find_syntax_by_token(&lang)
        .unwrap_or_else(|| ps.find_syntax_plain_text());
    let mut highlighter = HighlightLines::new(syntax, theme);

    let mut out = Vec::new();
    for line in LinesWithEndings::from(code) {
        let ranges = match highlighter.highlight_line(line, ps) {
            Ok(ranges) => ranges,
            Err(err) => {
                debug!(%err, lang = %lang, "syntax highlighting failed; using plain text");
                return None;
            }
        };
        let spans: Vec<Span<'static>> = ranges
            .into_iter()
            .filter_map(|(style, fragment)| {
                let fragment = fragment.trim_end_matches(['\n', '\r']);
                (!fragment.is_empty()).then(|| {
                    let fg = style.foreground;
                    Span::styled(detab(fragment), Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b)))
                })
            })
            .collect();
        out.push(Line::from(spans));
    }
    Some(out)
}

pub(super) fn code_block_lines(lang_hint: &str, code: &str) -> Vec<Line<'static>> {
    highlight_code_block(lang_hint, code).unwrap_or_else(|| plain_code_lines(code))
}
