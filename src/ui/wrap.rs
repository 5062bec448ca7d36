use ratatui::{style::Style, text::Span};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

#[derive(Debug)]
enum Token {
    Word(Vec<(String, Style)>),
    Space(Vec<(String, Style)>),
    Newline,
}

fn pieces_width(pieces: &[(String, Style)]) -> usize {
    pieces.iter().map(|(text, _)| text.width()).sum()
}

/// Splits styled spans into words, whitespace runs and hard line breaks.
/// A word that crosses a style boundary (`**bold**,`) stays one token.
fn tokenize(spans: &[Span<'static>]) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();

    for span in spans {
        let style = span.style;
        let mut rest: &str = &span.content;
        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix('\n') {
                tokens.push(Token::Newline);
                rest = after;
                continue;
            }

            let first_is_space = rest.starts_with(|c: char| c.is_whitespace());
            let end = rest
                .find(|c: char| c == '\n' || c.is_whitespace() != first_is_space)
                .unwrap_or(rest.len());
            let (chunk, tail) = rest.split_at(end);
            rest = tail;

            match (tokens.last_mut(), first_is_space) {
                (Some(Token::Space(pieces)), true) | (Some(Token::Word(pieces)), false) => {
                    pieces.push((chunk.to_string(), style));
                }
                (_, true) => tokens.push(Token::Space(vec![(chunk.to_string(), style)])),
                (_, false) => tokens.push(Token::Word(vec![(chunk.to_string(), style)])),
            }
        }
    }

    tokens
}

#[derive(Default)]
struct LineBuilder {
    lines: Vec<Vec<Span<'static>>>,
    current: Vec<Span<'static>>,
    width: usize,
}

impl LineBuilder {
    fn push(&mut self, text: &str, style: Style) {
        if text.is_empty() {
            return;
        }
        self.width += text.width();
        if let Some(last) = self.current.last_mut() {
            if last.style == style {
                last.content.to_mut().push_str(text);
                return;
            }
        }
        self.current.push(Span::styled(text.to_string(), style));
    }

    fn push_pieces(&mut self, pieces: &[(String, Style)]) {
        for (text, style) in pieces {
            self.push(text, *style);
        }
    }

    fn break_line(&mut self) {
        self.lines.push(std::mem::take(&mut self.current));
        self.width = 0;
    }

    /// Places a word wider than a whole line, splitting on grapheme boundaries.
    fn push_oversized(&mut self, pieces: &[(String, Style)], max_width: usize) {
        for (text, style) in pieces {
            for grapheme in text.graphemes(true) {
                let gw = grapheme.width();
                if self.width + gw > max_width && self.width > 0 {
                    self.break_line();
                }
                self.push(grapheme, *style);
            }
        }
    }

    fn finish(mut self) -> Vec<Vec<Span<'static>>> {
        self.lines.push(self.current);
        self.lines
    }
}

/// Greedy word wrap of styled spans to `max_width` display columns.
///
/// Embedded `\n` forces a break. Indentation at the start of a logical line
/// is kept; whitespace at a wrap point is dropped.
/// Words longer than the width are broken at grapheme boundaries. Always
/// returns at least one (possibly empty) line.
pub(crate) fn wrap_spans(spans: &[Span<'static>], max_width: usize) -> Vec<Vec<Span<'static>>> {
    let max_width = max_width.max(1);
    let mut builder = LineBuilder::default();
    let mut pending_space: Option<Vec<(String, Style)>> = None;
    let mut line_start = true;

    for token in tokenize(spans) {
        match token {
            Token::Newline => {
                pending_space = None;
                line_start = true;
                builder.break_line();
            }
            Token::Space(pieces) if line_start => builder.push_pieces(&pieces),
            Token::Space(pieces) => {
                if builder.width > 0 {
                    pending_space = Some(pieces);
                }
            }
            Token::Word(pieces) => {
                line_start = false;
                let word_width = pieces_width(&pieces);
                let space_width = pending_space.as_deref().map(pieces_width).unwrap_or(0);

                if builder.width + space_width + word_width <= max_width {
                    if let Some(space) = pending_space.take() {
                        builder.push_pieces(&space);
                    }
                    builder.push_pieces(&pieces);
                    continue;
                }

                pending_space = None;
                if builder.width > 0 {
                    builder.break_line();
                }
                if word_width <= max_width {
                    builder.push_pieces(&pieces);
                } else {
                    builder.push_oversized(&pieces, max_width);
                }
            }
        }
    }

    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Modifier;

    fn plain(lines: &[Vec<Span<'static>>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn short_text_stays_on_one_line() {
        let lines = wrap_spans(&[Span::raw("Hi there")], 100);
        assert_eq!(plain(&lines), vec!["Hi there"]);
    }

    #[test]
    fn wraps_at_word_boundaries_and_drops_break_space() {
        let lines = wrap_spans(&[Span::raw("the quick brown fox jumps")], 10);
        assert_eq!(plain(&lines), vec!["the quick", "brown fox", "jumps"]);
    }

    #[test]
    fn styled_word_fragments_stay_together() {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let spans = vec![
            Span::raw("aaaa "),
            Span::styled("bold", bold),
            Span::raw(", tail"),
        ];
        let lines = wrap_spans(&spans, 8);
        assert_eq!(plain(&lines), vec!["aaaa", "bold,", "tail"]);
        assert_eq!(lines[1][0].style, bold);
    }

    #[test]
    fn leading_indentation_is_kept() {
        let lines = wrap_spans(&[Span::raw("    let x = 1;\n  • item")], 40);
        assert_eq!(plain(&lines), vec!["    let x = 1;", "  • item"]);
    }

    #[test]
    fn long_words_break_on_graphemes() {
        let lines = wrap_spans(&[Span::raw("abcdefghij")], 4);
        assert_eq!(plain(&lines), vec!["abcd", "efgh", "ij"]);

        let wide = wrap_spans(&[Span::raw("日本語テキスト")], 6);
        assert!(wide.iter().all(|line| {
            line.iter().map(|s| s.content.width()).sum::<usize>() <= 6
        }));
    }

    #[test]
    fn newlines_force_breaks() {
        let lines = wrap_spans(&[Span::raw("one\ntwo\n\nfour")], 80);
        assert_eq!(plain(&lines), vec!["one", "two", "", "four"]);
    }

    #[test]
    fn empty_input_yields_one_empty_line() {
        assert_eq!(wrap_spans(&[], 10).len(), 1);
    }
}
