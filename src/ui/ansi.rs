//! Conversion between ANSI escape text and ratatui styled fragments.
//!
//! [`parse_styled_text`] interprets SGR sequences on one line and yields
//! [`Span`] fragments. Other well-formed control sequences (cursor moves,
//! OSC titles and hyperlinks, DCS payloads) are dropped since they have no
//! meaning inside a pane. Anything malformed is kept as visible text with the
//! ESC byte replaced by [`ESC_PLACEHOLDER`], so a raw escape never reaches the
//! terminal through the frame buffer.
//!
//! [`style_to_sgr`] goes the other way and is what the markdown renderer uses
//! to emit its output.

use memchr::memchr;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

pub const RESET: &str = "\x1b[0m";
pub const ESC_PLACEHOLDER: &str = "\u{241b}";

const ESC: u8 = 0x1b;
const TAB_EXPANSION: &str = "    ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sequence<'a> {
    /// `ESC [ params m`
    Sgr(&'a str),
    /// Any other complete sequence, consumed without effect.
    Ignored,
}

/// Recognizes an escape sequence starting at `pos` (which must hold ESC) and
/// returns it with its byte length. `None` means malformed or truncated.
fn scan_escape(input: &str, pos: usize) -> Option<(Sequence<'_>, usize)> {
    let bytes = input.as_bytes();
    match bytes.get(pos + 1)? {
        b'[' => scan_csi(input, pos),
        b']' | b'P' | b'_' | b'^' | b'X' => scan_string_terminated(bytes, pos),
        b'O' => {
            let final_byte = *bytes.get(pos + 2)?;
            (0x40..=0x7e)
                .contains(&final_byte)
                .then_some((Sequence::Ignored, 3))
        }
        _ => None,
    }
}

fn scan_csi(input: &str, pos: usize) -> Option<(Sequence<'_>, usize)> {
    let bytes = input.as_bytes();
    let params_start = pos + 2;
    let mut idx = params_start;
    while idx < bytes.len() {
        let b = bytes[idx];
        match b {
            // parameter and intermediate bytes
            0x20..=0x3f => idx += 1,
            0x40..=0x7e => {
                let len = idx + 1 - pos;
                let params = &input[params_start..idx];
                let is_plain_sgr = b == b'm' && params.bytes().all(|p| p.is_ascii_digit() || p == b';' || p == b':');
                return Some(if is_plain_sgr {
                    (Sequence::Sgr(params), len)
                } else {
                    (Sequence::Ignored, len)
                });
            }
            _ => return None,
        }
    }
    None
}

fn scan_string_terminated(bytes: &[u8], pos: usize) -> Option<(Sequence<'static>, usize)> {
    let mut idx = pos + 2;
    while idx < bytes.len() {
        match bytes[idx] {
            0x07 => return Some((Sequence::Ignored, idx + 1 - pos)),
            ESC if bytes.get(idx + 1) == Some(&b'\\') => {
                return Some((Sequence::Ignored, idx + 2 - pos));
            }
            _ => idx += 1,
        }
    }
    None
}

/// SGR state accumulated while walking a line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct SgrState {
    fg: Option<Color>,
    bg: Option<Color>,
    modifiers: Modifier,
}

impl SgrState {
    fn style(&self) -> Style {
        let mut style = Style::default().add_modifier(self.modifiers);
        if let Some(fg) = self.fg {
            style = style.fg(fg);
        }
        if let Some(bg) = self.bg {
            style = style.bg(bg);
        }
        style
    }

    fn apply(&mut self, params: &str) {
        if params.is_empty() {
            *self = SgrState::default();
            return;
        }

        let parts: Vec<&str> = params.split(';').collect();
        let mut idx = 0;
        while idx < parts.len() {
            let part = parts[idx];
            idx += 1;

            if part.contains(':') {
                self.apply_colon_form(part);
                continue;
            }

            let Ok(code) = part.parse::<u16>() else {
                continue;
            };

            match code {
                0 => *self = SgrState::default(),
                1 => self.modifiers.insert(Modifier::BOLD),
                2 => self.modifiers.insert(Modifier::DIM),
                3 => self.modifiers.insert(Modifier::ITALIC),
                4 => self.modifiers.insert(Modifier::UNDERLINED),
                5 => self.modifiers.insert(Modifier::SLOW_BLINK),
                6 => self.modifiers.insert(Modifier::RAPID_BLINK),
                7 => self.modifiers.insert(Modifier::REVERSED),
                8 => self.modifiers.insert(Modifier::HIDDEN),
                9 => self.modifiers.insert(Modifier::CROSSED_OUT),
                21 | 22 => self.modifiers.remove(Modifier::BOLD | Modifier::DIM),
                23 => self.modifiers.remove(Modifier::ITALIC),
                24 => self.modifiers.remove(Modifier::UNDERLINED),
                25 => self
                    .modifiers
                    .remove(Modifier::SLOW_BLINK | Modifier::RAPID_BLINK),
                27 => self.modifiers.remove(Modifier::REVERSED),
                28 => self.modifiers.remove(Modifier::HIDDEN),
                29 => self.modifiers.remove(Modifier::CROSSED_OUT),
                30..=37 => self.fg = Some(basic_color(code - 30)),
                39 => self.fg = None,
                40..=47 => self.bg = Some(basic_color(code - 40)),
                49 => self.bg = None,
                90..=97 => self.fg = Some(bright_color(code - 90)),
                100..=107 => self.bg = Some(bright_color(code - 100)),
                38 | 48 => {
                    let (color, consumed) = extended_color(&parts[idx..]);
                    idx += consumed;
                    if let Some(color) = color {
                        if code == 38 {
                            self.fg = Some(color);
                        } else {
                            self.bg = Some(color);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// `38:2::r:g:b`, `38:2:r:g:b` and `38:5:n` forms.
    fn apply_colon_form(&mut self, part: &str) {
        let fields: Vec<&str> = part.split(':').collect();
        let target_fg = match fields.first().copied() {
            Some("38") => true,
            Some("48") => false,
            _ => return,
        };
        let color = match fields.get(1).copied() {
            Some("5") => fields
                .get(2)
                .and_then(|n| n.parse::<u8>().ok())
                .map(Color::Indexed),
            Some("2") => {
                let rgb: Vec<&str> = fields[2..].iter().copied().filter(|f| !f.is_empty()).collect();
                parse_rgb(&rgb)
            }
            _ => None,
        };
        if let Some(color) = color {
            if target_fg {
                self.fg = Some(color);
            } else {
                self.bg = Some(color);
            }
        }
    }
}

fn extended_color(rest: &[&str]) -> (Option<Color>, usize) {
    match rest.first().copied() {
        Some("5") => {
            let color = rest
                .get(1)
                .and_then(|n| n.parse::<u8>().ok())
                .map(Color::Indexed);
            (color, rest.len().min(2))
        }
        Some("2") => {
            let consumed = rest.len().min(4);
            (parse_rgb(&rest[1..consumed]), consumed)
        }
        Some(_) => (None, 1),
        None => (None, 0),
    }
}

fn parse_rgb(fields: &[&str]) -> Option<Color> {
    if fields.len() < 3 {
        return None;
    }
    let r = fields[0].parse::<u8>().ok()?;
    let g = fields[1].parse::<u8>().ok()?;
    let b = fields[2].parse::<u8>().ok()?;
    Some(Color::Rgb(r, g, b))
}

fn basic_color(index: u16) -> Color {
    match index {
        0 => Color::Black,
        1 => Color::Red,
        2 => Color::Green,
        3 => Color::Yellow,
        4 => Color::Blue,
        5 => Color::Magenta,
        6 => Color::Cyan,
        _ => Color::Gray,
    }
}

fn bright_color(index: u16) -> Color {
    match index {
        0 => Color::DarkGray,
        1 => Color::LightRed,
        2 => Color::LightGreen,
        3 => Color::LightYellow,
        4 => Color::LightBlue,
        5 => Color::LightMagenta,
        6 => Color::LightCyan,
        _ => Color::White,
    }
}

#[derive(Default)]
struct FragmentBuilder {
    fragments: Vec<Span<'static>>,
}

impl FragmentBuilder {
    fn push(&mut self, style: Style, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(last) = self.fragments.last_mut() {
            if last.style == style {
                last.content.to_mut().push_str(text);
                return;
            }
        }
        self.fragments.push(Span::styled(text.to_string(), style));
    }

    /// Pushes printable text, expanding tabs and dropping stray control characters.
    fn push_printable(&mut self, style: Style, text: &str) {
        if !text.chars().any(char::is_control) {
            self.push(style, text);
            return;
        }
        let mut cleaned = String::with_capacity(text.len());
        for ch in text.chars() {
            match ch {
                '\t' => cleaned.push_str(TAB_EXPANSION),
                c if c.is_control() => {}
                c => cleaned.push(c),
            }
        }
        self.push(style, &cleaned);
    }

    fn finish(mut self) -> Vec<Span<'static>> {
        if self.fragments.is_empty() {
            self.fragments.push(Span::raw(""));
        }
        self.fragments
    }
}

/// Parses one line of ANSI text into styled fragments.
///
/// Adjacent text with identical style is merged, so a line without escape
/// sequences comes back as a single fragment holding the whole line.
pub fn parse_styled_text(line: &str) -> Vec<Span<'static>> {
    let bytes = line.as_bytes();
    let mut builder = FragmentBuilder::default();
    let mut state = SgrState::default();
    let mut pos = 0;

    while pos < bytes.len() {
        let Some(offset) = memchr(ESC, &bytes[pos..]) else {
            builder.push_printable(state.style(), &line[pos..]);
            break;
        };

        let esc_at = pos + offset;
        builder.push_printable(state.style(), &line[pos..esc_at]);

        match scan_escape(line, esc_at) {
            Some((Sequence::Sgr(params), len)) => {
                state.apply(params);
                pos = esc_at + len;
            }
            Some((Sequence::Ignored, len)) => pos = esc_at + len,
            None => {
                builder.push(state.style(), ESC_PLACEHOLDER);
                pos = esc_at + 1;
            }
        }
    }

    builder.finish()
}

/// Builds an on-demand line accessor over any indexed line source.
///
/// Nothing is parsed until a line is requested, and each request parses only
/// that line, so asking for the same index twice yields the same fragments.
/// Indices past the end produce an empty line.
pub fn lex_lines<'a, F>(line_at: F) -> impl Fn(usize) -> Line<'static> + 'a
where
    F: Fn(usize) -> Option<&'a str> + 'a,
{
    move |index| match line_at(index) {
        Some(text) => Line::from(parse_styled_text(text)),
        None => Line::default(),
    }
}

/// Line accessor over a whole ANSI document split on `\n`.
pub fn lex_document(text: &str) -> impl Fn(usize) -> Line<'static> + '_ {
    let lines: Vec<&str> = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();
    lex_lines(move |index| lines.get(index).copied())
}

fn color_sgr(color: Color, foreground: bool) -> Option<String> {
    let (base, bright_base) = if foreground { (30, 90) } else { (40, 100) };
    let code = match color {
        Color::Reset => return Some(if foreground { "39" } else { "49" }.to_string()),
        Color::Black => base,
        Color::Red => base + 1,
        Color::Green => base + 2,
        Color::Yellow => base + 3,
        Color::Blue => base + 4,
        Color::Magenta => base + 5,
        Color::Cyan => base + 6,
        Color::Gray => base + 7,
        Color::DarkGray => bright_base,
        Color::LightRed => bright_base + 1,
        Color::LightGreen => bright_base + 2,
        Color::LightYellow => bright_base + 3,
        Color::LightBlue => bright_base + 4,
        Color::LightMagenta => bright_base + 5,
        Color::LightCyan => bright_base + 6,
        Color::White => bright_base + 7,
        Color::Indexed(n) => {
            return Some(format!("{};5;{n}", if foreground { 38 } else { 48 }));
        }
        Color::Rgb(r, g, b) => {
            return Some(format!("{};2;{r};{g};{b}", if foreground { 38 } else { 48 }));
        }
    };
    Some(code.to_string())
}

/// Encodes a style as a single SGR sequence. The default style encodes to
/// an empty string.
pub fn style_to_sgr(style: Style) -> String {
    let mut codes: Vec<String> = Vec::new();
    let modifiers = style.add_modifier;
    for (modifier, code) in [
        (Modifier::BOLD, "1"),
        (Modifier::DIM, "2"),
        (Modifier::ITALIC, "3"),
        (Modifier::UNDERLINED, "4"),
        (Modifier::SLOW_BLINK, "5"),
        (Modifier::RAPID_BLINK, "6"),
        (Modifier::REVERSED, "7"),
        (Modifier::HIDDEN, "8"),
        (Modifier::CROSSED_OUT, "9"),
    ] {
        if modifiers.contains(modifier) {
            codes.push(code.to_string());
        }
    }
    if let Some(code) = style.fg.and_then(|c| color_sgr(c, true)) {
        codes.push(code);
    }
    if let Some(code) = style.bg.and_then(|c| color_sgr(c, false)) {
        codes.push(code);
    }

    if codes.is_empty() {
        String::new()
    } else {
        format!("\x1b[{}m", codes.join(";"))
    }
}

/// Wraps `text` in the SGR sequence for `style` and a reset. Unstyled text
/// is returned unchanged.
pub fn paint(style: Style, text: &str) -> String {
    let sgr = style_to_sgr(style);
    if sgr.is_empty() || text.is_empty() {
        text.to_string()
    } else {
        format!("{sgr}{text}{RESET}")
    }
}

/// Removes every escape sequence, keeping only the visible text.
pub fn strip_ansi(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            parse_styled_text(line)
                .into_iter()
                .map(|span| span.content.into_owned())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
