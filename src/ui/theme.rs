use ratatui::style::{Color, Modifier, Style};

pub const NEON_RED: Color = Color::Rgb(255, 60, 60);
pub const NEON_GREEN: Color = Color::Rgb(0, 255, 140);
pub const NEON_BLUE: Color = Color::Rgb(0, 210, 255);
pub const NEON_PINK: Color = Color::Rgb(255, 0, 200);
pub const FRAME_CYAN: Color = Color::Rgb(0, 255, 255);

#[derive(Debug, Clone)]
pub struct Theme {
    // Chrome
    pub title_arrow_style: Style,
    pub title_name_style: Style,
    pub hint_style: Style,
    pub border_style: Style,
    pub focused_border_style: Style,
    pub response_title_style: Style,
    pub prompt_title_style: Style,
    pub prompt_marker_style: Style,
    pub status_label_style: Style,
    pub scrollbar_style: Style,

    // Transcript echo
    pub user_prefix_style: Style,
    pub separator_style: Style,

    // Input area
    pub input_text_style: Style,
    pub input_cursor_style: Style,
    pub input_cursor_line_style: Style,

    // Markdown
    pub md_link_style: Style,
    pub md_link_url_style: Style,
    pub md_inline_code_style: Style,
    pub md_quote_marker_style: Style,
    pub md_list_marker_style: Style,
    pub md_rule_style: Style,
    pub md_table_border_style: Style,
    pub md_table_header_style: Style,
}

impl Theme {
    pub fn neon() -> Self {
        let dim = Style::default().add_modifier(Modifier::DIM);
        Theme {
            title_arrow_style: Style::default().fg(NEON_BLUE),
            title_name_style: Style::default().fg(NEON_PINK),
            hint_style: dim,
            border_style: Style::default().fg(FRAME_CYAN),
            focused_border_style: Style::default()
                .fg(FRAME_CYAN)
                .add_modifier(Modifier::BOLD),
            response_title_style: Style::default().fg(NEON_PINK),
            prompt_title_style: Style::default().fg(NEON_RED),
            prompt_marker_style: Style::default().fg(NEON_RED),
            status_label_style: Style::default().fg(NEON_GREEN),
            scrollbar_style: Style::default().fg(FRAME_CYAN),

            user_prefix_style: Style::default().fg(NEON_GREEN),
            separator_style: Style::default().fg(NEON_PINK),

            input_text_style: Style::default(),
            input_cursor_style: Style::default().add_modifier(Modifier::REVERSED),
            input_cursor_line_style: Style::default(),

            md_link_style: Style::default()
                .fg(NEON_BLUE)
                .add_modifier(Modifier::UNDERLINED),
            md_link_url_style: dim,
            md_inline_code_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            md_quote_marker_style: Style::default().fg(NEON_PINK),
            md_list_marker_style: Style::default().fg(NEON_BLUE),
            md_rule_style: dim,
            md_table_border_style: dim,
            md_table_header_style: Style::default().add_modifier(Modifier::BOLD),
        }
    }

    pub fn md_heading_style(&self, level: u8) -> Style {
        match level {
            1 => Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            2 => Style::default().add_modifier(Modifier::BOLD),
            _ => Style::default().add_modifier(Modifier::BOLD | Modifier::ITALIC),
        }
    }

    pub fn md_emphasis_style(&self) -> Style {
        Style::default().add_modifier(Modifier::ITALIC)
    }

    pub fn md_strong_style(&self) -> Style {
        Style::default().add_modifier(Modifier::BOLD)
    }

    pub fn md_strikethrough_style(&self) -> Style {
        Style::default().add_modifier(Modifier::CROSSED_OUT)
    }

    pub fn border_for(&self, focused: bool) -> Style {
        if focused {
            self.focused_border_style
        } else {
            self.border_style
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::neon()
    }
}
