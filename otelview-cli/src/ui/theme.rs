//! Color palette and style helpers for the dashboard.
//!
//! Widgets never build colors inline; they go through [`styles`] so the
//! palette stays in one place.

use ratatui::style::{Color, Modifier, Style};

/// Semantic colors, one per screen element.
#[derive(Clone, Debug)]
pub struct Palette {
    pub row_fg: Color,
    pub row_bg: Color,
    pub selection_fg: Color,
    pub selection_bg: Color,

    pub status_fg: Color,
    pub status_bg: Color,
    pub status_key_fg: Color,
    pub status_key_bg: Color,

    pub popup_bg: Color,
    pub popup_frame_fg: Color,
    pub popup_text_fg: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self::classic()
    }
}

impl Palette {
    /// White on black rows under a light cyan status bar.
    pub fn classic() -> Self {
        Self {
            row_fg: Color::White,
            row_bg: Color::Black,
            selection_fg: Color::Black,
            selection_bg: Color::White,

            status_fg: Color::Black,
            status_bg: Color::LightCyan,
            status_key_fg: Color::White,
            status_key_bg: Color::Cyan,

            popup_bg: Color::DarkGray,
            popup_frame_fg: Color::White,
            popup_text_fg: Color::Black,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Theme {
    pub palette: Palette,
}

impl Theme {
    pub fn row_style(&self) -> Style {
        Style::default()
            .fg(self.palette.row_fg)
            .bg(self.palette.row_bg)
    }

    /// Selected row; filter matches reuse it.
    pub fn selection_style(&self) -> Style {
        Style::default()
            .fg(self.palette.selection_fg)
            .bg(self.palette.selection_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn status_style(&self) -> Style {
        Style::default()
            .fg(self.palette.status_fg)
            .bg(self.palette.status_bg)
    }

    pub fn status_key_style(&self) -> Style {
        Style::default()
            .fg(self.palette.status_key_fg)
            .bg(self.palette.status_key_bg)
    }

    pub fn popup_frame_style(&self) -> Style {
        Style::default()
            .fg(self.palette.popup_frame_fg)
            .bg(self.palette.popup_bg)
    }

    pub fn popup_text_style(&self) -> Style {
        Style::default()
            .fg(self.palette.popup_text_fg)
            .bg(self.palette.popup_bg)
    }
}

static DEFAULT_THEME: std::sync::OnceLock<Theme> = std::sync::OnceLock::new();

pub fn theme() -> &'static Theme {
    DEFAULT_THEME.get_or_init(Theme::default)
}

pub mod styles {
    use super::*;

    pub fn row() -> Style {
        theme().row_style()
    }

    pub fn selection() -> Style {
        theme().selection_style()
    }

    pub fn status() -> Style {
        theme().status_style()
    }

    pub fn status_key() -> Style {
        theme().status_key_style()
    }

    pub fn popup_frame() -> Style {
        theme().popup_frame_style()
    }

    pub fn popup_text() -> Style {
        theme().popup_text_style()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_is_bold_inverse_of_row() {
        let t = Theme::default();
        assert_eq!(t.selection_style().fg, t.row_style().bg);
        assert_eq!(t.selection_style().bg, t.row_style().fg);
        assert!(t.selection_style().add_modifier.contains(Modifier::BOLD));
    }
}
