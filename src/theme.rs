use ratatui::style::Color;
use std::fmt;

use crate::models::SourceId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Default,
    Dracula,
    Nord,
    Gruvbox,
}

impl Theme {
    pub fn all() -> &'static [Theme] {
        &[Theme::Default, Theme::Dracula, Theme::Nord, Theme::Gruvbox]
    }

    pub fn next(self) -> Theme {
        let all = Self::all();
        let idx = all.iter().position(|&t| t == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }

    pub fn from_name(name: &str) -> Option<Theme> {
        Self::all()
            .iter()
            .copied()
            .find(|t| t.to_string().eq_ignore_ascii_case(name))
    }

    pub fn colors(self) -> ThemeColors {
        match self {
            Theme::Default => ThemeColors {
                bg: Color::Reset,
                fg: Color::White,
                muted: Color::DarkGray,
                border: Color::DarkGray,
                accent: Color::Cyan,
                title: Color::Cyan,
                success: Color::Green,
                warning: Color::Yellow,
                danger: Color::Red,
                highlight_bg: Color::Cyan,
                highlight_fg: Color::Black,
                token_input: Color::Cyan,
                token_output: Color::Magenta,
                token_cache: Color::DarkGray,
                bar: Color::Cyan,
                bar_alt: Color::Blue,
                pi_badge: Color::Yellow,
                claude_badge: Color::Cyan,
            },
            Theme::Dracula => ThemeColors::from_palette([
                (40, 42, 54),
                (248, 248, 242),
                (98, 114, 164),
                (68, 71, 90),
                (139, 233, 253),
                (189, 147, 249),
                (80, 250, 123),
                (241, 250, 140),
                (255, 85, 85),
                (255, 121, 198),
            ]),
            Theme::Nord => ThemeColors::from_palette([
                (46, 52, 64),
                (216, 222, 233),
                (76, 86, 106),
                (59, 66, 82),
                (136, 192, 208),
                (129, 161, 193),
                (163, 190, 140),
                (235, 203, 139),
                (191, 97, 106),
                (180, 142, 173),
            ]),
            Theme::Gruvbox => ThemeColors::from_palette([
                (40, 40, 40),
                (235, 219, 178),
                (146, 131, 116),
                (80, 73, 69),
                (131, 165, 152),
                (250, 189, 47),
                (184, 187, 38),
                (254, 128, 25),
                (251, 73, 52),
                (211, 134, 155),
            ]),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Default => write!(f, "Default"),
            Theme::Dracula => write!(f, "Dracula"),
            Theme::Nord => write!(f, "Nord"),
            Theme::Gruvbox => write!(f, "Gruvbox"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ThemeColors {
    pub bg: Color,
    pub fg: Color,
    pub muted: Color,
    pub border: Color,
    pub accent: Color,
    pub title: Color,
    pub success: Color,
    pub warning: Color,
    pub danger: Color,
    pub highlight_bg: Color,
    pub highlight_fg: Color,
    // Token colors
    pub token_input: Color,
    pub token_output: Color,
    pub token_cache: Color,
    // Bar chart
    pub bar: Color,
    pub bar_alt: Color,
    // Source badges
    pub pi_badge: Color,
    pub claude_badge: Color,
}

type Rgb = (u8, u8, u8);

impl ThemeColors {
    /// Palette order: bg, fg, muted, border, accent, title, success, warning,
    /// danger, secondary.
    fn from_palette(p: [Rgb; 10]) -> Self {
        let c = |(r, g, b): Rgb| Color::Rgb(r, g, b);
        Self {
            bg: c(p[0]),
            fg: c(p[1]),
            muted: c(p[2]),
            border: c(p[3]),
            accent: c(p[4]),
            title: c(p[5]),
            success: c(p[6]),
            warning: c(p[7]),
            danger: c(p[8]),
            highlight_bg: c(p[3]),
            highlight_fg: c(p[1]),
            token_input: c(p[4]),
            token_output: c(p[9]),
            token_cache: c(p[2]),
            bar: c(p[5]),
            bar_alt: c(p[4]),
            pi_badge: c(p[7]),
            claude_badge: c(p[4]),
        }
    }

    pub fn source_badge(&self, source: SourceId) -> Color {
        match source {
            SourceId::Pi => self.pi_badge,
            SourceId::Claude => self.claude_badge,
        }
    }

    /// Color for a punchcard cell, `level` in 0..=4.
    pub fn heat(&self, level: usize) -> Color {
        match level {
            0 => self.border,
            1 => self.muted,
            2 => self.bar_alt,
            3 => self.bar,
            _ => self.warning,
        }
    }
}

fn theme_dir() -> std::path::PathBuf {
    dirs::config_dir().unwrap_or_default().join("agent-usage")
}

/// Load saved theme from config
pub fn load_saved_theme() -> Theme {
    std::fs::read_to_string(theme_dir().join("theme"))
        .ok()
        .and_then(|name| Theme::from_name(name.trim()))
        .unwrap_or(Theme::Default)
}

/// Save theme to config
pub fn save_theme(theme: Theme) {
    let dir = theme_dir();
    let _ = std::fs::create_dir_all(&dir);
    let _ = std::fs::write(dir.join("theme"), theme.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_cycles_through_all() {
        let mut theme = Theme::Default;
        for _ in 0..Theme::all().len() {
            theme = theme.next();
        }
        assert_eq!(theme, Theme::Default);
    }

    #[test]
    fn test_from_name_is_case_insensitive() {
        assert_eq!(Theme::from_name("nord"), Some(Theme::Nord));
        assert_eq!(Theme::from_name("GRUVBOX"), Some(Theme::Gruvbox));
        assert_eq!(Theme::from_name("solarized"), None);
    }
}
