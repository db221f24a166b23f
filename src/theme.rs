//! Color themes for the terminal UI.

use ratatui::style::Color;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    /// Muted colors on the terminal background.
    #[default]
    Nord,
    /// White on blue.
    DosBlue,
    /// Amber on black.
    AmberCrt,
    /// Green on black.
    GreenPhosphor,
}

impl Theme {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "nord" => Ok(Theme::Nord),
            "dos" | "dosblue" | "dos-blue" => Ok(Theme::DosBlue),
            "amber" | "ambercrt" | "amber-crt" => Ok(Theme::AmberCrt),
            "green" | "greenphosphor" | "green-phosphor" => Ok(Theme::GreenPhosphor),
            _ => Err(format!(
                "Unknown theme '{s}'. Available: nord, dos-blue, amber-crt, green-phosphor"
            )),
        }
    }

    pub fn colors(&self) -> ColorScheme {
        match self {
            Theme::Nord => ColorScheme::nord(),
            Theme::DosBlue => ColorScheme::dos_blue(),
            Theme::AmberCrt => ColorScheme::mono(Color::Rgb(255, 176, 0), Color::Rgb(180, 120, 0), Color::Rgb(255, 210, 120)),
            Theme::GreenPhosphor => ColorScheme::mono(Color::Rgb(0, 255, 0), Color::Rgb(0, 170, 0), Color::Rgb(150, 255, 150)),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Theme::Nord => "nord",
            Theme::DosBlue => "dos-blue",
            Theme::AmberCrt => "amber-crt",
            Theme::GreenPhosphor => "green-phosphor",
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ColorScheme {
    pub background: Color,
    pub text: Color,
    /// Labels, section rules, footer text.
    pub text_dim: Color,
    /// Title, key hints, active input border.
    pub accent: Color,
    pub link: Color,
    /// Focused link is drawn inverted on this.
    pub link_focus_bg: Color,
    pub link_focus_fg: Color,
    pub status_ok: Color,
    pub status_error: Color,
    pub status_loading: Color,
    pub notice: Color,
    pub toast: Color,
}

impl ColorScheme {
    pub fn nord() -> Self {
        Self {
            background: Color::Reset,
            text: Color::White,
            text_dim: Color::Gray,
            accent: Color::Yellow,
            link: Color::Cyan,
            link_focus_bg: Color::Yellow,
            link_focus_fg: Color::Black,
            status_ok: Color::Green,
            status_error: Color::Red,
            status_loading: Color::Blue,
            notice: Color::Magenta,
            toast: Color::Green,
        }
    }

    pub fn dos_blue() -> Self {
        Self {
            background: Color::Blue,
            text: Color::White,
            text_dim: Color::LightBlue,
            accent: Color::Yellow,
            link: Color::LightCyan,
            link_focus_bg: Color::Cyan,
            link_focus_fg: Color::Black,
            status_ok: Color::LightGreen,
            status_error: Color::LightRed,
            status_loading: Color::White,
            notice: Color::LightMagenta,
            toast: Color::LightGreen,
        }
    }

    /// Single-hue CRT look; errors stay red.
    fn mono(main: Color, dim: Color, bright: Color) -> Self {
        Self {
            background: Color::Black,
            text: main,
            text_dim: dim,
            accent: bright,
            link: bright,
            link_focus_bg: main,
            link_focus_fg: Color::Black,
            status_ok: bright,
            status_error: Color::Red,
            status_loading: dim,
            notice: bright,
            toast: bright,
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::nord()
    }
}
