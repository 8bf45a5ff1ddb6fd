use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Style};
use colored::Color;
use once_cell::sync::Lazy;

/// Colors shared by command output and `--help`.
pub struct ColorTheme {
    pub success: Color,
    pub error: Color,
    pub warning: Color,
    pub info: Color,
    pub heading: Color,
    pub muted: Color,
    pub primary: Color,
    pub key: Color,
    pub value: Color,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            success: Color::Green,
            error: Color::Red,
            warning: Color::Yellow,
            info: Color::Blue,
            heading: Color::Cyan,
            muted: Color::BrightBlack,
            primary: Color::BrightBlue,
            key: Color::BrightCyan,
            value: Color::White,
        }
    }
}

impl ColorTheme {
    pub fn help_styles(&self) -> Styles {
        Styles::styled()
            .usage(fg(self.primary).bold())
            .header(fg(self.heading).bold())
            .literal(fg(self.key))
            .placeholder(fg(self.muted))
            .valid(fg(self.success))
            .invalid(fg(self.warning))
            .error(fg(self.error).bold())
    }
}

/// Only the ANSI colors the theme uses have a help-style counterpart.
fn fg(color: Color) -> Style {
    let ansi = match color {
        Color::Green => AnsiColor::Green,
        Color::Red => AnsiColor::Red,
        Color::Yellow => AnsiColor::Yellow,
        Color::Blue => AnsiColor::Blue,
        Color::Cyan => AnsiColor::Cyan,
        Color::BrightBlack => AnsiColor::BrightBlack,
        Color::BrightBlue => AnsiColor::BrightBlue,
        Color::BrightCyan => AnsiColor::BrightCyan,
        _ => AnsiColor::White,
    };
    Style::new().fg_color(Some(ansi.into()))
}

pub static THEME: Lazy<ColorTheme> = Lazy::new(ColorTheme::default);

pub struct Icons {
    pub success: &'static str,
    pub warning: &'static str,
    pub info: &'static str,
    pub arrow: &'static str,
    pub file: &'static str,
}

pub const ICONS: Icons = Icons {
    success: "✓",
    warning: "⚠",
    info: "ℹ",
    arrow: "→",
    file: "📄",
};
