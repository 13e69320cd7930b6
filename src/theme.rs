use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::BorderType;

use rescramble::config::{BorderConfig, ColorConfig};

// ============================================================================
// COLOR PARSING
// ============================================================================

fn parse_color(color_str: &str) -> Color {
    match color_str.to_lowercase().as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "gray" | "grey" => Color::Gray,
        "darkgray" | "darkgrey" => Color::DarkGray,
        "lightred" => Color::LightRed,
        "lightgreen" => Color::LightGreen,
        "lightyellow" => Color::LightYellow,
        "lightblue" => Color::LightBlue,
        "lightmagenta" => Color::LightMagenta,
        "lightcyan" => Color::LightCyan,
        "white" => Color::White,
        "reset" | "default" => Color::Reset,
        // RGB format: #RRGGBB
        hex if hex.starts_with('#') && hex.len() == 7 && hex.is_ascii() => {
            match (
                u8::from_str_radix(&hex[1..3], 16),
                u8::from_str_radix(&hex[3..5], 16),
                u8::from_str_radix(&hex[5..7], 16),
            ) {
                (Ok(r), Ok(g), Ok(b)) => Color::Rgb(r, g, b),
                _ => Color::White,
            }
        }
        _ => Color::White,
    }
}

fn parse_modifier(modifiers: &[String]) -> Modifier {
    modifiers
        .iter()
        .fold(Modifier::empty(), |acc, name| {
            acc | match name.to_lowercase().as_str() {
                "bold" => Modifier::BOLD,
                "dim" => Modifier::DIM,
                "italic" => Modifier::ITALIC,
                "underlined" => Modifier::UNDERLINED,
                "slowblink" => Modifier::SLOW_BLINK,
                "rapidblink" => Modifier::RAPID_BLINK,
                "reversed" => Modifier::REVERSED,
                "hidden" => Modifier::HIDDEN,
                "crossedout" => Modifier::CROSSED_OUT,
                _ => Modifier::empty(),
            }
        })
}

fn parse_border_type(style: &str) -> BorderType {
    match style {
        "plain" => BorderType::Plain,
        "double" => BorderType::Double,
        "thick" => BorderType::Thick,
        _ => BorderType::Rounded,
    }
}

/// Styles resolved once from the config strings.
#[derive(Debug, Clone)]
pub struct Theme {
    pub text: Style,
    pub in_flight: Style,
    pub border: Style,
    pub border_type: BorderType,
    pub borders_enabled: bool,
    pub help: Style,
    pub help_key: Style,
}

impl Theme {
    pub fn new(colors: &ColorConfig, border: &BorderConfig) -> Self {
        let background = parse_color(&colors.background);
        let text = Style::default()
            .fg(parse_color(&colors.foreground))
            .bg(background);

        Self {
            text,
            in_flight: text
                .fg(parse_color(&colors.in_flight_fg))
                .add_modifier(parse_modifier(&colors.in_flight_modifier)),
            border: Style::default().fg(parse_color(&colors.border)),
            border_type: parse_border_type(&border.style),
            borders_enabled: border.enabled,
            help: Style::default().fg(parse_color(&colors.help_fg)),
            help_key: Style::default()
                .fg(parse_color(&colors.help_key_fg))
                .add_modifier(parse_modifier(&colors.help_key_modifier)),
        }
    }
}
