use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph},
    Frame,
};

use rescramble::Segment;

use crate::app::App;

// ============================================================================
// UI RENDERING
// ============================================================================

pub fn draw(f: &mut Frame, app: &App) {
    let size = f.area();
    let config = &app.config;
    let theme = &app.theme;
    let area = centered_area(app, size);

    let title_alignment = match config.title_alignment.as_str() {
        "left" => Alignment::Left,
        "right" => Alignment::Right,
        _ => Alignment::Center,
    };

    let block = Block::default()
        .borders(if theme.borders_enabled {
            Borders::ALL
        } else {
            Borders::NONE
        })
        .border_type(theme.border_type)
        .border_style(theme.border)
        .title(config.title.clone())
        .title_alignment(title_alignment)
        .padding(Padding::new(
            config.layout.padding,
            config.layout.padding,
            config.layout.padding / 2,
            config.layout.padding / 2,
        ))
        .style(theme.text);

    let paragraph = Paragraph::new(scramble_line(app))
        .alignment(Alignment::Center)
        .block(block);

    f.render_widget(paragraph, area);
    render_help_text(f, app, size);
}

/// The animated phrase, with in-flight glyphs styled apart from settled text.
fn scramble_line(app: &App) -> Line<'static> {
    let theme = &app.theme;
    match app.current_frame() {
        Some(frame) => Line::from(
            frame
                .segments
                .iter()
                .map(|segment| match *segment {
                    Segment::Plain(c) => Span::styled(c.to_string(), theme.text),
                    Segment::InFlight(c) => Span::styled(c.to_string(), theme.in_flight),
                })
                .collect::<Vec<_>>(),
        ),
        None => Line::styled(app.displayed().to_string(), theme.text),
    }
}

fn centered_area(app: &App, size: Rect) -> Rect {
    let layout = &app.config.layout;
    let border = if app.theme.borders_enabled { 2 } else { 0 };
    let title_width = u16::try_from(app.config.title.chars().count()).unwrap_or(u16::MAX);

    let widest = u16::try_from(app.widest_phrase()).unwrap_or(u16::MAX);
    let content_width = widest.max(title_width.saturating_sub(2));
    let width = content_width
        .saturating_add(layout.padding.saturating_mul(2))
        .saturating_add(border);
    let width = if layout.max_width > 0 {
        width.min(layout.max_width)
    } else {
        width
    };
    let width = width.max(layout.min_width).min(size.width);

    let height = ((layout.padding / 2) * 2)
        .saturating_add(1 + border)
        .min(size.height);

    Rect {
        x: size.width.saturating_sub(width) / 2,
        y: size.height.saturating_sub(height) / 2,
        width,
        height,
    }
}

fn render_help_text(f: &mut Frame, app: &App, size: Rect) {
    let theme = &app.theme;
    let keys = &app.config.keys;
    let separator = " | ";

    let position = format!(
        "{}/{}{}",
        app.index() + 1,
        app.phrases().len().max(1),
        if app.is_animating() { " ~" } else { "" }
    );
    let autoplay = if app.autoplay { "pause" } else { "play" };

    let help_spans = vec![
        Span::styled(position, theme.help),
        Span::raw(separator),
        Span::styled(
            format!("{}/{}", keys.previous.join("/"), keys.next.join("/")),
            theme.help_key,
        ),
        Span::styled(" Prev/Next", theme.help),
        Span::raw(separator),
        Span::styled(keys.toggle_autoplay.join("/"), theme.help_key),
        Span::styled(format!(" {}", autoplay), theme.help),
        Span::raw(separator),
        Span::styled(keys.quit.join("/"), theme.help_key),
        Span::styled(" Quit", theme.help),
    ];

    let help_area = Rect {
        x: 0,
        y: size.height.saturating_sub(1),
        width: size.width,
        height: 1.min(size.height),
    };

    let help_text = Paragraph::new(Line::from(help_spans))
        .alignment(Alignment::Center)
        .style(theme.help);

    f.render_widget(help_text, help_area);
}
