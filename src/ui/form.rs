use ratatui::{
    layout::{Constraint, Direction, Layout as RatatuiLayout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::mode::Field;

pub fn render_prompt(f: &mut Frame, area: Rect, app: &App) {
    let theme = app.theme;
    let focused = app.focus == Field::Prompt;
    let prompt = &app.session.settings.prompt;

    let content = if prompt.is_empty() {
        Span::styled("Describe an image to generate...", theme.muted())
    } else if app.session.is_generating() {
        Span::styled(prompt.clone(), theme.muted())
    } else {
        Span::styled(prompt.clone(), theme.base())
    };

    let block = Block::default()
        .title(" Prompt ")
        .borders(Borders::ALL)
        .border_style(if focused { theme.accent() } else { theme.muted() });
    f.render_widget(Paragraph::new(Line::from(content)).block(block), area);

    if focused && !app.session.is_generating() {
        let x = area.x + 1 + (prompt.chars().count() as u16).min(area.width.saturating_sub(3));
        f.set_cursor_position((x, area.y + 1));
    }
}

fn field_value(app: &App, field: Field) -> String {
    let settings = &app.session.settings;
    let check = |on: bool| if on { "[x]" } else { "[ ]" };
    match field {
        Field::Prompt => settings.prompt.clone(),
        Field::ImageSize => format!("‹ {} ›", settings.image_size),
        Field::Steps => settings.num_inference_steps.to_string(),
        Field::Seed if app.seed_input.is_empty() => "Random".to_string(),
        Field::Seed => app.seed_input.clone(),
        Field::Guidance => format!("{:.1}", settings.guidance_scale),
        Field::NumImages => settings.num_images.to_string(),
        Field::SyncMode => check(settings.sync_mode).to_string(),
        Field::SafetyChecker => check(settings.enable_safety_checker).to_string(),
    }
}

/// Two-column parameter grid with the generate button underneath.
pub fn render_settings(f: &mut Frame, area: Rect, app: &App) {
    let theme = app.theme;
    let block = Block::default()
        .title(" Settings ")
        .borders(Borders::ALL)
        .border_style(theme.muted());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = RatatuiLayout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Length(1)])
        .split(inner);
    let columns = RatatuiLayout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);

    let fields = Field::settings();
    let (left, right) = fields.split_at(fields.len().div_ceil(2));
    for (column, fields) in [(columns[0], left), (columns[1], right)] {
        let lines: Vec<Line> = fields
            .iter()
            .map(|field| {
                let label_style = if app.focus == *field {
                    theme.focused()
                } else {
                    theme.muted()
                };
                Line::from(vec![
                    Span::styled(format!("{}:", field.label()), label_style),
                    Span::raw(" "),
                    Span::styled(field_value(app, *field), theme.base()),
                ])
            })
            .collect();
        f.render_widget(Paragraph::new(lines), column);
    }

    let label = if app.session.is_generating() {
        "[ Generating... ]"
    } else {
        "[ Generate Image ]"
    };
    let style = if app.session.can_send() {
        theme.accent()
    } else {
        theme.muted()
    };
    let width = (label.chars().count() as u16).min(rows[1].width);
    let button = Rect::new(
        rows[1].x + (rows[1].width - width) / 2,
        rows[1].y,
        width,
        rows[1].height,
    );
    f.render_widget(Paragraph::new(Span::styled(label, style)), button);
    app.generate_button.set(button);
}
