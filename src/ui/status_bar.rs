use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;

const HINT: &str = "Enter: generate · Tab: next field · ←/→: adjust · Esc: close menus · Ctrl-C: quit";

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = app.theme;
    let mut spans = vec![Span::styled(
        format!(" {} ", app.focus.label().to_uppercase()),
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];
    spans.push(Span::raw(" "));

    if app.session.is_generating() {
        let detail = app.queue_status.as_deref().unwrap_or("Submitting");
        spans.push(Span::styled(
            format!("Generating... {}", detail),
            Style::default().fg(Color::Yellow),
        ));
    } else if let Some(message) = &app.status_message {
        spans.push(Span::styled(message.clone(), theme.base()));
    } else {
        spans.push(Span::styled(HINT, theme.muted()));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
