use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::dropdown;
use crate::app::App;
use crate::models::{Message, Sender};

fn message_height(message: &Message) -> u16 {
    // Header, text, one row per image, spacer.
    3 + message.image_urls.len() as u16
}

/// Renders the newest messages that fit, oldest at the top.
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = app.theme;
    let block = Block::default()
        .title(" Image Generation Chat ")
        .borders(Borders::ALL)
        .border_style(theme.muted());
    let inner = block.inner(area);
    f.render_widget(block, area);

    for menu in &app.image_menus {
        menu.menu.set_trigger_area(Rect::default());
    }

    let messages = app.session.messages();
    if messages.is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled("Describe an image to generate...", theme.muted())),
            inner,
        );
        return;
    }

    let mut used = 0u16;
    let mut first_visible = messages.len();
    for (index, message) in messages.iter().enumerate().rev() {
        let height = message_height(message);
        if used + height > inner.height && first_visible < messages.len() {
            break;
        }
        used = used.saturating_add(height);
        first_visible = index;
    }

    let mut y = inner.y;
    for message in &messages[first_visible..] {
        let bottom = inner.y + inner.height;
        if y >= bottom {
            break;
        }
        let height = message_height(message).min(bottom - y);
        let slot = Rect::new(inner.x, y, inner.width, height);
        render_message(f, slot, message, app);
        y += height;
    }
}

fn render_message(f: &mut Frame, area: Rect, message: &Message, app: &App) {
    let theme = app.theme;
    let (name, style) = match message.sender {
        Sender::User => ("You", theme.user()),
        Sender::Ai => ("FLUX", theme.ai()),
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled(name, style),
            Span::styled(
                format!("  {}", message.created_at.format("%H:%M:%S")),
                theme.muted(),
            ),
        ]),
        Line::from(Span::styled(format!("  {}", message.text), theme.base())),
    ];
    for url in &message.image_urls {
        lines.push(Line::from(vec![
            Span::raw("  🖼  "),
            Span::styled(url.clone(), theme.link()),
        ]));
    }
    f.render_widget(Paragraph::new(lines), area);

    if let Some(menu) = app.image_menu(message.id) {
        let header = Rect::new(area.x, area.y, area.width, 1);
        dropdown::render_trigger(f, header, menu, theme);
    }
}
