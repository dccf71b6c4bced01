use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::layout::Layout;
use super::theme::Theme;
use crate::menu::DropdownMenu;

/// Draws the trigger label at `area` and records it as the menu's trigger.
pub fn render_trigger<A: Clone>(f: &mut Frame, area: Rect, menu: &DropdownMenu<A>, theme: Theme) {
    let label = format!("[{}]", menu.trigger_label());
    let width = (label.chars().count() as u16).min(area.width);
    let area = Rect::new(area.x + area.width - width, area.y, width, area.height.min(1));

    let style = if menu.is_open() {
        theme.focused()
    } else {
        theme.accent()
    };
    f.render_widget(Paragraph::new(Span::styled(label, style)), area);
    menu.set_trigger_area(area);
}

/// Overlay for an open menu. Must run after everything it can cover.
pub fn render_content<A: Clone>(f: &mut Frame, menu: &DropdownMenu<A>, bounds: Rect, theme: Theme) {
    if !menu.is_open() {
        return;
    }
    let trigger = menu.trigger_area();
    if trigger.width == 0 {
        // Trigger scrolled out of view: the content cannot be shown either.
        menu.close();
        return;
    }

    let area = Layout::dropdown(trigger, menu.content_size(), bounds);
    let lines: Vec<Line> = menu
        .items()
        .iter()
        .map(|item| {
            let style = if item.disabled {
                theme.muted().add_modifier(Modifier::CROSSED_OUT)
            } else {
                theme.base()
            };
            Line::from(Span::styled(format!(" {} ", item.label), style))
        })
        .collect();

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines).style(theme.base()).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.accent()),
        ),
        area,
    );
    menu.set_content_area(area);
}
