pub mod dropdown;
pub mod form;
pub mod layout;
pub mod status_bar;
pub mod theme;
pub mod thread;

use ratatui::{
    layout::{Constraint, Direction, Layout as RatatuiLayout},
    text::Span,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;

pub use theme::Theme;

/// Draws the whole screen. Menu overlays go last so they sit on top.
pub fn render(f: &mut Frame, app: &App) {
    let theme = app.theme;
    f.render_widget(Block::default().style(theme.base()), f.area());

    let areas = layout::Layout::main(f.area());

    let header = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(theme.muted());
    let header_inner = header.inner(areas.header);
    f.render_widget(header, areas.header);
    let header_row = RatatuiLayout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(12)])
        .split(header_inner);
    f.render_widget(
        Paragraph::new(Span::styled(" FLUX CHAT", theme.accent())),
        header_row[0],
    );
    dropdown::render_trigger(f, header_row[1], &app.session_menu, theme);

    thread::render(f, areas.thread, app);
    form::render_prompt(f, areas.prompt, app);
    form::render_settings(f, areas.settings, app);
    status_bar::render(f, areas.status, app);

    for menu in &app.image_menus {
        dropdown::render_content(f, &menu.menu, f.area(), theme);
    }
    dropdown::render_content(f, &app.session_menu, f.area(), theme);
}
