use ratatui::style::{Color, Modifier, Style};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn toggle(&self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn base(&self) -> Style {
        match self {
            Theme::Dark => Style::default().fg(Color::White).bg(Color::Black),
            Theme::Light => Style::default().fg(Color::Black).bg(Color::White),
        }
    }

    pub fn muted(&self) -> Style {
        match self {
            Theme::Dark => Style::default().fg(Color::DarkGray),
            Theme::Light => Style::default().fg(Color::Gray),
        }
    }

    pub fn accent(&self) -> Style {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    }

    pub fn user(&self) -> Style {
        Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)
    }

    pub fn ai(&self) -> Style {
        match self {
            Theme::Dark => Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD),
            Theme::Light => Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        }
    }

    pub fn focused(&self) -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    }

    pub fn link(&self) -> Style {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::UNDERLINED)
    }
}
