use ratatui::layout::{Constraint, Direction, Layout as RatatuiLayout, Rect};

pub struct Areas {
    pub header: Rect,
    pub thread: Rect,
    pub prompt: Rect,
    pub settings: Rect,
    pub status: Rect,
}

pub struct Layout;

impl Layout {
    pub fn main(area: Rect) -> Areas {
        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(3),    // Conversation
                Constraint::Length(3), // Prompt input
                Constraint::Length(7), // Settings + generate button
                Constraint::Length(1), // Status bar
            ])
            .split(area);

        Areas {
            header: chunks[0],
            thread: chunks[1],
            prompt: chunks[2],
            settings: chunks[3],
            status: chunks[4],
        }
    }

    /// Places a dropdown box below `trigger`, right-aligned to it and kept
    /// inside `bounds`.
    pub fn dropdown(trigger: Rect, size: (u16, u16), bounds: Rect) -> Rect {
        let width = size.0.min(bounds.width);
        let height = size.1.min(bounds.height);

        let right = trigger.x + trigger.width;
        let x = right
            .saturating_sub(width)
            .max(bounds.x)
            .min((bounds.x + bounds.width).saturating_sub(width));

        let below = trigger.y + trigger.height;
        let y = if below + height <= bounds.y + bounds.height {
            below
        } else {
            trigger.y.saturating_sub(height).max(bounds.y)
        };

        Rect::new(x, y, width, height)
    }
}
