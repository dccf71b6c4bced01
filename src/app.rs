use std::cell::Cell;
use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};
use uuid::Uuid;

use crate::chat::{ChatSession, PendingGeneration};
use crate::error::Result;
use crate::menu::{DropdownMenu, MenuItem, PointerBus, PointerButton, PointerEvent};
use crate::mode::Field;
use crate::models::{ImageGenerationResponse, QueueStatus};
use crate::ui::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    NewChat,
    ResetSettings,
    ToggleTheme,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageAction {
    ReusePrompt,
    Save,
    ShowUrl,
}

/// Work the event loop has to start on the app's behalf.
#[derive(Debug, Clone)]
pub enum Command {
    Generate(PendingGeneration),
    SaveImages { message_id: Uuid, urls: Vec<String> },
}

/// Results delivered back from background tasks.
#[derive(Debug)]
pub enum AppEvent {
    Queue(QueueStatus),
    Finished(Result<ImageGenerationResponse>),
    Saved(Result<PathBuf>),
}

/// Dropdown attached to one AI reply that carries images.
pub struct ImageMenu {
    pub message_id: Uuid,
    pub menu: DropdownMenu<ImageAction>,
}

pub struct App {
    pub session: ChatSession,
    pub focus: Field,
    pub theme: Theme,
    pub seed_input: String,
    pub status_message: Option<String>,
    pub queue_status: Option<String>,
    pub output_dir: PathBuf,
    pub should_quit: bool,
    pub session_menu: DropdownMenu<SessionAction>,
    pub image_menus: Vec<ImageMenu>,
    /// Where the generate button was last drawn.
    pub generate_button: Cell<Rect>,
    bus: PointerBus,
    pending: Option<PendingGeneration>,
}

impl App {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        let bus = PointerBus::new();
        let session_menu = DropdownMenu::new(
            &bus,
            "≡ Menu",
            vec![
                MenuItem::new("New chat", SessionAction::NewChat),
                MenuItem::new("Reset settings", SessionAction::ResetSettings),
                MenuItem::new("Toggle theme", SessionAction::ToggleTheme),
                MenuItem::new("Quit", SessionAction::Quit),
            ],
        );

        Self {
            session: ChatSession::new(),
            focus: Field::Prompt,
            theme: Theme::Dark,
            seed_input: String::new(),
            status_message: None,
            queue_status: None,
            output_dir: output_dir.into(),
            should_quit: false,
            session_menu,
            image_menus: Vec::new(),
            generate_button: Cell::new(Rect::default()),
            bus,
            pending: None,
        }
    }

    pub fn pointer_bus(&self) -> &PointerBus {
        &self.bus
    }

    pub fn image_menu(&self, message_id: Uuid) -> Option<&DropdownMenu<ImageAction>> {
        self.image_menus
            .iter()
            .find(|m| m.message_id == message_id)
            .map(|m| &m.menu)
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<Command> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return None;
        }

        match key.code {
            KeyCode::Esc => {
                self.close_menus();
                None
            }
            KeyCode::Tab => {
                self.focus = self.focus.next();
                None
            }
            KeyCode::BackTab => {
                self.focus = self.focus.previous();
                None
            }
            KeyCode::Enter => self.send(),
            // Control and Alt chords are not text.
            _ if key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                None
            }
            _ => {
                self.edit_focused(key.code);
                None
            }
        }
    }

    fn edit_focused(&mut self, code: KeyCode) {
        if self.focus == Field::Seed {
            match code {
                KeyCode::Char(c) if c.is_ascii_digit() => self.seed_input.push(c),
                KeyCode::Backspace => {
                    self.seed_input.pop();
                }
                _ => return,
            }
            self.apply_seed();
            return;
        }

        let generating = self.session.is_generating();
        let settings = &mut self.session.settings;
        match (self.focus, code) {
            (Field::Prompt, _) if generating => {}
            (Field::Prompt, KeyCode::Char(c)) => settings.prompt.push(c),
            (Field::Prompt, KeyCode::Backspace) => {
                settings.prompt.pop();
            }

            (Field::ImageSize, KeyCode::Right | KeyCode::Char('+')) => {
                settings.image_size = settings.image_size.next()
            }
            (Field::ImageSize, KeyCode::Left | KeyCode::Char('-')) => {
                settings.image_size = settings.image_size.previous()
            }

            (Field::Steps, KeyCode::Right | KeyCode::Char('+')) => settings.adjust_steps(1),
            (Field::Steps, KeyCode::Left | KeyCode::Char('-')) => settings.adjust_steps(-1),

            (Field::Guidance, KeyCode::Right | KeyCode::Char('+')) => settings.adjust_guidance(1),
            (Field::Guidance, KeyCode::Left | KeyCode::Char('-')) => settings.adjust_guidance(-1),

            (Field::NumImages, KeyCode::Right | KeyCode::Char('+')) => {
                settings.adjust_num_images(1)
            }
            (Field::NumImages, KeyCode::Left | KeyCode::Char('-')) => {
                settings.adjust_num_images(-1)
            }

            (Field::SyncMode, KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right) => {
                settings.sync_mode = !settings.sync_mode
            }
            (Field::SafetyChecker, KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right) => {
                settings.enable_safety_checker = !settings.enable_safety_checker
            }

            _ => {}
        }
    }

    fn apply_seed(&mut self) {
        match self.session.settings.set_seed_text(&self.seed_input) {
            Ok(()) => self.status_message = None,
            Err(e) => {
                self.seed_input.pop();
                self.status_message = Some(e.to_string());
            }
        }
    }

    fn send(&mut self) -> Option<Command> {
        let pending = self.session.begin_send()?;
        self.queue_status = Some("Submitting".to_string());
        self.status_message = None;
        self.pending = Some(pending.clone());
        Some(Command::Generate(pending))
    }

    /// Pointer-down events go to the bus first so open menus can dismiss
    /// themselves, then the click is routed to whatever sits under it.
    pub fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Option<Command> {
        let button = match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => PointerButton::Left,
            MouseEventKind::Down(MouseButton::Right) => PointerButton::Right,
            MouseEventKind::Down(MouseButton::Middle) => PointerButton::Middle,
            _ => return None,
        };
        let event = PointerEvent::new(mouse.column, mouse.row, button);
        self.bus.dispatch(&event);

        if button != PointerButton::Left {
            return None;
        }
        self.click(event.position)
    }

    fn click(&mut self, position: Position) -> Option<Command> {
        if let Some(index) = self.session_menu.item_at(position) {
            let action = self.session_menu.select(index)?;
            self.perform_session_action(action);
            return None;
        }
        if let Some((message_id, index)) = self.image_menus.iter().find_map(|m| {
            m.menu
                .item_at(position)
                .map(|index| (m.message_id, index))
        }) {
            let action = self
                .image_menus
                .iter_mut()
                .find(|m| m.message_id == message_id)
                .and_then(|m| m.menu.select(index))?;
            return self.perform_image_action(message_id, action);
        }

        if self.session_menu.hits_trigger(position) {
            self.session_menu.toggle();
            return None;
        }
        if let Some(menu) = self
            .image_menus
            .iter_mut()
            .find(|m| m.menu.hits_trigger(position))
        {
            menu.menu.toggle();
            return None;
        }

        if self.generate_button.get().contains(position) {
            return self.send();
        }
        None
    }

    pub fn close_menus(&mut self) {
        self.session_menu.close();
        for menu in &mut self.image_menus {
            menu.menu.close();
        }
    }

    pub fn perform_session_action(&mut self, action: SessionAction) {
        match action {
            SessionAction::NewChat => match self.session.end_chat() {
                Ok(()) => {
                    self.sync_image_menus();
                    self.status_message = Some("Started a new chat".to_string());
                }
                Err(e) => self.status_message = Some(e.to_string()),
            },
            SessionAction::ResetSettings => {
                self.session.reset_settings();
                self.seed_input.clear();
                self.status_message = Some("Settings reset".to_string());
            }
            SessionAction::ToggleTheme => {
                self.theme = self.theme.toggle();
            }
            SessionAction::Quit => {
                self.should_quit = true;
            }
        }
    }

    pub fn perform_image_action(&mut self, message_id: Uuid, action: ImageAction) -> Option<Command> {
        let message = self.session.message(message_id)?;
        match action {
            ImageAction::ReusePrompt => {
                if let Some(prompt) = message.prompt.clone() {
                    if !self.session.is_generating() {
                        self.session.settings.prompt = prompt;
                        self.focus = Field::Prompt;
                    }
                }
                None
            }
            ImageAction::ShowUrl => {
                self.status_message = Some(message.image_urls.join("  "));
                None
            }
            ImageAction::Save => {
                let urls = message.image_urls.clone();
                self.status_message = Some(format!("Saving {} image(s)...", urls.len()));
                Some(Command::SaveImages { message_id, urls })
            }
        }
    }

    pub fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Queue(status) => {
                self.queue_status = Some(status.summary());
            }
            AppEvent::Finished(result) => {
                let Some(pending) = self.pending.take() else {
                    log::warn!("Generation finished with no request in flight");
                    return;
                };
                self.session.finish(&pending, result);
                self.queue_status = None;
                self.sync_image_menus();
            }
            AppEvent::Saved(Ok(path)) => {
                self.status_message = Some(format!("Saved {}", path.display()));
            }
            AppEvent::Saved(Err(e)) => {
                log::error!("Failed to save image: {}", e);
                self.status_message = Some(format!("Save failed: {}", e));
            }
        }
    }

    /// Keeps exactly one image menu per AI reply with images. Menus for
    /// messages that no longer exist are dropped, which releases their
    /// pointer listeners.
    pub fn sync_image_menus(&mut self) {
        let messages = self.session.messages();
        self.image_menus
            .retain(|m| messages.iter().any(|msg| msg.id == m.message_id));

        for message in messages.iter().filter(|m| m.has_images()) {
            if self.image_menus.iter().any(|m| m.message_id == message.id) {
                continue;
            }
            let menu = DropdownMenu::new(
                &self.bus,
                "⋯",
                vec![
                    MenuItem::new("Reuse prompt", ImageAction::ReusePrompt)
                        .disabled(message.prompt.is_none()),
                    MenuItem::new("Save image", ImageAction::Save),
                    MenuItem::new("Show URL", ImageAction::ShowUrl),
                ],
            );
            self.image_menus.push(ImageMenu {
                message_id: message.id,
                menu,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FluxError;
    use crate::models::GeneratedImage;
    use crossterm::event::KeyEventKind;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn mouse_down(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key_event(key(KeyCode::Char(c)));
        }
    }

    fn response(urls: &[&str]) -> ImageGenerationResponse {
        ImageGenerationResponse {
            images: urls
                .iter()
                .map(|url| GeneratedImage {
                    url: url.to_string(),
                    width: None,
                    height: None,
                    content_type: None,
                })
                .collect(),
            seed: None,
            has_nsfw_concepts: vec![],
            prompt: None,
            timings: None,
        }
    }

    fn app_with_reply() -> (App, Uuid) {
        let mut app = App::new("out");
        type_text(&mut app, "a koi pond");
        assert!(matches!(
            app.handle_key_event(key(KeyCode::Enter)),
            Some(Command::Generate(_))
        ));
        app.apply_event(AppEvent::Finished(Ok(response(&["https://fal.media/k.jpg"]))));
        let id = app.session.messages()[1].id;
        (app, id)
    }

    #[test]
    fn test_typing_and_send() {
        let mut app = App::new("out");
        type_text(&mut app, "a cat");
        app.handle_key_event(key(KeyCode::Backspace));
        assert_eq!(app.session.settings.prompt, "a ca");

        let command = app.handle_key_event(key(KeyCode::Enter));
        assert!(matches!(command, Some(Command::Generate(ref p)) if p.settings.prompt == "a ca"));
        assert!(app.session.is_generating());

        // Input is disabled and a second send is refused while generating.
        type_text(&mut app, "zzz");
        assert_eq!(app.session.settings.prompt, "a ca");
        assert!(app.handle_key_event(key(KeyCode::Enter)).is_none());

        app.apply_event(AppEvent::Queue(QueueStatus::InQueue {
            queue_position: Some(1),
        }));
        assert_eq!(app.queue_status.as_deref(), Some("In queue (position 1)"));

        app.apply_event(AppEvent::Finished(Err(FluxError::RequestError("down".into()))));
        assert!(!app.session.is_generating());
        assert!(app.queue_status.is_none());
        assert_eq!(app.session.messages().len(), 2);
        assert!(app.image_menus.is_empty());
    }

    #[test]
    fn test_modifier_chords_do_not_type() {
        let mut app = App::new("out");
        type_text(&mut app, "fox");
        for (c, modifiers) in [('u', KeyModifiers::CONTROL), ('b', KeyModifiers::ALT)] {
            app.handle_key_event(KeyEvent {
                modifiers,
                ..key(KeyCode::Char(c))
            });
        }
        app.handle_key_event(KeyEvent {
            modifiers: KeyModifiers::SHIFT,
            ..key(KeyCode::Char('Y'))
        });
        assert_eq!(app.session.settings.prompt, "foxY");
    }

    #[test]
    fn test_settings_keys() {
        let mut app = App::new("out");
        app.handle_key_event(key(KeyCode::Tab));
        assert_eq!(app.focus, Field::ImageSize);
        app.handle_key_event(key(KeyCode::Right));
        assert_eq!(
            app.session.settings.image_size,
            crate::models::ImageSize::Landscape16_9
        );

        app.handle_key_event(key(KeyCode::Tab));
        app.handle_key_event(key(KeyCode::Left));
        assert_eq!(app.session.settings.num_inference_steps, 27);

        app.handle_key_event(key(KeyCode::Tab));
        type_text(&mut app, "42x");
        assert_eq!(app.session.settings.seed, Some(42));
        assert_eq!(app.seed_input, "42");
        app.handle_key_event(key(KeyCode::Backspace));
        app.handle_key_event(key(KeyCode::Backspace));
        assert_eq!(app.session.settings.seed, None);

        app.focus = Field::SyncMode;
        app.handle_key_event(key(KeyCode::Char(' ')));
        assert!(app.session.settings.sync_mode);

        app.handle_key_event(key(KeyCode::BackTab));
        assert_eq!(app.focus, Field::NumImages);
    }

    #[test]
    fn test_seed_overflow_is_reported() {
        let mut app = App::new("out");
        app.focus = Field::Seed;
        type_text(&mut app, "99999999999999999999");
        assert!(app.status_message.is_some());
        assert_eq!(app.seed_input.len(), 19);
    }

    #[test]
    fn test_one_menu_per_image_reply() {
        let (mut app, id) = app_with_reply();
        assert_eq!(app.image_menus.len(), 1);
        app.sync_image_menus();
        assert_eq!(app.image_menus.len(), 1);
        assert!(app.image_menu(id).is_some());
    }

    #[test]
    fn test_session_menu_by_pointer() {
        let mut app = App::new("out");
        app.session_menu.set_trigger_area(Rect::new(70, 1, 8, 1));

        app.handle_mouse_event(mouse_down(72, 1));
        assert!(app.session_menu.is_open());
        assert_eq!(app.pointer_bus().listener_count(), 1);
        app.session_menu.set_content_area(Rect::new(60, 2, 18, 6));

        // "Toggle theme" is the third item: border row at y=2, items from y=3.
        app.handle_mouse_event(mouse_down(65, 5));
        assert!(!app.session_menu.is_open());
        assert_eq!(app.theme, Theme::Light);
        assert_eq!(app.pointer_bus().listener_count(), 0);
    }

    #[test]
    fn test_trigger_click_toggles_and_outside_click_dismisses() {
        let mut app = App::new("out");
        app.session_menu.set_trigger_area(Rect::new(70, 1, 8, 1));

        app.handle_mouse_event(mouse_down(72, 1));
        app.handle_mouse_event(mouse_down(72, 1));
        assert!(!app.session_menu.is_open());

        app.handle_mouse_event(mouse_down(72, 1));
        assert!(app.session_menu.is_open());
        app.handle_mouse_event(mouse_down(5, 20));
        assert!(!app.session_menu.is_open());
        assert_eq!(app.pointer_bus().listener_count(), 0);
    }

    #[test]
    fn test_opening_one_menu_closes_another() {
        let (mut app, id) = app_with_reply();
        app.session_menu.set_trigger_area(Rect::new(70, 1, 8, 1));
        app.image_menus[0].menu.set_trigger_area(Rect::new(40, 6, 3, 1));

        app.handle_mouse_event(mouse_down(72, 1));
        assert!(app.session_menu.is_open());

        app.handle_mouse_event(mouse_down(41, 6));
        assert!(!app.session_menu.is_open());
        assert!(app.image_menu(id).unwrap().is_open());
        assert_eq!(app.pointer_bus().listener_count(), 1);
    }

    #[test]
    fn test_image_actions() {
        let (mut app, id) = app_with_reply();
        app.session.settings.prompt.clear();

        assert!(app.perform_image_action(id, ImageAction::ReusePrompt).is_none());
        assert_eq!(app.session.settings.prompt, "a koi pond");

        app.perform_image_action(id, ImageAction::ShowUrl);
        assert_eq!(app.status_message.as_deref(), Some("https://fal.media/k.jpg"));

        match app.perform_image_action(id, ImageAction::Save) {
            Some(Command::SaveImages { message_id, urls }) => {
                assert_eq!(message_id, id);
                assert_eq!(urls, vec!["https://fal.media/k.jpg".to_string()]);
            }
            other => panic!("unexpected command: {:?}", other),
        }

        app.apply_event(AppEvent::Saved(Ok(PathBuf::from("out/a.jpg"))));
        assert_eq!(app.status_message.as_deref(), Some("Saved out/a.jpg"));
    }

    #[test]
    fn test_new_chat_tears_down_image_menus() {
        let (mut app, id) = app_with_reply();
        app.image_menus[0].menu.set_trigger_area(Rect::new(40, 6, 3, 1));
        app.handle_mouse_event(mouse_down(41, 6));
        assert!(app.image_menu(id).unwrap().is_open());
        assert_eq!(app.pointer_bus().listener_count(), 1);

        app.perform_session_action(SessionAction::NewChat);
        assert!(app.image_menus.is_empty());
        assert_eq!(app.pointer_bus().listener_count(), 0);
    }

    #[test]
    fn test_escape_and_quit() {
        let mut app = App::new("out");
        app.session_menu.toggle();
        app.handle_key_event(key(KeyCode::Esc));
        assert!(!app.session_menu.is_open());

        app.handle_key_event(KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        });
        assert!(app.should_quit);
    }
}
