//! Dropdown menu that closes itself on any pointer-down outside its bounds.
//!
//! The widget is `Closed` when created. Activating the trigger toggles it.
//! While open it holds exactly one [`Subscription`] on the shared
//! [`PointerBus`]; the subscription is released when the menu closes, when it
//! is torn down, or when it is dropped.
//!
//! The widget's boundary is explicit: the union of the trigger area and the
//! content area recorded by the renderer. A pointer-down on the trigger is
//! therefore *inside*, so the bus listener ignores it and the trigger
//! activation that follows is the only thing that changes state.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use ratatui::layout::{Position, Rect};

use super::bus::{PointerBus, PointerEvent, Subscription};
use super::item::MenuItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    Closed,
    Open,
}

#[derive(Default)]
struct MenuCore {
    open: bool,
    trigger_area: Rect,
    content_area: Option<Rect>,
    subscription: Option<Subscription>,
}

impl MenuCore {
    fn contains(&self, position: Position) -> bool {
        self.trigger_area.contains(position)
            || self
                .content_area
                .map(|area| area.contains(position))
                .unwrap_or(false)
    }

    /// Returns the released subscription so the caller can drop it after the
    /// core borrow ends.
    fn close(&mut self) -> Option<Subscription> {
        self.open = false;
        self.content_area = None;
        self.subscription.take()
    }

    fn pointer_down(&mut self, position: Position) -> Option<Subscription> {
        if self.open && !self.contains(position) {
            self.close()
        } else {
            None
        }
    }
}

pub struct DropdownMenu<A> {
    trigger: String,
    items: Vec<MenuItem<A>>,
    bus: PointerBus,
    core: Rc<RefCell<MenuCore>>,
}

impl<A: Clone> DropdownMenu<A> {
    pub fn new(bus: &PointerBus, trigger: impl Into<String>, items: Vec<MenuItem<A>>) -> Self {
        Self {
            trigger: trigger.into(),
            items,
            bus: bus.clone(),
            core: Rc::new(RefCell::new(MenuCore::default())),
        }
    }

    pub fn trigger_label(&self) -> &str {
        &self.trigger
    }

    pub fn items(&self) -> &[MenuItem<A>] {
        &self.items
    }

    pub fn state(&self) -> MenuState {
        if self.is_open() {
            MenuState::Open
        } else {
            MenuState::Closed
        }
    }

    pub fn is_open(&self) -> bool {
        self.core.borrow().open
    }

    /// True while the menu holds a live listener on the pointer bus.
    pub fn is_observing(&self) -> bool {
        self.core
            .borrow()
            .subscription
            .as_ref()
            .map(Subscription::is_active)
            .unwrap_or(false)
    }

    /// Trigger activation.
    pub fn toggle(&mut self) {
        let released = {
            let mut core = self.core.borrow_mut();
            if core.open {
                core.close()
            } else {
                core.open = true;
                if core.subscription.is_none() {
                    core.subscription = Some(self.observe());
                }
                None
            }
        };
        drop(released);
    }

    /// Closes the menu and releases its listener. Takes `&self` so a
    /// renderer can close a menu it could not draw.
    pub fn close(&self) {
        let released = self.core.borrow_mut().close();
        drop(released);
    }

    /// Closes the menu when `position` is outside its boundary. Returns
    /// whether the menu closed.
    pub fn handle_outside_pointer_down(&self, position: Position) -> bool {
        let released = self.core.borrow_mut().pointer_down(position);
        released.is_some()
    }

    fn observe(&self) -> Subscription {
        let core: Weak<RefCell<MenuCore>> = Rc::downgrade(&self.core);
        self.bus.subscribe(move |event: &PointerEvent| {
            if let Some(core) = core.upgrade() {
                let released = core.borrow_mut().pointer_down(event.position);
                drop(released);
            }
        })
    }

    pub fn set_trigger_area(&self, area: Rect) {
        self.core.borrow_mut().trigger_area = area;
    }

    /// Records where the content was drawn. Ignored while closed.
    pub fn set_content_area(&self, area: Rect) {
        let mut core = self.core.borrow_mut();
        if core.open {
            core.content_area = Some(area);
        }
    }

    pub fn trigger_area(&self) -> Rect {
        self.core.borrow().trigger_area
    }

    pub fn content_area(&self) -> Option<Rect> {
        self.core.borrow().content_area
    }

    pub fn contains(&self, position: Position) -> bool {
        self.core.borrow().contains(position)
    }

    pub fn hits_trigger(&self, position: Position) -> bool {
        self.core.borrow().trigger_area.contains(position)
    }

    /// Size of the bordered content box: one row per item.
    pub fn content_size(&self) -> (u16, u16) {
        let widest = self
            .items
            .iter()
            .map(|item| item.label.chars().count())
            .max()
            .unwrap_or(0);
        (
            u16::try_from(widest).unwrap_or(u16::MAX).saturating_add(4),
            u16::try_from(self.items.len())
                .unwrap_or(u16::MAX)
                .saturating_add(2),
        )
    }

    /// Index of the item drawn under `position`, if the menu is open.
    pub fn item_at(&self, position: Position) -> Option<usize> {
        let area = self.core.borrow().content_area?;
        if !area.contains(position) || position.y <= area.y {
            return None;
        }
        let index = (position.y - area.y - 1) as usize;
        (index < self.items.len()).then_some(index)
    }

    /// Selects an item: closes the menu and returns its action. Disabled or
    /// out-of-range items leave the menu open and return `None`.
    pub fn select(&mut self, index: usize) -> Option<A> {
        if !self.is_open() {
            return None;
        }
        let action = self
            .items
            .get(index)
            .filter(|item| item.is_selectable())
            .map(|item| item.action.clone())?;
        self.close();
        Some(action)
    }

    /// Removes the widget from the screen. The pointer listener is released
    /// and nothing can reach the menu state afterwards.
    pub fn teardown(self) {}
}

impl<A> Drop for DropdownMenu<A> {
    fn drop(&mut self) {
        let released = self.core.borrow_mut().subscription.take();
        drop(released);
    }
}

impl<A> std::fmt::Debug for DropdownMenu<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let core = self.core.borrow();
        f.debug_struct("DropdownMenu")
            .field("trigger", &self.trigger)
            .field("items", &self.items.len())
            .field("open", &core.open)
            .finish()
    }
}
