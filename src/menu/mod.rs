pub mod bus;
pub mod dropdown;
pub mod item;

pub use bus::{PointerBus, PointerButton, PointerEvent, Subscription};
pub use dropdown::{DropdownMenu, MenuState};
pub use item::MenuItem;
