pub mod app;
pub mod chat;
pub mod config;
pub mod error;
pub mod fal;
pub mod gallery;
pub mod logger;
pub mod menu;
pub mod mode;
pub mod models;
pub mod ui;

pub use app::{App, AppEvent, Command, ImageAction, SessionAction};
pub use chat::{ChatSession, PendingGeneration};
pub use config::{Config, FalConfig};
pub use error::{FluxError, Result};
pub use fal::{FalClient, ImageClient, ImageGenerator};
pub use menu::{DropdownMenu, MenuItem, MenuState, PointerBus, PointerEvent, Subscription};
pub use models::*;
