pub mod image;
pub mod message;
pub mod queue;

pub use image::*;
pub use message::*;
pub use queue::*;
