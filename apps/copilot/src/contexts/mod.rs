//! Isolated execution contexts reached through the message router.

pub mod background;
pub mod handlers;
pub mod page;
pub mod tabs;

pub use background::BackgroundContext;
pub use tabs::{TabError, TabRegistry};
