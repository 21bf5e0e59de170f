//! API request handlers.

pub mod comments;
pub mod events;
pub mod feed;
pub mod health;
pub mod likes;
pub mod swap;
pub mod users;
pub mod videos;

pub use health::{health, ready};
