//! Request handlers, one module per domain

pub mod accounts;
pub mod families;
pub mod friends;
pub mod health;
pub mod messages;
pub mod rooms;
pub mod video;
