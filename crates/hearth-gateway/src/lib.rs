//! # hearth-gateway
//!
//! WebSocket gateway: holds the live connections, speaks the
//! `{"action", "results"}` envelope protocol, and bridges Redis pub/sub
//! events onto the sockets.

pub mod broadcast;
pub mod connection;
pub mod handlers;
pub mod protocol;
pub mod server;

pub use server::run;
