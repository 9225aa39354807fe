//! The Basalt server: accept loop, per-connection actors, packet handlers,
//! player sessions and the tick loop.

pub mod config;
pub mod connection;
pub mod handlers;
pub mod server;
pub mod session;
pub mod session_manager;
pub mod tick;
pub mod view;

pub use config::ServerConfig;
pub use server::Server;
