//! Bot front-end: command parsing, reply texts, and the message loop.

pub mod commands;
pub mod handler;
pub mod replies;

pub use commands::{Command, CommandParser};
pub use handler::{BotConfig, FleetBot};
