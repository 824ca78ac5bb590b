//! Texts for the informational commands.

use crate::channels::ReplyMarkup;

pub const DASHBOARD_BUTTON: &str = "🚛 Open dashboard";

pub const HELP: &str = "🛠 *Available commands:*\n\n\
    /start - Start and get the dashboard link\n\
    /add - ➕ Register a new vehicle\n\
    /about - About the project\n\
    /cancel - Cancel the current action";

pub const ABOUT: &str = "📚 *About: Fleet Management System*\n\n\
    Operational fleet tracking for logistics.\n\
    • *Stack:* Rust, Tokio, Axum, libSQL.\n\
    • *Architecture:* bot and web dashboard in one process.";

pub const UNKNOWN_COMMAND: &str = "Unknown command. Send /help for the command list.";

pub const SHUTDOWN: &str = "👋 Shutting down.";

pub fn welcome(name: &str) -> String {
    format!(
        "👋 Hello, {name}!\n\n\
         I'm the fleet management bot. Use the menu to navigate or send /help."
    )
}

pub fn dashboard_button(url: &str) -> ReplyMarkup {
    ReplyMarkup::WebAppButton {
        text: DASHBOARD_BUTTON.to_string(),
        url: url.to_string(),
    }
}
