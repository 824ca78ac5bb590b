//! User-facing texts for the registration dialog.

use crate::error::RegistrationError;
use crate::fleet::Vehicle;

pub const ASK_PLATE: &str = "✍️ Enter the vehicle's plate number (for example, A777AA):";

pub const PLATE_TOO_SHORT: &str = "⚠️ That plate number is too short. Try again:";

pub const CANCELLED: &str = "⛔️ Action cancelled.";

pub const NOTHING_TO_CANCEL: &str = "Nothing to cancel.";

pub const NO_ACTIVE_DIALOG: &str = "Send /add to register a vehicle or /help for the command list.";

pub fn ask_driver(plate: &str) -> String {
    format!("Accepted: {plate}.\n👤 Now enter the driver's full name:")
}

/// Success message. Sent with Markdown formatting; user values are escaped.
pub fn registered(vehicle: &Vehicle) -> String {
    format!(
        "✅ *Vehicle added!*\n\n\
         🚛 Vehicle: {}\n\
         👤 Driver: {}\n\n\
         The dashboard is already up to date.",
        markdown_escape(&vehicle.plate_number),
        markdown_escape(&vehicle.driver_name)
    )
}

/// Escape legacy Markdown metacharacters outside an entity.
fn markdown_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub fn failed(err: &RegistrationError) -> String {
    format!("❌ Failed to save: {err}")
}
