//! Vehicle registration dialog.
//!
//! - `state` — pure state machine (no I/O)
//! - `sessions` — per-user session map with optional idle timeout
//! - `registration` — runs the state machine against the store
//! - `prompts` — reply texts

pub mod prompts;
pub mod registration;
pub mod sessions;
pub mod state;

pub use registration::{DialogReply, RegistrationDialog};
pub use sessions::{SessionStore, session_key};
pub use state::{DialogInput, DialogPhase, DialogSession, MIN_PLATE_LEN};
