//! Fleet Bot — vehicle registration over chat, with a live web dashboard.

pub mod bot;
pub mod channels;
pub mod config;
pub mod dashboard;
pub mod dialog;
pub mod error;
pub mod fleet;
pub mod store;
