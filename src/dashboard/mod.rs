//! Web dashboard: fleet stats, vehicle list, and the HTML page.

pub mod render;
pub mod routes;
pub mod stats;

pub use routes::{DashboardState, dashboard_routes};
pub use stats::{DashboardQuery, DashboardSnapshot, FleetStats};
