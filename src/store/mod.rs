//! Persistence layer — libSQL-backed storage for vehicle records.

pub mod libsql_backend;
pub mod migrations;
pub mod seed;
pub mod traits;

pub use libsql_backend::LibSqlBackend;
pub use seed::seed_demo_fleet;
pub use traits::VehicleStore;
