//! Fleet domain model.

pub mod model;

pub use model::{DRIVER_MAX_LEN, PLATE_MAX_LEN, Vehicle, VehicleStatus, normalize_plate};
