//! `VehicleStore` trait — single async interface for fleet persistence.

use async_trait::async_trait;

use crate::error::DatabaseError;
use crate::fleet::Vehicle;

/// Backend-agnostic vehicle storage.
///
/// Implementations must enforce plate uniqueness in the storage engine
/// itself: two concurrent `add_vehicle` calls for the same normalized plate
/// can never both succeed, and the loser sees [`DatabaseError::DuplicateKey`].
#[async_trait]
pub trait VehicleStore: Send + Sync {
    /// Ensure the schema exists. Idempotent; run on every process start.
    async fn init_schema(&self) -> Result<(), DatabaseError>;

    /// Every vehicle, as a read snapshot. Ordered by id.
    async fn list_vehicles(&self) -> Result<Vec<Vehicle>, DatabaseError>;

    /// Register a vehicle.
    ///
    /// The plate is normalized (whitespace removed, uppercased) and the
    /// driver name trimmed before validation. New records start `Idle` with
    /// zero mileage. All-or-nothing: on error nothing is written.
    async fn add_vehicle(&self, plate: &str, driver: &str) -> Result<Vehicle, DatabaseError>;

    /// Number of registered vehicles.
    async fn count_vehicles(&self) -> Result<usize, DatabaseError> {
        Ok(self.list_vehicles().await?.len())
    }
}
