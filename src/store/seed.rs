//! Demo data for an empty fleet.

use crate::error::DatabaseError;
use crate::store::VehicleStore;

/// Vehicles inserted on first start so the dashboard isn't empty.
pub const DEMO_VEHICLES: &[(&str, &str)] = &[("A001AA", "Ivanov I.I."), ("B002BB", "Petrov P.P.")];

/// Insert the demo vehicles if the store has no vehicles.
/// Returns how many were inserted.
pub async fn seed_demo_fleet(store: &dyn VehicleStore) -> Result<usize, DatabaseError> {
    if store.count_vehicles().await? > 0 {
        return Ok(0);
    }

    let mut inserted = 0;
    for (plate, driver) in DEMO_VEHICLES {
        match store.add_vehicle(plate, driver).await {
            Ok(_) => inserted += 1,
            // Someone registered it between the count and the insert.
            Err(DatabaseError::DuplicateKey { .. }) => {}
            Err(e) => return Err(e),
        }
    }

    tracing::info!(inserted, "Seeded demo vehicles");
    Ok(inserted)
}
