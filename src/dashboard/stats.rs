//! Read-only queries behind the dashboard.

use std::sync::Arc;

use serde::Serialize;

use crate::error::DatabaseError;
use crate::fleet::Vehicle;
use crate::store::VehicleStore;

/// Aggregate fleet figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FleetStats {
    /// Number of registered vehicles.
    pub total: usize,
    /// Vehicles currently `OnRoute`.
    pub active: usize,
}

impl FleetStats {
    pub fn from_vehicles(vehicles: &[Vehicle]) -> Self {
        Self {
            total: vehicles.len(),
            active: vehicles.iter().filter(|v| v.is_on_route()).count(),
        }
    }
}

/// Vehicles and stats taken from one read, so they always agree.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub stats: FleetStats,
    pub vehicles: Vec<Vehicle>,
}

/// Dashboard queries over a [`VehicleStore`].
#[derive(Clone)]
pub struct DashboardQuery {
    store: Arc<dyn VehicleStore>,
}

impl DashboardQuery {
    pub fn new(store: Arc<dyn VehicleStore>) -> Self {
        Self { store }
    }

    pub async fn list_all(&self) -> Result<Vec<Vehicle>, DatabaseError> {
        self.store.list_vehicles().await
    }

    pub async fn get_stats(&self) -> Result<FleetStats, DatabaseError> {
        let vehicles = self.store.list_vehicles().await?;
        Ok(FleetStats::from_vehicles(&vehicles))
    }

    pub async fn snapshot(&self) -> Result<DashboardSnapshot, DatabaseError> {
        let vehicles = self.store.list_vehicles().await?;
        Ok(DashboardSnapshot {
            stats: FleetStats::from_vehicles(&vehicles),
            vehicles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::VehicleStatus;
    use crate::store::LibSqlBackend;

    fn vehicle(id: i64, status: VehicleStatus) -> Vehicle {
        Vehicle {
            id,
            plate_number: format!("A00{id}AA"),
            driver_name: "Driver".into(),
            status,
            mileage: 0.0,
        }
    }

    #[test]
    fn stats_count_on_route_only() {
        let vehicles = [
            vehicle(1, VehicleStatus::OnRoute),
            vehicle(2, VehicleStatus::Idle),
            vehicle(3, VehicleStatus::Maintenance),
            vehicle(4, VehicleStatus::OnRoute),
        ];
        assert_eq!(
            FleetStats::from_vehicles(&vehicles),
            FleetStats {
                total: 4,
                active: 2
            }
        );
    }

    #[test]
    fn empty_fleet() {
        assert_eq!(FleetStats::from_vehicles(&[]), FleetStats::default());
    }

    #[tokio::test]
    async fn query_reads_through_store() {
        let backend = Arc::new(LibSqlBackend::new_memory().await.unwrap());
        backend.init_schema().await.unwrap();
        backend.add_vehicle("A001AA", "Ivanov I.I.").await.unwrap();
        backend.add_vehicle("B002BB", "Petrov P.P.").await.unwrap();

        let query = DashboardQuery::new(backend);
        let stats = query.get_stats().await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.active, 0);

        let snapshot = query.snapshot().await.unwrap();
        assert_eq!(snapshot.stats.total, snapshot.vehicles.len());
        assert_eq!(query.list_all().await.unwrap().len(), 2);
    }
}
