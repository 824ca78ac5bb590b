//! libSQL backend — async `VehicleStore` implementation.
//!
//! Supports local file and in-memory databases. Plate uniqueness is enforced
//! by a unique index, so the duplicate check and the insert are one atomic
//! statement from the engine's point of view.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info, warn};

use crate::error::DatabaseError;
use crate::fleet::model::{DRIVER_MAX_LEN, PLATE_MAX_LEN, char_len};
use crate::fleet::{Vehicle, VehicleStatus, normalize_plate};
use crate::store::migrations;
use crate::store::traits::VehicleStore;

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.init_schema().await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.init_schema().await?;
        Ok(backend)
    }

    /// Get the connection.
    fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Look up a vehicle by plate. The plate is normalized first.
    pub async fn find_by_plate(&self, plate: &str) -> Result<Option<Vehicle>, DatabaseError> {
        let plate = normalize_plate(plate);
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE plate_number = ?1"),
                params![plate],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("find_by_plate: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let vehicle = row_to_vehicle(&row)
                    .map_err(|e| DatabaseError::Query(format!("find_by_plate row parse: {e}")))?;
                Ok(Some(vehicle))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("find_by_plate: {e}"))),
        }
    }
}

// ── Helper functions ────────────────────────────────────────────────

const VEHICLE_COLUMNS: &str = "id, plate_number, driver_name, status, mileage";

/// Map a libsql Row to a Vehicle.
///
/// Column order matches VEHICLE_COLUMNS.
fn row_to_vehicle(row: &libsql::Row) -> Result<Vehicle, libsql::Error> {
    let status_str: String = row.get(3)?;
    let status = status_str.parse().unwrap_or_else(|e| {
        warn!(status = %status_str, "{e}; treating as Idle");
        VehicleStatus::Idle
    });

    Ok(Vehicle {
        id: row.get(0)?,
        plate_number: row.get(1)?,
        driver_name: row.get(2)?,
        status,
        mileage: row.get(4)?,
    })
}

/// Check normalized field values against the record limits.
fn validate_fields(plate: &str, driver: &str) -> Result<(), DatabaseError> {
    let plate_len = char_len(plate);
    if plate_len == 0 || plate_len > PLATE_MAX_LEN {
        return Err(DatabaseError::InvalidField {
            field: "plate_number".into(),
            message: format!("must be 1-{PLATE_MAX_LEN} characters, got {plate_len}"),
        });
    }
    let driver_len = char_len(driver);
    if driver_len == 0 || driver_len > DRIVER_MAX_LEN {
        return Err(DatabaseError::InvalidField {
            field: "driver_name".into(),
            message: format!("must be 1-{DRIVER_MAX_LEN} characters, got {driver_len}"),
        });
    }
    Ok(())
}

/// Translate an insert failure, surfacing unique-index violations as `DuplicateKey`.
fn map_insert_error(err: libsql::Error, plate: &str) -> DatabaseError {
    let message = err.to_string();
    if message.contains("UNIQUE constraint failed") {
        DatabaseError::DuplicateKey {
            plate: plate.to_string(),
        }
    } else {
        DatabaseError::Query(format!("add_vehicle: {message}"))
    }
}

// ── Trait implementation ────────────────────────────────────────────

#[async_trait]
impl VehicleStore for LibSqlBackend {
    async fn init_schema(&self) -> Result<(), DatabaseError> {
        migrations::run_migrations(self.conn()).await
    }

    async fn list_vehicles(&self) -> Result<Vec<Vehicle>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {VEHICLE_COLUMNS} FROM vehicles ORDER BY id ASC"),
                (),
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("list_vehicles: {e}")))?;

        let mut vehicles = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("list_vehicles: {e}")))?
        {
            match row_to_vehicle(&row) {
                Ok(vehicle) => vehicles.push(vehicle),
                Err(e) => {
                    warn!("Skipping vehicle row: {e}");
                }
            }
        }
        Ok(vehicles)
    }

    async fn add_vehicle(&self, plate: &str, driver: &str) -> Result<Vehicle, DatabaseError> {
        let plate = normalize_plate(plate);
        let driver = driver.trim();
        validate_fields(&plate, driver)?;

        // No pre-check: the unique index decides, atomically.
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "INSERT INTO vehicles (plate_number, driver_name, status, mileage)
                     VALUES (?1, ?2, ?3, ?4)
                     RETURNING {VEHICLE_COLUMNS}"
                ),
                params![
                    plate.clone(),
                    driver,
                    VehicleStatus::Idle.as_str(),
                    0.0_f64
                ],
            )
            .await
            .map_err(|e| map_insert_error(e, &plate))?;

        let row = rows
            .next()
            .await
            .map_err(|e| map_insert_error(e, &plate))?
            .ok_or_else(|| DatabaseError::Query(format!("add_vehicle: no row returned for {plate}")))?;
        let vehicle = row_to_vehicle(&row)
            .map_err(|e| DatabaseError::Query(format!("add_vehicle row parse: {e}")))?;

        debug!(id = vehicle.id, plate = %vehicle.plate_number, "Vehicle inserted into DB");
        Ok(vehicle)
    }

    async fn count_vehicles(&self) -> Result<usize, DatabaseError> {
        let mut rows = self
            .conn()
            .query("SELECT COUNT(*) FROM vehicles", ())
            .await
            .map_err(|e| DatabaseError::Query(format!("count_vehicles: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let count: i64 = row
                    .get(0)
                    .map_err(|e| DatabaseError::Query(format!("count_vehicles: {e}")))?;
                Ok(count.max(0) as usize)
            }
            Ok(None) => Ok(0),
            Err(e) => Err(DatabaseError::Query(format!("count_vehicles: {e}"))),
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────
