//! Vehicle records and plate normalization.

use serde::{Deserialize, Serialize};

/// Maximum plate length accepted by the store (after normalization).
pub const PLATE_MAX_LEN: usize = 20;

/// Maximum driver name length accepted by the store (after trimming).
pub const DRIVER_MAX_LEN: usize = 100;

/// Operational status of a vehicle.
///
/// Stored and serialized as `Idle`, `OnRoute`, `Maintenance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VehicleStatus {
    #[default]
    Idle,
    OnRoute,
    Maintenance,
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::OnRoute => "OnRoute",
            Self::Maintenance => "Maintenance",
        }
    }
}

impl std::fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for VehicleStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Idle" => Ok(Self::Idle),
            "OnRoute" => Ok(Self::OnRoute),
            "Maintenance" => Ok(Self::Maintenance),
            _ => Err(format!("Unknown vehicle status: {}", s)),
        }
    }
}

/// A registered vehicle.
///
/// Instances handed out by the store are read snapshots; the store is the
/// only owner of the durable record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Surrogate identity assigned by the store.
    pub id: i64,
    /// Normalized plate number (no whitespace, uppercase). Unique across the fleet.
    pub plate_number: String,
    pub driver_name: String,
    pub status: VehicleStatus,
    pub mileage: f64,
}

impl Vehicle {
    pub fn is_on_route(&self) -> bool {
        self.status == VehicleStatus::OnRoute
    }
}

/// Normalize a plate number: drop all whitespace and uppercase.
///
/// Plates are often typed with spaces between groups, so `"a1 a1a1"`
/// becomes `"A1A1A1"`.
pub fn normalize_plate(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Length in characters, not bytes (plates and names may be Cyrillic).
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_uppercases() {
        assert_eq!(normalize_plate("  a777aa \n"), "A777AA");
        assert_eq!(normalize_plate("a1 a1a1"), "A1A1A1");
        assert_eq!(normalize_plate("b 002\tbb"), "B002BB");
        assert_eq!(normalize_plate("   "), "");
    }

    #[test]
    fn normalize_handles_cyrillic() {
        assert_eq!(normalize_plate("а001аа"), "А001АА");
        assert_eq!(char_len("А001АА"), 6);
    }

    #[test]
    fn status_display_matches_serde() {
        for status in [
            VehicleStatus::Idle,
            VehicleStatus::OnRoute,
            VehicleStatus::Maintenance,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
            assert_eq!(status.to_string().parse::<VehicleStatus>().unwrap(), status);
        }
    }

    #[test]
    fn status_defaults_to_idle() {
        assert_eq!(VehicleStatus::default(), VehicleStatus::Idle);
        assert!("on_route".parse::<VehicleStatus>().is_err());
    }

    #[test]
    fn on_route_check() {
        let mut v = Vehicle {
            id: 1,
            plate_number: "A001AA".into(),
            driver_name: "Ivanov I.I.".into(),
            status: VehicleStatus::Idle,
            mileage: 0.0,
        };
        assert!(!v.is_on_route());
        v.status = VehicleStatus::OnRoute;
        assert!(v.is_on_route());
    }
}
