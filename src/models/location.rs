//! Check-in location model and related types

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::store::{cell, cell_f64, cell_opt, Row};

/// Allowed radius applied when a location row carries none (or a
/// non-numeric value).
pub const DEFAULT_RADIUS_M: f64 = 100.0;

/// Sheet columns for the locations table.
pub const COLUMNS: &[&str] = &[
    "id",
    "name",
    "latitude",
    "longitude",
    "radius_m",
    "description",
    "image_url",
    "floor",
    "room",
];

/// A physical check-in point with its geofence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_m: f64,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub floor: Option<String>,
    pub room: Option<String>,
}

impl Location {
    pub fn from_row(row: &Row) -> AppResult<Self> {
        let id = cell(row, "id").to_string();
        let latitude = cell_f64(row, "latitude")
            .ok_or_else(|| AppError::Store(format!("location {}: latitude not numeric", id)))?;
        let longitude = cell_f64(row, "longitude")
            .ok_or_else(|| AppError::Store(format!("location {}: longitude not numeric", id)))?;

        Ok(Self {
            id,
            name: cell(row, "name").to_string(),
            latitude,
            longitude,
            radius_m: cell_f64(row, "radius_m").unwrap_or(DEFAULT_RADIUS_M),
            description: cell_opt(row, "description"),
            image_url: cell_opt(row, "image_url"),
            floor: cell_opt(row, "floor"),
            room: cell_opt(row, "room"),
        })
    }

    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("id".into(), self.id.clone());
        row.insert("name".into(), self.name.clone());
        row.insert("latitude".into(), self.latitude.to_string());
        row.insert("longitude".into(), self.longitude.to_string());
        row.insert("radius_m".into(), self.radius_m.to_string());
        row.insert("description".into(), self.description.clone().unwrap_or_default());
        row.insert("image_url".into(), self.image_url.clone().unwrap_or_default());
        row.insert("floor".into(), self.floor.clone().unwrap_or_default());
        row.insert("room".into(), self.room.clone().unwrap_or_default());
        row
    }
}

/// Create location request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLocation {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude out of range"))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude out of range"))]
    pub longitude: f64,
    /// Allowed radius in meters; defaults to 100 when omitted.
    pub radius_m: Option<f64>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub floor: Option<String>,
    pub room: Option<String>,
}

/// Update location request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLocation {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude out of range"))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude out of range"))]
    pub longitude: Option<f64>,
    pub radius_m: Option<f64>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub floor: Option<String>,
    pub room: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> Row {
        let mut row = Row::new();
        row.insert("id".into(), "LOC-1".into());
        row.insert("name".into(), "Main Hall".into());
        row.insert("latitude".into(), "13.7563".into());
        row.insert("longitude".into(), "100.5018".into());
        row.insert("radius_m".into(), "50".into());
        row
    }

    #[test]
    fn test_from_row() {
        let loc = Location::from_row(&sample_row()).unwrap();
        assert_eq!(loc.id, "LOC-1");
        assert_eq!(loc.radius_m, 50.0);
        assert_eq!(loc.description, None);
    }

    #[test]
    fn test_radius_defaults_when_missing_or_non_numeric() {
        let mut row = sample_row();
        row.shift_remove("radius_m");
        assert_eq!(Location::from_row(&row).unwrap().radius_m, DEFAULT_RADIUS_M);

        let mut row = sample_row();
        row.insert("radius_m".into(), "wide".into());
        assert_eq!(Location::from_row(&row).unwrap().radius_m, DEFAULT_RADIUS_M);
    }

    #[test]
    fn test_unparseable_coordinates_are_a_store_fault() {
        let mut row = sample_row();
        row.insert("latitude".into(), "north".into());
        assert!(Location::from_row(&row).is_err());
    }
}
