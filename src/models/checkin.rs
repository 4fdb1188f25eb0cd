//! Check-in (admission record) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::store::{cell, cell_bool, cell_f64, cell_opt, cell_time, Row};

/// Sheet columns for the checkins table.
pub const COLUMNS: &[&str] = &[
    "id",
    "user_id",
    "activity_id",
    "location_id",
    "checked_at",
    "latitude",
    "longitude",
    "distance_m",
    "photo_url",
    "comment",
    "survey_done",
];

/// One committed admission. Immutable after commit except for the survey
/// flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckIn {
    pub id: String,
    pub user_id: String,
    pub activity_id: String,
    pub location_id: String,
    /// Server-assigned at commit time; client clocks are never trusted.
    pub checked_at: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    /// Rounded distance from the location at check-in time.
    pub distance_m: f64,
    pub photo_url: Option<String>,
    pub comment: Option<String>,
    pub survey_done: bool,
}

impl CheckIn {
    pub fn from_row(row: &Row) -> AppResult<Self> {
        let id = cell(row, "id").to_string();
        let checked_at = cell_time(row, "checked_at")
            .ok_or_else(|| AppError::Store(format!("checkin {}: bad timestamp", id)))?;

        Ok(Self {
            id,
            user_id: cell(row, "user_id").to_string(),
            activity_id: cell(row, "activity_id").to_string(),
            location_id: cell(row, "location_id").to_string(),
            checked_at,
            latitude: cell_f64(row, "latitude").unwrap_or(f64::NAN),
            longitude: cell_f64(row, "longitude").unwrap_or(f64::NAN),
            distance_m: cell_f64(row, "distance_m").unwrap_or(0.0),
            photo_url: cell_opt(row, "photo_url"),
            comment: cell_opt(row, "comment"),
            survey_done: cell_bool(row, "survey_done").unwrap_or(false),
        })
    }

    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("id".into(), self.id.clone());
        row.insert("user_id".into(), self.user_id.clone());
        row.insert("activity_id".into(), self.activity_id.clone());
        row.insert("location_id".into(), self.location_id.clone());
        row.insert("checked_at".into(), self.checked_at.to_rfc3339());
        row.insert("latitude".into(), self.latitude.to_string());
        row.insert("longitude".into(), self.longitude.to_string());
        row.insert("distance_m".into(), self.distance_m.to_string());
        row.insert("photo_url".into(), self.photo_url.clone().unwrap_or_default());
        row.insert("comment".into(), self.comment.clone().unwrap_or_default());
        row.insert("survey_done".into(), if self.survey_done { "1" } else { "0" }.into());
        row
    }
}

/// Check-in request as submitted by the client.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CheckInRequest {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "activityId")]
    pub activity_id: String,
    #[serde(rename = "locationId")]
    pub location_id: String,
    #[serde(rename = "userLat")]
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude out of range"))]
    pub latitude: f64,
    #[serde(rename = "userLng")]
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude out of range"))]
    pub longitude: f64,
    #[serde(rename = "photoUrl")]
    pub photo_url: Option<String>,
    pub comment: Option<String>,
}
