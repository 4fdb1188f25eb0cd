//! Activity model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::store::{cell, cell_bool, cell_opt, cell_time, cell_u32, Row};

/// Sheet columns for the activities table.
pub const COLUMNS: &[&str] = &[
    "id",
    "location_id",
    "name",
    "description",
    "active",
    "start_at",
    "end_at",
    "capacity",
    "override_state",
];

/// Admin-set override of an activity's automatic time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverrideState {
    /// Availability follows the start/end timestamps.
    Auto,
    /// Check-in allowed regardless of the time window. Capacity still applies.
    ForceOpen,
    /// Check-in rejected unconditionally.
    ForceClosed,
}

impl OverrideState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverrideState::Auto => "auto",
            OverrideState::ForceOpen => "force-open",
            OverrideState::ForceClosed => "force-closed",
        }
    }

    /// Lenient cell parse; anything unrecognized falls back to automatic.
    pub fn from_cell(value: &str) -> Self {
        match value {
            "force-open" => OverrideState::ForceOpen,
            "force-closed" => OverrideState::ForceClosed,
            _ => OverrideState::Auto,
        }
    }
}

/// An activity users check into, bounded by time, place and capacity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub location_id: String,
    pub name: String,
    pub description: Option<String>,
    pub active: bool,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    /// 0 means unlimited.
    pub capacity: u32,
    pub override_state: OverrideState,
}

impl Activity {
    pub fn from_row(row: &Row) -> Self {
        Self {
            id: cell(row, "id").to_string(),
            location_id: cell(row, "location_id").to_string(),
            name: cell(row, "name").to_string(),
            description: cell_opt(row, "description"),
            active: cell_bool(row, "active").unwrap_or(true),
            start_at: cell_time(row, "start_at"),
            end_at: cell_time(row, "end_at"),
            capacity: cell_u32(row, "capacity").unwrap_or(0),
            override_state: OverrideState::from_cell(cell(row, "override_state")),
        }
    }

    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("id".into(), self.id.clone());
        row.insert("location_id".into(), self.location_id.clone());
        row.insert("name".into(), self.name.clone());
        row.insert("description".into(), self.description.clone().unwrap_or_default());
        row.insert("active".into(), if self.active { "1" } else { "0" }.into());
        row.insert(
            "start_at".into(),
            self.start_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
        );
        row.insert(
            "end_at".into(),
            self.end_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
        );
        row.insert("capacity".into(), self.capacity.to_string());
        row.insert("override_state".into(), self.override_state.as_str().into());
        row
    }

    /// Whether the automatic time window admits check-ins at `now`.
    pub fn window_open(&self, now: DateTime<Utc>) -> bool {
        if let Some(start) = self.start_at {
            if now < start {
                return false;
            }
        }
        if let Some(end) = self.end_at {
            if now > end {
                return false;
            }
        }
        true
    }
}

/// Activity with derived state for display
#[derive(Debug, Clone, Serialize)]
pub struct ActivityDetails {
    #[serde(flatten)]
    pub activity: Activity,
    /// Number of committed check-ins referencing this activity.
    pub checked_in: usize,
    /// Whether an admission attempt right now would pass the override,
    /// time-window and capacity gates.
    pub open: bool,
}

impl ActivityDetails {
    pub fn derive(activity: Activity, checked_in: usize, now: DateTime<Utc>) -> Self {
        let capacity_ok =
            activity.capacity == 0 || checked_in < activity.capacity as usize;
        let open = match activity.override_state {
            OverrideState::ForceClosed => false,
            OverrideState::ForceOpen => capacity_ok,
            OverrideState::Auto => activity.window_open(now) && capacity_ok,
        };
        Self {
            activity,
            checked_in,
            open,
        }
    }
}

/// Create activity request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateActivity {
    pub location_id: String,
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    pub description: Option<String>,
    pub active: Option<bool>,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub capacity: Option<u32>,
}

/// Update activity request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateActivity {
    pub location_id: Option<String>,
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub active: Option<bool>,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub capacity: Option<u32>,
}
