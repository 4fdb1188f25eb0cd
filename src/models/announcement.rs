//! Announcement model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::store::{cell, cell_opt, cell_time, Row};

/// Sheet columns for the announcements table.
pub const COLUMNS: &[&str] = &["id", "title", "body", "author_id", "created_at"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcement {
    pub id: String,
    pub title: String,
    pub body: String,
    pub author_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Announcement {
    pub fn from_row(row: &Row) -> AppResult<Self> {
        let id = cell(row, "id").to_string();
        let created_at = cell_time(row, "created_at")
            .ok_or_else(|| AppError::Store(format!("announcement {}: bad timestamp", id)))?;
        Ok(Self {
            id,
            title: cell(row, "title").to_string(),
            body: cell(row, "body").to_string(),
            author_id: cell_opt(row, "author_id"),
            created_at,
        })
    }

    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("id".into(), self.id.clone());
        row.insert("title".into(), self.title.clone());
        row.insert("body".into(), self.body.clone());
        row.insert("author_id".into(), self.author_id.clone().unwrap_or_default());
        row.insert("created_at".into(), self.created_at.to_rfc3339());
        row
    }
}

/// Create announcement request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAnnouncement {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    pub body: Option<String>,
}

/// Update announcement request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAnnouncement {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: Option<String>,
    pub body: Option<String>,
}
