//! Venue model (map/landing entries shown on the client home screen)

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::store::{cell, cell_opt, cell_u32, Row};

/// Sheet columns for the venues table.
pub const COLUMNS: &[&str] = &["id", "name", "description", "image_url", "sort_order"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Venue {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub sort_order: u32,
}

impl Venue {
    pub fn from_row(row: &Row) -> Self {
        Self {
            id: cell(row, "id").to_string(),
            name: cell(row, "name").to_string(),
            description: cell_opt(row, "description"),
            image_url: cell_opt(row, "image_url"),
            sort_order: cell_u32(row, "sort_order").unwrap_or(0),
        }
    }

    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("id".into(), self.id.clone());
        row.insert("name".into(), self.name.clone());
        row.insert("description".into(), self.description.clone().unwrap_or_default());
        row.insert("image_url".into(), self.image_url.clone().unwrap_or_default());
        row.insert("sort_order".into(), self.sort_order.to_string());
        row
    }
}

/// Create venue request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVenue {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub sort_order: Option<u32>,
}

/// Update venue request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateVenue {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub sort_order: Option<u32>,
}
