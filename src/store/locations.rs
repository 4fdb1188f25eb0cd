//! Locations sheet adapter

use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::Location;

use super::StoreInner;

pub(crate) const SHEET: &str = "locations";

#[derive(Clone)]
pub struct LocationsStore {
    inner: Arc<StoreInner>,
}

impl LocationsStore {
    pub(crate) fn new(inner: Arc<StoreInner>) -> Self {
        Self { inner }
    }

    pub fn list(&self) -> AppResult<Vec<Location>> {
        self.inner
            .find_all(SHEET)?
            .iter()
            .map(Location::from_row)
            .collect()
    }

    pub fn find(&self, id: &str) -> AppResult<Option<Location>> {
        self.inner
            .find_by_id(SHEET, "id", id)?
            .map(|row| Location::from_row(&row))
            .transpose()
    }

    pub fn get(&self, id: &str) -> AppResult<Location> {
        self.find(id)?
            .ok_or_else(|| AppError::NotFound(format!("Location {} not found", id)))
    }

    pub fn insert(&self, location: &Location) -> AppResult<()> {
        self.inner.append(SHEET, &location.to_row())
    }

    pub fn update(&self, location: &Location) -> AppResult<()> {
        self.inner
            .update_by_id(SHEET, "id", &location.id, &location.to_row())
    }

    pub fn delete(&self, id: &str) -> AppResult<()> {
        self.inner.delete_by_id(SHEET, "id", id)
    }
}
