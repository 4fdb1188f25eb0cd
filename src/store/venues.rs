//! Venues sheet adapter

use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::Venue;

use super::StoreInner;

pub(crate) const SHEET: &str = "venues";

#[derive(Clone)]
pub struct VenuesStore {
    inner: Arc<StoreInner>,
}

impl VenuesStore {
    pub(crate) fn new(inner: Arc<StoreInner>) -> Self {
        Self { inner }
    }

    pub fn list(&self) -> AppResult<Vec<Venue>> {
        let mut venues: Vec<Venue> = self
            .inner
            .find_all(SHEET)?
            .iter()
            .map(Venue::from_row)
            .collect();
        venues.sort_by_key(|v| v.sort_order);
        Ok(venues)
    }

    pub fn get(&self, id: &str) -> AppResult<Venue> {
        self.inner
            .find_by_id(SHEET, "id", id)?
            .map(|row| Venue::from_row(&row))
            .ok_or_else(|| AppError::NotFound(format!("Venue {} not found", id)))
    }

    pub fn insert(&self, venue: &Venue) -> AppResult<()> {
        self.inner.append(SHEET, &venue.to_row())
    }

    pub fn update(&self, venue: &Venue) -> AppResult<()> {
        self.inner.update_by_id(SHEET, "id", &venue.id, &venue.to_row())
    }

    pub fn delete(&self, id: &str) -> AppResult<()> {
        self.inner.delete_by_id(SHEET, "id", id)
    }
}
