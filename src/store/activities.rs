//! Activities sheet adapter

use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::Activity;
use crate::store::cell;

use super::StoreInner;

pub(crate) const SHEET: &str = "activities";

#[derive(Clone)]
pub struct ActivitiesStore {
    inner: Arc<StoreInner>,
}

impl ActivitiesStore {
    pub(crate) fn new(inner: Arc<StoreInner>) -> Self {
        Self { inner }
    }

    pub fn list(&self) -> AppResult<Vec<Activity>> {
        Ok(self
            .inner
            .find_all(SHEET)?
            .iter()
            .map(Activity::from_row)
            .collect())
    }

    pub fn find(&self, id: &str) -> AppResult<Option<Activity>> {
        Ok(self
            .inner
            .find_by_id(SHEET, "id", id)?
            .map(|row| Activity::from_row(&row)))
    }

    pub fn get(&self, id: &str) -> AppResult<Activity> {
        self.find(id)?
            .ok_or_else(|| AppError::NotFound(format!("Activity {} not found", id)))
    }

    /// Whether any activity still references the given location.
    pub fn any_at_location(&self, location_id: &str) -> AppResult<bool> {
        Ok(self
            .inner
            .find_all(SHEET)?
            .iter()
            .any(|row| cell(row, "location_id") == location_id))
    }

    pub fn insert(&self, activity: &Activity) -> AppResult<()> {
        self.inner.append(SHEET, &activity.to_row())
    }

    pub fn update(&self, activity: &Activity) -> AppResult<()> {
        self.inner
            .update_by_id(SHEET, "id", &activity.id, &activity.to_row())
    }

    pub fn delete(&self, id: &str) -> AppResult<()> {
        self.inner.delete_by_id(SHEET, "id", id)
    }
}
