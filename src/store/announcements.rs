//! Announcements sheet adapter

use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::Announcement;

use super::StoreInner;

pub(crate) const SHEET: &str = "announcements";

#[derive(Clone)]
pub struct AnnouncementsStore {
    inner: Arc<StoreInner>,
}

impl AnnouncementsStore {
    pub(crate) fn new(inner: Arc<StoreInner>) -> Self {
        Self { inner }
    }

    pub fn list(&self) -> AppResult<Vec<Announcement>> {
        self.inner
            .find_all(SHEET)?
            .iter()
            .map(Announcement::from_row)
            .collect()
    }

    pub fn get(&self, id: &str) -> AppResult<Announcement> {
        self.inner
            .find_by_id(SHEET, "id", id)?
            .map(|row| Announcement::from_row(&row))
            .transpose()?
            .ok_or_else(|| AppError::NotFound(format!("Announcement {} not found", id)))
    }

    pub fn insert(&self, announcement: &Announcement) -> AppResult<()> {
        self.inner.append(SHEET, &announcement.to_row())
    }

    pub fn update(&self, announcement: &Announcement) -> AppResult<()> {
        self.inner
            .update_by_id(SHEET, "id", &announcement.id, &announcement.to_row())
    }

    pub fn delete(&self, id: &str) -> AppResult<()> {
        self.inner.delete_by_id(SHEET, "id", id)
    }
}
