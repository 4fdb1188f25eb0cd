//! Announcement management service

use chrono::Utc;
use validator::Validate;

use crate::{
    error::AppResult,
    models::announcement::{Announcement, CreateAnnouncement, UpdateAnnouncement},
    store::{next_id, RowStore},
};

#[derive(Clone)]
pub struct AnnouncementsService {
    store: RowStore,
}

impl AnnouncementsService {
    pub fn new(store: RowStore) -> Self {
        Self { store }
    }

    pub fn list(&self) -> AppResult<Vec<Announcement>> {
        let mut items = self.store.announcements.list()?;
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    pub fn create(&self, req: CreateAnnouncement, author_id: Option<String>) -> AppResult<Announcement> {
        req.validate()?;

        let announcement = Announcement {
            id: next_id("ANN"),
            title: req.title,
            body: req.body.unwrap_or_default(),
            author_id,
            created_at: Utc::now(),
        };
        self.store.announcements.insert(&announcement)?;
        Ok(announcement)
    }

    pub fn update(&self, id: &str, req: UpdateAnnouncement) -> AppResult<Announcement> {
        req.validate()?;

        let mut announcement = self.store.announcements.get(id)?;
        if let Some(title) = req.title {
            announcement.title = title;
        }
        if let Some(body) = req.body {
            announcement.body = body;
        }
        self.store.announcements.update(&announcement)?;
        Ok(announcement)
    }

    pub fn delete(&self, id: &str) -> AppResult<()> {
        self.store.announcements.get(id)?;
        self.store.announcements.delete(id)
    }
}
