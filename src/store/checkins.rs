//! Check-ins sheet adapter

use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::CheckIn;
use crate::store::{cell, Row};

use super::StoreInner;

pub(crate) const SHEET: &str = "checkins";

#[derive(Clone)]
pub struct CheckInsStore {
    inner: Arc<StoreInner>,
}

impl CheckInsStore {
    pub(crate) fn new(inner: Arc<StoreInner>) -> Self {
        Self { inner }
    }

    pub fn list(&self) -> AppResult<Vec<CheckIn>> {
        self.inner
            .find_all(SHEET)?
            .iter()
            .map(CheckIn::from_row)
            .collect()
    }

    pub fn list_for_activity(&self, activity_id: &str) -> AppResult<Vec<CheckIn>> {
        self.inner
            .find_all(SHEET)?
            .iter()
            .filter(|row| cell(row, "activity_id") == activity_id)
            .map(CheckIn::from_row)
            .collect()
    }

    pub fn list_for_user(&self, user_id: &str) -> AppResult<Vec<CheckIn>> {
        self.inner
            .find_all(SHEET)?
            .iter()
            .filter(|row| cell(row, "user_id") == user_id)
            .map(CheckIn::from_row)
            .collect()
    }

    /// Current committed count for an activity; the capacity gate reads this
    /// under the request lock.
    pub fn count_for_activity(&self, activity_id: &str) -> AppResult<usize> {
        Ok(self
            .inner
            .find_all(SHEET)?
            .iter()
            .filter(|row| cell(row, "activity_id") == activity_id)
            .count())
    }

    pub fn find(&self, id: &str) -> AppResult<Option<CheckIn>> {
        self.inner
            .find_by_id(SHEET, "id", id)?
            .map(|row| CheckIn::from_row(&row))
            .transpose()
    }

    pub fn get(&self, id: &str) -> AppResult<CheckIn> {
        self.find(id)?
            .ok_or_else(|| AppError::NotFound(format!("Check-in {} not found", id)))
    }

    pub fn append(&self, record: &CheckIn) -> AppResult<()> {
        self.inner.append(SHEET, &record.to_row())
    }

    /// The one permitted post-commit mutation: the survey flag.
    pub fn set_survey_done(&self, id: &str, done: bool) -> AppResult<()> {
        let mut patch = Row::new();
        patch.insert("survey_done".into(), if done { "1" } else { "0" }.into());
        self.inner.update_by_id(SHEET, "id", id, &patch)
    }

    pub fn delete(&self, id: &str) -> AppResult<()> {
        self.inner.delete_by_id(SHEET, "id", id)
    }
}
