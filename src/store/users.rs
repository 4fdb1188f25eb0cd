//! Users sheet adapter

use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::store::cell;

use super::StoreInner;

pub(crate) const SHEET: &str = "users";

#[derive(Clone)]
pub struct UsersStore {
    inner: Arc<StoreInner>,
}

impl UsersStore {
    pub(crate) fn new(inner: Arc<StoreInner>) -> Self {
        Self { inner }
    }

    pub fn list(&self) -> AppResult<Vec<User>> {
        Ok(self
            .inner
            .find_all(SHEET)?
            .iter()
            .map(User::from_row)
            .collect())
    }

    pub fn find(&self, id: &str) -> AppResult<Option<User>> {
        Ok(self
            .inner
            .find_by_id(SHEET, "id", id)?
            .map(|row| User::from_row(&row)))
    }

    pub fn get(&self, id: &str) -> AppResult<User> {
        self.find(id)?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    pub fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self
            .inner
            .find_all(SHEET)?
            .iter()
            .find(|row| cell(row, "username") == username)
            .map(User::from_row))
    }

    pub fn insert(&self, user: &User) -> AppResult<()> {
        self.inner.append(SHEET, &user.to_row())
    }

    pub fn update(&self, user: &User) -> AppResult<()> {
        self.inner.update_by_id(SHEET, "id", &user.id, &user.to_row())
    }

    pub fn delete(&self, id: &str) -> AppResult<()> {
        self.inner.delete_by_id(SHEET, "id", id)
    }
}
