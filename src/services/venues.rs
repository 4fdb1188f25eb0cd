//! Venue management service

use validator::Validate;

use crate::{
    error::AppResult,
    models::venue::{CreateVenue, UpdateVenue, Venue},
    store::{next_id, RowStore},
};

#[derive(Clone)]
pub struct VenuesService {
    store: RowStore,
}

impl VenuesService {
    pub fn new(store: RowStore) -> Self {
        Self { store }
    }

    pub fn list(&self) -> AppResult<Vec<Venue>> {
        self.store.venues.list()
    }

    pub fn create(&self, req: CreateVenue) -> AppResult<Venue> {
        req.validate()?;

        let venue = Venue {
            id: next_id("VEN"),
            name: req.name,
            description: req.description,
            image_url: req.image_url,
            sort_order: req.sort_order.unwrap_or(0),
        };
        self.store.venues.insert(&venue)?;
        Ok(venue)
    }

    pub fn update(&self, id: &str, req: UpdateVenue) -> AppResult<Venue> {
        req.validate()?;

        let mut venue = self.store.venues.get(id)?;
        if let Some(name) = req.name {
            venue.name = name;
        }
        if let Some(description) = req.description {
            venue.description = Some(description);
        }
        if let Some(image_url) = req.image_url {
            venue.image_url = Some(image_url);
        }
        if let Some(sort_order) = req.sort_order {
            venue.sort_order = sort_order;
        }
        self.store.venues.update(&venue)?;
        Ok(venue)
    }

    pub fn delete(&self, id: &str) -> AppResult<()> {
        self.store.venues.get(id)?;
        self.store.venues.delete(id)
    }
}
