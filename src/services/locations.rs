//! Location management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::location::{CreateLocation, Location, UpdateLocation, DEFAULT_RADIUS_M},
    store::{next_id, RowStore},
};

#[derive(Clone)]
pub struct LocationsService {
    store: RowStore,
}

impl LocationsService {
    pub fn new(store: RowStore) -> Self {
        Self { store }
    }

    pub fn list(&self) -> AppResult<Vec<Location>> {
        self.store.locations.list()
    }

    pub fn get(&self, id: &str) -> AppResult<Location> {
        self.store.locations.get(id)
    }

    pub fn create(&self, req: CreateLocation) -> AppResult<Location> {
        req.validate()?;

        let location = Location {
            id: next_id("LOC"),
            name: req.name,
            latitude: req.latitude,
            longitude: req.longitude,
            radius_m: req.radius_m.unwrap_or(DEFAULT_RADIUS_M),
            description: req.description,
            image_url: req.image_url,
            floor: req.floor,
            room: req.room,
        };
        self.store.locations.insert(&location)?;
        Ok(location)
    }

    pub fn update(&self, id: &str, req: UpdateLocation) -> AppResult<Location> {
        req.validate()?;

        let mut location = self.store.locations.get(id)?;
        if let Some(name) = req.name {
            location.name = name;
        }
        if let Some(latitude) = req.latitude {
            location.latitude = latitude;
        }
        if let Some(longitude) = req.longitude {
            location.longitude = longitude;
        }
        if let Some(radius_m) = req.radius_m {
            location.radius_m = radius_m;
        }
        if let Some(description) = req.description {
            location.description = Some(description);
        }
        if let Some(image_url) = req.image_url {
            location.image_url = Some(image_url);
        }
        if let Some(floor) = req.floor {
            location.floor = Some(floor);
        }
        if let Some(room) = req.room {
            location.room = Some(room);
        }

        self.store.locations.update(&location)?;
        Ok(location)
    }

    /// Delete a location. Blocked while any activity still references it;
    /// the store itself enforces no foreign keys.
    pub fn delete(&self, id: &str) -> AppResult<()> {
        self.store.locations.get(id)?;
        if self.store.activities.any_at_location(id)? {
            return Err(AppError::Conflict(
                "Location is still referenced by activities".to_string(),
            ));
        }
        self.store.locations.delete(id)
    }
}
