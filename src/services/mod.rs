//! Business logic services

pub mod activities;
pub mod announcements;
pub mod checkins;
pub mod locations;
pub mod users;
pub mod venues;

use crate::{config::AuthConfig, store::RowStore};

/// Container for all services
pub struct Services {
    pub locations: locations::LocationsService,
    pub activities: activities::ActivitiesService,
    pub checkins: checkins::CheckInService,
    pub users: users::UsersService,
    pub announcements: announcements::AnnouncementsService,
    pub venues: venues::VenuesService,
}

impl Services {
    /// Create all services backed by the given row store
    pub fn new(store: RowStore, auth_config: AuthConfig) -> Self {
        Self {
            locations: locations::LocationsService::new(store.clone()),
            activities: activities::ActivitiesService::new(store.clone()),
            checkins: checkins::CheckInService::new(store.clone()),
            users: users::UsersService::new(store.clone(), auth_config),
            announcements: announcements::AnnouncementsService::new(store.clone()),
            venues: venues::VenuesService::new(store),
        }
    }
}
