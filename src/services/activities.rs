//! Activity management service

use chrono::Utc;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::activity::{
        Activity, ActivityDetails, CreateActivity, OverrideState, UpdateActivity,
    },
    store::{next_id, RowStore},
};

#[derive(Clone)]
pub struct ActivitiesService {
    store: RowStore,
}

impl ActivitiesService {
    pub fn new(store: RowStore) -> Self {
        Self { store }
    }

    /// List activities with their derived check-in counts and open flags.
    pub fn list(&self) -> AppResult<Vec<ActivityDetails>> {
        let now = Utc::now();
        self.store
            .activities
            .list()?
            .into_iter()
            .map(|activity| {
                let count = self.store.checkins.count_for_activity(&activity.id)?;
                Ok(ActivityDetails::derive(activity, count, now))
            })
            .collect()
    }

    pub fn get(&self, id: &str) -> AppResult<ActivityDetails> {
        let activity = self.store.activities.get(id)?;
        let count = self.store.checkins.count_for_activity(id)?;
        Ok(ActivityDetails::derive(activity, count, Utc::now()))
    }

    pub fn create(&self, req: CreateActivity) -> AppResult<Activity> {
        req.validate()?;
        // The store has no foreign keys; the reference is checked here.
        self.store.locations.get(&req.location_id)?;

        let activity = Activity {
            id: next_id("ACT"),
            location_id: req.location_id,
            name: req.name,
            description: req.description,
            active: req.active.unwrap_or(true),
            start_at: req.start_at,
            end_at: req.end_at,
            capacity: req.capacity.unwrap_or(0),
            override_state: OverrideState::Auto,
        };
        self.store.activities.insert(&activity)?;
        Ok(activity)
    }

    pub fn update(&self, id: &str, req: UpdateActivity) -> AppResult<Activity> {
        req.validate()?;

        let mut activity = self.store.activities.get(id)?;
        if let Some(location_id) = req.location_id {
            self.store.locations.get(&location_id)?;
            activity.location_id = location_id;
        }
        if let Some(name) = req.name {
            activity.name = name;
        }
        if let Some(description) = req.description {
            activity.description = Some(description);
        }
        if let Some(active) = req.active {
            activity.active = active;
        }
        if let Some(start_at) = req.start_at {
            activity.start_at = Some(start_at);
        }
        if let Some(end_at) = req.end_at {
            activity.end_at = Some(end_at);
        }
        if let Some(capacity) = req.capacity {
            activity.capacity = capacity;
        }

        self.store.activities.update(&activity)?;
        Ok(activity)
    }

    /// Admin read-modify-write of the manual override flag.
    pub fn set_override(&self, id: &str, state: OverrideState) -> AppResult<Activity> {
        let mut activity = self.store.activities.get(id)?;
        activity.override_state = state;
        self.store.activities.update(&activity)?;
        tracing::info!(activity = %id, state = state.as_str(), "override changed");
        Ok(activity)
    }

    pub fn delete(&self, id: &str) -> AppResult<()> {
        self.store.activities.get(id)?;
        self.store.activities.delete(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Location;

    fn seeded() -> (ActivitiesService, RowStore) {
        let store = RowStore::in_memory();
        store
            .locations
            .insert(&Location {
                id: "LOC-1".into(),
                name: "Hall".into(),
                latitude: 13.7563,
                longitude: 100.5018,
                radius_m: 50.0,
                description: None,
                image_url: None,
                floor: None,
                room: None,
            })
            .unwrap();
        (ActivitiesService::new(store.clone()), store)
    }

    fn create_req() -> CreateActivity {
        CreateActivity {
            location_id: "LOC-1".into(),
            name: "Workshop".into(),
            description: None,
            active: None,
            start_at: None,
            end_at: None,
            capacity: Some(10),
        }
    }

    #[test]
    fn test_create_requires_existing_location() {
        let (service, _) = seeded();
        let mut req = create_req();
        req.location_id = "LOC-404".into();
        assert!(matches!(
            service.create(req).unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[test]
    fn test_list_carries_derived_state() {
        let (service, _) = seeded();
        let activity = service.create(create_req()).unwrap();

        let details = service.list().unwrap();
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].activity.id, activity.id);
        assert_eq!(details[0].checked_in, 0);
        assert!(details[0].open);
    }

    #[test]
    fn test_set_override() {
        let (service, store) = seeded();
        let activity = service.create(create_req()).unwrap();

        service
            .set_override(&activity.id, OverrideState::ForceClosed)
            .unwrap();
        assert_eq!(
            store.activities.get(&activity.id).unwrap().override_state,
            OverrideState::ForceClosed
        );
        assert!(!service.get(&activity.id).unwrap().open);
    }
}
