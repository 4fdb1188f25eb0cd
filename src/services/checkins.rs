//! Check-in admission engine
//!
//! The decision procedure accepting or rejecting a check-in attempt. Every
//! rejection is an expected outcome returned as a tagged error, never a
//! fault. The caller must hold the request lock for the whole call so the
//! capacity count and the commit are atomic relative to all other mutations.

use chrono::Utc;
use validator::Validate;

use crate::{
    error::{AppError, AppResult, ErrorCode},
    geo,
    models::{CheckIn, CheckInRequest, OverrideState},
    store::{next_id, RowStore},
};

/// Geofence tolerance: the configured radius is stretched by this factor to
/// absorb GPS imprecision. Observed product behavior; do not tighten or
/// loosen without product input.
const RADIUS_TOLERANCE: f64 = 1.5;

#[derive(Clone)]
pub struct CheckInService {
    store: RowStore,
}

impl CheckInService {
    pub fn new(store: RowStore) -> Self {
        Self { store }
    }

    /// Run the admission protocol and commit a check-in record on success.
    ///
    /// The checks run in a fixed order and each may short-circuit to a
    /// rejection: location existence, geofence, activity existence, manual
    /// override / time window, capacity. Nothing is written unless every
    /// gate passes.
    pub fn admit(&self, req: &CheckInRequest) -> AppResult<CheckIn> {
        req.validate()?;

        // 1. Location existence
        let location = self
            .store
            .locations
            .find(&req.location_id)?
            .ok_or_else(|| AppError::reject(ErrorCode::LocationNotFound, "ไม่พบสถานที่เช็คอิน"))?;

        // 2. Geofence
        let distance = geo::haversine_m(
            req.latitude,
            req.longitude,
            location.latitude,
            location.longitude,
        );
        let allowed = location.radius_m * RADIUS_TOLERANCE;
        if distance > allowed {
            return Err(AppError::reject(
                ErrorCode::OutOfRange,
                format!(
                    "คุณอยู่ห่างจากจุดเช็คอิน {:.0} เมตร (รัศมีที่อนุญาต {:.0} เมตร)",
                    distance.round(),
                    location.radius_m
                ),
            ));
        }

        // 3. Activity existence
        let activity = self
            .store
            .activities
            .find(&req.activity_id)?
            .ok_or_else(|| AppError::reject(ErrorCode::ActivityNotFound, "ไม่พบกิจกรรม"))?;

        // 4. Manual override, then the automatic time window
        let now = Utc::now();
        match activity.override_state {
            OverrideState::ForceClosed => {
                return Err(AppError::reject(
                    ErrorCode::AlreadyEnded,
                    "กิจกรรมปิดรับเช็คอินแล้ว",
                ));
            }
            OverrideState::ForceOpen => {}
            OverrideState::Auto => {
                if let Some(start) = activity.start_at {
                    if now < start {
                        return Err(AppError::reject(ErrorCode::NotStarted, "กิจกรรมยังไม่เริ่ม"));
                    }
                }
                if let Some(end) = activity.end_at {
                    if now > end {
                        return Err(AppError::reject(
                            ErrorCode::AlreadyEnded,
                            "กิจกรรมสิ้นสุดแล้ว",
                        ));
                    }
                }
            }
        }

        // 5. Capacity. Safe against double booking only because the caller
        //    holds the request lock across this count and the append below.
        if activity.capacity > 0 {
            let count = self.store.checkins.count_for_activity(&activity.id)?;
            if count >= activity.capacity as usize {
                return Err(AppError::reject(ErrorCode::ActivityFull, "กิจกรรมเต็มแล้ว"));
            }
        }

        // 6. Commit with a server-assigned timestamp.
        let record = CheckIn {
            id: next_id("CK"),
            user_id: req.user_id.clone(),
            activity_id: req.activity_id.clone(),
            location_id: req.location_id.clone(),
            checked_at: now,
            latitude: req.latitude,
            longitude: req.longitude,
            distance_m: distance.round(),
            photo_url: req.photo_url.clone(),
            comment: req.comment.clone(),
            survey_done: false,
        };
        self.store.checkins.append(&record)?;

        tracing::info!(
            checkin = %record.id,
            activity = %record.activity_id,
            user = %record.user_id,
            distance_m = record.distance_m,
            "check-in committed"
        );

        Ok(record)
    }

    pub fn list(&self) -> AppResult<Vec<CheckIn>> {
        self.store.checkins.list()
    }

    pub fn list_for_activity(&self, activity_id: &str) -> AppResult<Vec<CheckIn>> {
        self.store.checkins.list_for_activity(activity_id)
    }

    pub fn list_for_user(&self, user_id: &str) -> AppResult<Vec<CheckIn>> {
        self.store.checkins.list_for_user(user_id)
    }

    /// Mark the survey done on the actor's own check-in.
    pub fn set_survey_done(&self, checkin_id: &str, acting_user_id: &str) -> AppResult<()> {
        let record = self.store.checkins.get(checkin_id)?;
        if record.user_id != acting_user_id {
            return Err(AppError::Authorization(
                "Check-in belongs to another user".to_string(),
            ));
        }
        self.store.checkins.set_survey_done(checkin_id, true)
    }

    /// Admin-only log pruning.
    pub fn delete(&self, checkin_id: &str) -> AppResult<()> {
        self.store.checkins.delete(checkin_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lock::RequestLock;
    use crate::models::{Activity, Location};
    use chrono::Duration;
    use std::sync::Arc;

    // LOC-1 sits in central Bangkok with a 50 m radius, so the effective
    // allowed radius is 75 m.
    const LOC_LAT: f64 = 13.7563;
    const LOC_LNG: f64 = 100.5018;

    fn seeded_store() -> RowStore {
        let store = RowStore::in_memory();
        store
            .locations
            .insert(&Location {
                id: "LOC-1".into(),
                name: "Main Stage".into(),
                latitude: LOC_LAT,
                longitude: LOC_LNG,
                radius_m: 50.0,
                description: None,
                image_url: None,
                floor: None,
                room: None,
            })
            .unwrap();
        store
            .activities
            .insert(&Activity {
                id: "ACT-1".into(),
                location_id: "LOC-1".into(),
                name: "Opening Talk".into(),
                description: None,
                active: true,
                start_at: Some(Utc::now() - Duration::hours(1)),
                end_at: Some(Utc::now() + Duration::hours(1)),
                capacity: 2,
                override_state: OverrideState::Auto,
            })
            .unwrap();
        store
    }

    /// A request from roughly `offset_m` meters north of LOC-1.
    fn request_at(offset_m: f64) -> CheckInRequest {
        CheckInRequest {
            user_id: "USR-1".into(),
            activity_id: "ACT-1".into(),
            location_id: "LOC-1".into(),
            latitude: LOC_LAT + offset_m / 111_195.0,
            longitude: LOC_LNG,
            photo_url: None,
            comment: None,
        }
    }

    fn reject_code(err: AppError) -> ErrorCode {
        match err {
            AppError::Rejected { code, .. } => code,
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_admit_within_effective_radius() {
        let store = seeded_store();
        let service = CheckInService::new(store.clone());

        let record = service.admit(&request_at(30.0)).unwrap();
        assert_eq!(record.activity_id, "ACT-1");
        assert!(record.id.starts_with("CK-"));
        assert!((record.distance_m - 30.0).abs() <= 1.0);
        assert_eq!(store.checkins.count_for_activity("ACT-1").unwrap(), 1);
    }

    #[test]
    fn test_geofence_boundary() {
        let store = seeded_store();
        let service = CheckInService::new(store.clone());

        // Just inside 1.5 x 50 m.
        let inside = request_at(74.0);
        let d = geo::haversine_m(inside.latitude, inside.longitude, LOC_LAT, LOC_LNG);
        assert!(d <= 75.0);
        service.admit(&inside).unwrap();

        // Just beyond.
        let outside = request_at(76.0);
        let d = geo::haversine_m(outside.latitude, outside.longitude, LOC_LAT, LOC_LNG);
        assert!(d > 75.0);
        let err = service.admit(&outside).unwrap_err();
        assert_eq!(reject_code(err), ErrorCode::OutOfRange);

        // The rejection did not write anything.
        assert_eq!(store.checkins.count_for_activity("ACT-1").unwrap(), 1);
    }

    #[test]
    fn test_out_of_range_message_names_distance_and_radius() {
        let service = CheckInService::new(seeded_store());
        let err = service.admit(&request_at(200.0)).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("200"), "message was: {}", message);
        assert!(message.contains("50"), "message was: {}", message);
    }

    #[test]
    fn test_unknown_location_and_activity() {
        let service = CheckInService::new(seeded_store());

        let mut req = request_at(10.0);
        req.location_id = "LOC-404".into();
        assert_eq!(
            reject_code(service.admit(&req).unwrap_err()),
            ErrorCode::LocationNotFound
        );

        let mut req = request_at(10.0);
        req.activity_id = "ACT-404".into();
        assert_eq!(
            reject_code(service.admit(&req).unwrap_err()),
            ErrorCode::ActivityNotFound
        );
    }

    #[test]
    fn test_time_window() {
        let store = seeded_store();
        let service = CheckInService::new(store.clone());

        let mut activity = store.activities.get("ACT-1").unwrap();
        activity.start_at = Some(Utc::now() + Duration::hours(1));
        store.activities.update(&activity).unwrap();
        assert_eq!(
            reject_code(service.admit(&request_at(10.0)).unwrap_err()),
            ErrorCode::NotStarted
        );

        activity.start_at = Some(Utc::now() - Duration::hours(2));
        activity.end_at = Some(Utc::now() - Duration::hours(1));
        store.activities.update(&activity).unwrap();
        assert_eq!(
            reject_code(service.admit(&request_at(10.0)).unwrap_err()),
            ErrorCode::AlreadyEnded
        );
    }

    #[test]
    fn test_force_open_bypasses_window_but_not_capacity() {
        let store = seeded_store();
        let service = CheckInService::new(store.clone());

        let mut activity = store.activities.get("ACT-1").unwrap();
        activity.start_at = Some(Utc::now() + Duration::hours(1));
        activity.override_state = OverrideState::ForceOpen;
        activity.capacity = 1;
        store.activities.update(&activity).unwrap();

        service.admit(&request_at(10.0)).unwrap();
        assert_eq!(
            reject_code(service.admit(&request_at(10.0)).unwrap_err()),
            ErrorCode::ActivityFull
        );
    }

    #[test]
    fn test_force_closed_rejects_before_everything_else() {
        let store = seeded_store();
        let service = CheckInService::new(store.clone());

        let mut activity = store.activities.get("ACT-1").unwrap();
        activity.override_state = OverrideState::ForceClosed;
        store.activities.update(&activity).unwrap();

        assert_eq!(
            reject_code(service.admit(&request_at(10.0)).unwrap_err()),
            ErrorCode::AlreadyEnded
        );
        assert_eq!(store.checkins.count_for_activity("ACT-1").unwrap(), 0);
    }

    #[test]
    fn test_unlimited_capacity() {
        let store = seeded_store();
        let service = CheckInService::new(store.clone());

        let mut activity = store.activities.get("ACT-1").unwrap();
        activity.capacity = 0;
        store.activities.update(&activity).unwrap();

        for _ in 0..5 {
            service.admit(&request_at(10.0)).unwrap();
        }
        assert_eq!(store.checkins.count_for_activity("ACT-1").unwrap(), 5);
    }

    #[tokio::test]
    async fn test_capacity_exactness_under_concurrency() {
        // Capacity 2, three concurrent attempts racing through the request
        // lock: exactly two commit, the third is ACTIVITY_FULL.
        let store = seeded_store();
        let service = Arc::new(CheckInService::new(store.clone()));
        let lock = RequestLock::new(std::time::Duration::from_secs(5));

        let mut handles = Vec::new();
        for _ in 0..3 {
            let service = service.clone();
            let lock = lock.clone();
            handles.push(tokio::spawn(async move {
                let _guard = lock.acquire().await.unwrap();
                service.admit(&request_at(10.0))
            }));
        }

        let mut admitted = 0;
        let mut full = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => admitted += 1,
                Err(err) => {
                    assert_eq!(reject_code(err), ErrorCode::ActivityFull);
                    full += 1;
                }
            }
        }

        assert_eq!(admitted, 2);
        assert_eq!(full, 1);
        assert_eq!(store.checkins.count_for_activity("ACT-1").unwrap(), 2);
    }

    #[test]
    fn test_survey_flag_is_owner_only() {
        let store = seeded_store();
        let service = CheckInService::new(store.clone());

        let record = service.admit(&request_at(10.0)).unwrap();
        assert!(service.set_survey_done(&record.id, "USR-2").is_err());

        service.set_survey_done(&record.id, "USR-1").unwrap();
        let updated = store.checkins.get(&record.id).unwrap();
        assert!(updated.survey_done);
        // The rest of the record is untouched.
        assert_eq!(updated.checked_at, record.checked_at);
        assert_eq!(updated.distance_m, record.distance_m);
    }
}
