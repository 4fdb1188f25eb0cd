//! Action-dispatch API
//!
//! The client speaks one endpoint: POST `/api` with `{action, ...fields}`.
//! The dispatcher classifies the action against the read-only allow-list,
//! takes the request lock for everything else, routes to the handler, and
//! shapes the response envelope. Business-level failures come back as
//! HTTP 200 with `{status:"error", code, message}`.

pub mod activities;
pub mod announcements;
pub mod auth;
pub mod checkins;
pub mod health;
pub mod locations;
pub mod users;
pub mod venues;

use std::collections::HashSet;

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap},
    routing::{get, post},
    Json, Router,
};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::{AppError, AppResult},
    models::UserClaims,
    AppState,
};

/// Actions that never write to the store. They bypass the request lock and
/// run with unbounded concurrency.
///
/// This list is part of the external contract: a new read action missing
/// here still works, it just serializes behind the write lock for nothing.
static READ_ONLY_ACTIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "login",
        "checkUser",
        "getInitData",
        "getLocations",
        "getActivities",
        "getCheckIns",
        "getAnnouncements",
        "getVenues",
        "getUsers",
    ])
});

/// Request envelope: an action name plus action-specific fields.
#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    pub action: String,
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/api", post(dispatch))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Dispatch one action to its handler.
pub async fn dispatch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ActionRequest>,
) -> AppResult<Json<Value>> {
    let claims = bearer_claims(&state, &headers)?;
    let action = req.action.as_str();
    let params = Value::Object(req.params);

    tracing::debug!(
        action,
        read_only = READ_ONLY_ACTIONS.contains(action),
        "dispatching action"
    );

    let payload = if READ_ONLY_ACTIONS.contains(action) {
        route_action(&state, claims.as_ref(), action, params)?
    } else {
        // Held until the handler returns, on every path out.
        let _guard = state.lock.acquire().await?;
        route_action(&state, claims.as_ref(), action, params)?
    };

    Ok(Json(envelope(payload)))
}

fn route_action(
    state: &AppState,
    claims: Option<&UserClaims>,
    action: &str,
    params: Value,
) -> AppResult<Value> {
    match action {
        // Auth
        "login" => auth::login(state, params),
        "checkUser" => auth::check_user(state, params),
        "getInitData" => get_init_data(state),
        // Check-ins
        "checkIn" => checkins::check_in(state, params),
        "getCheckIns" => checkins::list(state, params),
        "updateSurveyStatus" => checkins::update_survey_status(state, claims, params),
        "deleteCheckIn" => checkins::delete(state, claims, params),
        // Locations
        "getLocations" => locations::list(state),
        "createLocation" => locations::create(state, claims, params),
        "updateLocation" => locations::update(state, claims, params),
        "deleteLocation" => locations::delete(state, claims, params),
        // Activities
        "getActivities" => activities::list(state),
        "createActivity" => activities::create(state, claims, params),
        "updateActivity" => activities::update(state, claims, params),
        "deleteActivity" => activities::delete(state, claims, params),
        "setActivityOverride" => activities::set_override(state, claims, params),
        // Users
        "getUsers" => users::list(state, claims),
        "createUser" => users::create(state, claims, params),
        "updateUser" => users::update(state, claims, params),
        "deleteUser" => users::delete(state, claims, params),
        // Announcements
        "getAnnouncements" => announcements::list(state),
        "createAnnouncement" => announcements::create(state, claims, params),
        "updateAnnouncement" => announcements::update(state, claims, params),
        "deleteAnnouncement" => announcements::delete(state, claims, params),
        // Venues
        "getVenues" => venues::list(state),
        "createVenue" => venues::create(state, claims, params),
        "updateVenue" => venues::update(state, claims, params),
        "deleteVenue" => venues::delete(state, claims, params),
        _ => Err(AppError::UnknownAction(action.to_string())),
    }
}

/// One-shot bootstrap payload for the client.
fn get_init_data(state: &AppState) -> AppResult<Value> {
    Ok(json!({
        "locations": state.services.locations.list()?,
        "activities": state.services.activities.list()?,
        "announcements": state.services.announcements.list()?,
        "venues": state.services.venues.list()?,
    }))
}

/// Wrap a handler payload in the success envelope.
fn envelope(payload: Value) -> Value {
    let mut object = match payload {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("data".to_string(), other);
            map
        }
    };
    object.insert("status".to_string(), json!("success"));
    Value::Object(object)
}

/// Parse the bearer token, if one was sent.
fn bearer_claims(state: &AppState, headers: &HeaderMap) -> AppResult<Option<UserClaims>> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| AppError::Authentication("Invalid authorization header".to_string()))?;
    let token = value.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Authentication("Invalid authorization header format".to_string())
    })?;
    let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
        .map_err(|e| AppError::Authentication(e.to_string()))?;
    Ok(Some(claims))
}

pub(crate) fn require_admin<'a>(claims: Option<&'a UserClaims>) -> AppResult<&'a UserClaims> {
    let claims =
        claims.ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;
    claims.require_admin()?;
    Ok(claims)
}

pub(crate) fn require_user<'a>(claims: Option<&'a UserClaims>) -> AppResult<&'a UserClaims> {
    claims.ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))
}

/// Deserialize action params into a typed request.
pub(crate) fn from_params<T: DeserializeOwned>(params: Value) -> AppResult<T> {
    serde_json::from_value(params).map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Params carrying a target id plus a partial update body.
#[derive(Debug, Deserialize)]
pub(crate) struct Identified<T> {
    pub id: String,
    #[serde(flatten)]
    pub data: T,
}

/// Params carrying only a target id.
#[derive(Debug, Deserialize)]
pub(crate) struct IdOnly {
    pub id: String,
}
