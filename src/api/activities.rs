//! Activity management actions

use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    models::activity::{CreateActivity, OverrideState, UpdateActivity},
    models::UserClaims,
    AppState,
};

use super::{from_params, require_admin, IdOnly, Identified};

#[derive(Debug, Deserialize)]
pub struct OverrideRequest {
    pub id: String,
    pub state: OverrideState,
}

/// `getActivities` — activities with derived counts and open flags.
pub fn list(state: &AppState) -> AppResult<Value> {
    Ok(json!({ "activities": state.services.activities.list()? }))
}

/// `createActivity`
pub fn create(state: &AppState, claims: Option<&UserClaims>, params: Value) -> AppResult<Value> {
    require_admin(claims)?;
    let req: CreateActivity = from_params(params)?;
    let activity = state.services.activities.create(req)?;
    Ok(json!({ "activity": activity }))
}

/// `updateActivity`
pub fn update(state: &AppState, claims: Option<&UserClaims>, params: Value) -> AppResult<Value> {
    require_admin(claims)?;
    let req: Identified<UpdateActivity> = from_params(params)?;
    let activity = state.services.activities.update(&req.id, req.data)?;
    Ok(json!({ "activity": activity }))
}

/// `deleteActivity`
pub fn delete(state: &AppState, claims: Option<&UserClaims>, params: Value) -> AppResult<Value> {
    require_admin(claims)?;
    let req: IdOnly = from_params(params)?;
    state.services.activities.delete(&req.id)?;
    Ok(json!({}))
}

/// `setActivityOverride` — force an activity open or closed, or hand it
/// back to its time window.
pub fn set_override(state: &AppState, claims: Option<&UserClaims>, params: Value) -> AppResult<Value> {
    require_admin(claims)?;
    let req: OverrideRequest = from_params(params)?;
    let activity = state.services.activities.set_override(&req.id, req.state)?;
    Ok(json!({ "activity": activity }))
}
