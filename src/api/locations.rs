//! Location management actions

use serde_json::{json, Value};

use crate::{
    error::AppResult,
    models::location::{CreateLocation, UpdateLocation},
    models::UserClaims,
    AppState,
};

use super::{from_params, require_admin, IdOnly, Identified};

/// `getLocations`
pub fn list(state: &AppState) -> AppResult<Value> {
    Ok(json!({ "locations": state.services.locations.list()? }))
}

/// `createLocation`
pub fn create(state: &AppState, claims: Option<&UserClaims>, params: Value) -> AppResult<Value> {
    require_admin(claims)?;
    let req: CreateLocation = from_params(params)?;
    let location = state.services.locations.create(req)?;
    Ok(json!({ "location": location }))
}

/// `updateLocation`
pub fn update(state: &AppState, claims: Option<&UserClaims>, params: Value) -> AppResult<Value> {
    require_admin(claims)?;
    let req: Identified<UpdateLocation> = from_params(params)?;
    let location = state.services.locations.update(&req.id, req.data)?;
    Ok(json!({ "location": location }))
}

/// `deleteLocation` — refused while activities still reference the location.
pub fn delete(state: &AppState, claims: Option<&UserClaims>, params: Value) -> AppResult<Value> {
    require_admin(claims)?;
    let req: IdOnly = from_params(params)?;
    state.services.locations.delete(&req.id)?;
    Ok(json!({}))
}
