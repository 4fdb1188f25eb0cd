//! Venue management actions

use serde_json::{json, Value};

use crate::{
    error::AppResult,
    models::venue::{CreateVenue, UpdateVenue},
    models::UserClaims,
    AppState,
};

use super::{from_params, require_admin, IdOnly, Identified};

/// `getVenues`
pub fn list(state: &AppState) -> AppResult<Value> {
    Ok(json!({ "venues": state.services.venues.list()? }))
}

/// `createVenue`
pub fn create(state: &AppState, claims: Option<&UserClaims>, params: Value) -> AppResult<Value> {
    require_admin(claims)?;
    let req: CreateVenue = from_params(params)?;
    let venue = state.services.venues.create(req)?;
    Ok(json!({ "venue": venue }))
}

/// `updateVenue`
pub fn update(state: &AppState, claims: Option<&UserClaims>, params: Value) -> AppResult<Value> {
    require_admin(claims)?;
    let req: Identified<UpdateVenue> = from_params(params)?;
    let venue = state.services.venues.update(&req.id, req.data)?;
    Ok(json!({ "venue": venue }))
}

/// `deleteVenue`
pub fn delete(state: &AppState, claims: Option<&UserClaims>, params: Value) -> AppResult<Value> {
    require_admin(claims)?;
    let req: IdOnly = from_params(params)?;
    state.services.venues.delete(&req.id)?;
    Ok(json!({}))
}
