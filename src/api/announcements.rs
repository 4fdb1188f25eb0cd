//! Announcement management actions

use serde_json::{json, Value};

use crate::{
    error::AppResult,
    models::announcement::{CreateAnnouncement, UpdateAnnouncement},
    models::UserClaims,
    AppState,
};

use super::{from_params, require_admin, IdOnly, Identified};

/// `getAnnouncements`
pub fn list(state: &AppState) -> AppResult<Value> {
    Ok(json!({ "announcements": state.services.announcements.list()? }))
}

/// `createAnnouncement`
pub fn create(state: &AppState, claims: Option<&UserClaims>, params: Value) -> AppResult<Value> {
    let claims = require_admin(claims)?;
    let req: CreateAnnouncement = from_params(params)?;
    let announcement = state
        .services
        .announcements
        .create(req, Some(claims.user_id.clone()))?;
    Ok(json!({ "announcement": announcement }))
}

/// `updateAnnouncement`
pub fn update(state: &AppState, claims: Option<&UserClaims>, params: Value) -> AppResult<Value> {
    require_admin(claims)?;
    let req: Identified<UpdateAnnouncement> = from_params(params)?;
    let announcement = state.services.announcements.update(&req.id, req.data)?;
    Ok(json!({ "announcement": announcement }))
}

/// `deleteAnnouncement`
pub fn delete(state: &AppState, claims: Option<&UserClaims>, params: Value) -> AppResult<Value> {
    require_admin(claims)?;
    let req: IdOnly = from_params(params)?;
    state.services.announcements.delete(&req.id)?;
    Ok(json!({}))
}
