//! User management actions

use serde_json::{json, Value};

use crate::{
    error::AppResult,
    models::user::{CreateUser, UpdateUser, UserClaims},
    AppState,
};

use super::{from_params, require_admin, IdOnly, Identified};

/// `getUsers`
pub fn list(state: &AppState, claims: Option<&UserClaims>) -> AppResult<Value> {
    require_admin(claims)?;
    Ok(json!({ "users": state.services.users.list()? }))
}

/// `createUser`
pub fn create(state: &AppState, claims: Option<&UserClaims>, params: Value) -> AppResult<Value> {
    require_admin(claims)?;
    let req: CreateUser = from_params(params)?;
    let user = state.services.users.create(req)?;
    Ok(json!({ "user": user }))
}

/// `updateUser`
pub fn update(state: &AppState, claims: Option<&UserClaims>, params: Value) -> AppResult<Value> {
    require_admin(claims)?;
    let req: Identified<UpdateUser> = from_params(params)?;
    let user = state.services.users.update(&req.id, req.data)?;
    Ok(json!({ "user": user }))
}

/// `deleteUser`
pub fn delete(state: &AppState, claims: Option<&UserClaims>, params: Value) -> AppResult<Value> {
    require_admin(claims)?;
    let req: IdOnly = from_params(params)?;
    state.services.users.delete(&req.id)?;
    Ok(json!({}))
}
