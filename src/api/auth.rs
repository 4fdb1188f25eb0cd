//! Login and identity actions

use serde::Deserialize;
use serde_json::{json, Value};

use crate::{error::AppResult, AppState};

use super::from_params;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckUserRequest {
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// `login` — authenticate and return a bearer token plus the profile.
pub fn login(state: &AppState, params: Value) -> AppResult<Value> {
    let req: LoginRequest = from_params(params)?;
    let (token, user) = state.services.users.authenticate(&req.username, &req.password)?;
    Ok(json!({ "token": token, "user": user }))
}

/// `checkUser` — validate a stored identity and return the public profile.
pub fn check_user(state: &AppState, params: Value) -> AppResult<Value> {
    let req: CheckUserRequest = from_params(params)?;
    let user = state.services.users.check(&req.user_id)?;
    Ok(json!({ "user": user }))
}
