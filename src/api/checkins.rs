//! Check-in actions

use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    models::{CheckInRequest, UserClaims},
    AppState,
};

use super::{from_params, require_admin, require_user};

#[derive(Debug, Deserialize)]
pub struct CheckInQuery {
    #[serde(rename = "activityId")]
    pub activity_id: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SurveyStatusRequest {
    #[serde(rename = "checkInId")]
    pub check_in_id: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteCheckInRequest {
    #[serde(rename = "checkInId")]
    pub check_in_id: String,
}

/// `checkIn` — run the admission protocol. The dispatcher already holds the
/// request lock, which is what makes the engine's capacity gate race-free.
pub fn check_in(state: &AppState, params: Value) -> AppResult<Value> {
    let req: CheckInRequest = from_params(params)?;
    // The acting identity must exist before admission runs.
    state.services.users.check(&req.user_id)?;
    let record = state.services.checkins.admit(&req)?;
    Ok(json!({ "checkInId": record.id }))
}

/// `getCheckIns` — list check-ins, optionally scoped to one activity or one
/// user.
pub fn list(state: &AppState, params: Value) -> AppResult<Value> {
    let query: CheckInQuery = from_params(params)?;
    let records = match (&query.activity_id, &query.user_id) {
        (Some(activity_id), _) => state.services.checkins.list_for_activity(activity_id)?,
        (None, Some(user_id)) => state.services.checkins.list_for_user(user_id)?,
        (None, None) => state.services.checkins.list()?,
    };
    Ok(json!({ "checkIns": records }))
}

/// `updateSurveyStatus` — the actor marks the survey done on their own
/// check-in.
pub fn update_survey_status(
    state: &AppState,
    claims: Option<&UserClaims>,
    params: Value,
) -> AppResult<Value> {
    let claims = require_user(claims)?;
    let req: SurveyStatusRequest = from_params(params)?;
    state
        .services
        .checkins
        .set_survey_done(&req.check_in_id, &claims.user_id)?;
    Ok(json!({}))
}

/// `deleteCheckIn` — admin log pruning.
pub fn delete(state: &AppState, claims: Option<&UserClaims>, params: Value) -> AppResult<Value> {
    require_admin(claims)?;
    let req: DeleteCheckInRequest = from_params(params)?;
    state.services.checkins.delete(&req.check_in_id)?;
    Ok(json!({}))
}
