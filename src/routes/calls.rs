use axum::{extract::State, Json};

use super::{envelope, ApiJson};
use crate::{
    auth::{AuthenticatedUser, Role},
    calls::{initiate_call, CallRequest, InitiatedCall},
    error::AppResult,
    state::AppState,
};

pub async fn initiate(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CallRequest>,
) -> AppResult<ApiJson<InitiatedCall>> {
    user.require(Role::Editor)?;
    let call = initiate_call(&state, request).await?;
    Ok(envelope(call))
}
