//! Registration, login, profile and password handlers

use salvo::prelude::*;
use serde::{Deserialize, Serialize};
use storefront_auth::{
    Credentials, IssuedToken, PasswordChange, PasswordResetConfirm, Profile, ProfileUpdate,
    Registered, Registration,
};

use super::MessageResponse;
use crate::error::into_status_error;
use crate::extensions::{json_body, DepotExt};

#[handler]
pub(crate) async fn register(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<Registered>, StatusError> {
    let form: Registration = json_body(req).await?;

    let registered = depot
        .state()?
        .accounts
        .register(form)
        .await
        .map_err(into_status_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(registered))
}

/// Exchange username and password for a bearer token.
#[handler]
pub(crate) async fn login(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<IssuedToken>, StatusError> {
    let credentials: Credentials = json_body(req).await?;

    let token = depot
        .state()?
        .accounts
        .login(credentials)
        .await
        .map_err(into_status_error)?;

    Ok(Json(token))
}

#[handler]
pub(crate) async fn profile(depot: &mut Depot) -> Result<Json<Profile>, StatusError> {
    let user = depot.current_user_or_401()?;

    let account_profile = depot
        .state()?
        .accounts
        .profile(user)
        .await
        .map_err(into_status_error)?;

    Ok(Json(account_profile))
}

#[handler]
pub(crate) async fn update_profile(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<Profile>, StatusError> {
    let user = depot.current_user_or_401()?;
    let update: ProfileUpdate = json_body(req).await?;

    let updated = depot
        .state()?
        .accounts
        .update_profile(user, update)
        .await
        .map_err(into_status_error)?;

    Ok(Json(updated))
}

#[handler]
pub(crate) async fn change_password(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<MessageResponse>, StatusError> {
    let user = depot.current_user_or_401()?;
    let form: PasswordChange = json_body(req).await?;

    depot
        .state()?
        .accounts
        .change_password(user, form)
        .await
        .map_err(into_status_error)?;

    Ok(Json(MessageResponse::new("Password changed")))
}

/// Password reset request
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ResetRequest {
    pub email: String,
}

#[handler]
pub(crate) async fn reset_password(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<MessageResponse>, StatusError> {
    let request: ResetRequest = json_body(req).await?;

    depot
        .state()?
        .accounts
        .request_password_reset(&request.email)
        .await
        .map_err(into_status_error)?;

    Ok(Json(MessageResponse::new("Password reset email sent")))
}

#[handler]
pub(crate) async fn reset_password_confirm(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<MessageResponse>, StatusError> {
    let form: PasswordResetConfirm = json_body(req).await?;

    depot
        .state()?
        .accounts
        .confirm_password_reset(form)
        .await
        .map_err(into_status_error)?;

    Ok(Json(MessageResponse::new("Password has been reset")))
}
