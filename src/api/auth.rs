//! Authentication endpoints
//!
//! Login and registration store the issued token and user, then seed the
//! `current-user` query so the first screen needs no extra round trip.
//! Logout always ends the local session, whatever the server says.

use serde::{Deserialize, Serialize};

use crate::api::envelope::decode_item;
use crate::api::error::ApiError;
use crate::api::query::QueryClient;
use crate::core::cache::QueryKey;
use crate::core::route::Route;
use crate::entities::User;

pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";
pub const LOGOUT_PATH: &str = "/logout";
pub const CURRENT_USER_PATH: &str = "/user";

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// `{user, token}` as returned by login and register
#[derive(Debug, Clone, Deserialize)]
pub struct AuthPayload {
    pub user: User,

    #[serde(alias = "access_token")]
    pub token: String,
}

/// Result of a logout
#[derive(Debug)]
pub struct LogoutOutcome {
    /// Where the navigator goes next (always `/login`)
    pub landing: Route,
    /// Server-side failure, reported as a warning only
    pub server_error: Option<ApiError>,
}

pub fn login(client: &mut QueryClient, request: &LoginRequest) -> Result<User, ApiError> {
    let response = client.api_mut().post_json(LOGIN_PATH, request)?;
    complete_sign_in(client, response)
}

pub fn register(client: &mut QueryClient, request: &RegisterRequest) -> Result<User, ApiError> {
    let response = client.api_mut().post_json(REGISTER_PATH, request)?;
    complete_sign_in(client, response)
}

fn complete_sign_in(client: &mut QueryClient, response: serde_json::Value) -> Result<User, ApiError> {
    let payload: AuthPayload = decode_item(response)?;
    client
        .api_mut()
        .session_mut()
        .sign_in(&payload.token, &payload.user)?;
    client.seed(&QueryKey::current_user(), &payload.user)?;
    tracing::info!(user = %payload.user.email, "signed in");
    Ok(payload.user)
}

/// Tell the server, then drop credentials and the whole cache regardless
pub fn logout(client: &mut QueryClient) -> Result<LogoutOutcome, ApiError> {
    let server_error = client
        .api_mut()
        .post_json(LOGOUT_PATH, &serde_json::json!({}))
        .err();
    if let Some(e) = &server_error {
        tracing::warn!(error = %e, "logout request failed; clearing local session anyway");
    }

    // A 401 here already cleared the session; the landing is /login either way
    client.take_redirect();
    client.api_mut().session_mut().clear_auth()?;
    client.reset()?;

    Ok(LogoutOutcome {
        landing: Route::Login,
        server_error,
    })
}

/// The signed-in user, read through the cache; no request without a token
pub fn current_user(client: &mut QueryClient) -> Result<Option<User>, ApiError> {
    if !client.is_authenticated() {
        return Ok(None);
    }
    let user: User = client.query(&QueryKey::current_user(), CURRENT_USER_PATH, &[])?;
    client.api_mut().session_mut().set_user(&user)?;
    Ok(Some(user))
}
