//! API client - request building, authentication, and error normalization
//!
//! Every call goes through [`ApiClient::request`]. The client attaches the
//! stored bearer token, turns non-2xx responses into [`ApiError`]s with a
//! displayable message, and reacts to an expired session: on a 401 from any
//! endpoint other than login/register the stored credentials are cleared and
//! a forced navigation to `/unauthorized` is recorded for the caller.

use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::api::error::ApiError;
use crate::api::multipart::FormBody;
use crate::api::transport::{HttpRequest, HttpResponse, Method, RequestBody, Transport};
use crate::core::route::Route;
use crate::core::session::Session;

/// Endpoints whose 401 is a form error rather than an expired session
const AUTH_FORM_PATHS: &[&str] = &["/login", "/register"];

pub struct ApiClient {
    base_url: String,
    transport: Box<dyn Transport>,
    session: Session,
    redirect: Option<Route>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        transport: impl Transport + 'static,
        session: Session,
    ) -> Result<Self, ApiError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        let parsed = Url::parse(&base_url).map_err(|_| ApiError::InvalidUrl(base_url.clone()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl(base_url));
        }
        Ok(Self {
            base_url,
            transport: Box::new(transport),
            session,
            redirect: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Forced navigation recorded by the last failed request, if any
    pub fn take_redirect(&mut self) -> Option<Route> {
        self.redirect.take()
    }

    fn url(&self, path: &str, query: &[(String, String)]) -> Result<Url, ApiError> {
        let raw = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut url = Url::parse(&raw).map_err(|_| ApiError::InvalidUrl(raw.clone()))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Send a request and return the decoded JSON body (`null` when empty)
    pub fn request(
        &mut self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: RequestBody,
    ) -> Result<Value, ApiError> {
        let url = self.url(path, query)?;

        let mut headers = vec![("Accept".to_string(), "application/json".to_string())];
        if matches!(body, RequestBody::Json(_)) {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }
        if let Some(token) = self.session.get_token() {
            headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
        }

        tracing::debug!(%method, %url, "request");
        let request = HttpRequest {
            method,
            url,
            headers,
            body,
        };

        let response = match self.transport.send(request) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(%method, path, error = %e, "no response");
                return Err(ApiError::Network { detail: e.0 });
            }
        };
        tracing::debug!(%method, path, status = response.status, "response");

        if response.is_success() {
            return parse_body(&response.body);
        }

        let is_auth_form = AUTH_FORM_PATHS.contains(&path);
        let error = normalize_error(&response, is_auth_form);

        match &error {
            ApiError::SessionExpired => {
                tracing::warn!(path, "session expired; clearing credentials");
                self.session.clear_auth()?;
                self.redirect = Some(Route::Unauthorized);
            }
            ApiError::Forbidden(message) => tracing::warn!(path, %message, "forbidden"),
            ApiError::NotFound(message) => tracing::warn!(path, %message, "not found"),
            ApiError::Server { status, message } => {
                tracing::error!(path, status, %message, "server error")
            }
            _ => {}
        }
        Err(error)
    }

    pub fn get(&mut self, path: &str, query: &[(String, String)]) -> Result<Value, ApiError> {
        self.request(Method::Get, path, query, RequestBody::Empty)
    }

    pub fn post_json<B: Serialize>(&mut self, path: &str, body: &B) -> Result<Value, ApiError> {
        let body = RequestBody::Json(serde_json::to_value(body)?);
        self.request(Method::Post, path, &[], body)
    }

    pub fn put_json<B: Serialize>(&mut self, path: &str, body: &B) -> Result<Value, ApiError> {
        let body = RequestBody::Json(serde_json::to_value(body)?);
        self.request(Method::Put, path, &[], body)
    }

    pub fn patch_json<B: Serialize>(&mut self, path: &str, body: &B) -> Result<Value, ApiError> {
        let body = RequestBody::Json(serde_json::to_value(body)?);
        self.request(Method::Patch, path, &[], body)
    }

    pub fn delete(&mut self, path: &str) -> Result<Value, ApiError> {
        self.request(Method::Delete, path, &[], RequestBody::Empty)
    }

    pub fn post_multipart(&mut self, path: &str, form: FormBody) -> Result<Value, ApiError> {
        self.request(Method::Post, path, &[], RequestBody::Multipart(form))
    }
}

fn parse_body(body: &str) -> Result<Value, ApiError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(body)?)
}

/// Turn a non-2xx response into an error with a displayable message
pub fn normalize_error(response: &HttpResponse, is_auth_form: bool) -> ApiError {
    let status = response.status;
    let body: Value = serde_json::from_str(&response.body).unwrap_or(Value::Null);
    let server_message = body
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string);
    let message = server_message
        .clone()
        .unwrap_or_else(|| format!("Request failed with status code {}", status));

    match status {
        401 if is_auth_form => ApiError::Unauthorized(message),
        401 => ApiError::SessionExpired,
        403 => ApiError::Forbidden(message),
        404 => ApiError::NotFound(message),
        422 => match first_validation_error(&body) {
            Some((field, first)) => ApiError::Validation {
                message: first,
                field: Some(field),
            },
            None => ApiError::Validation {
                message,
                field: None,
            },
        },
        500..=599 => ApiError::Server { status, message },
        _ => ApiError::Http { status, message },
    }
}

/// First message of the first field, in the order the server sent them
fn first_validation_error(body: &Value) -> Option<(String, String)> {
    let errors = body.get("errors")?.as_object()?;
    errors.iter().find_map(|(field, messages)| {
        let first = match messages {
            Value::Array(items) => items.first()?.as_str()?.to_string(),
            Value::String(s) => s.clone(),
            _ => return None,
        };
        Some((field.clone(), first))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_takes_first_field_first_message() {
        let response = HttpResponse::new(
            422,
            r#"{"message": "The given data was invalid.",
                "errors": {"email": ["Email already taken", "Email is invalid"],
                           "name": ["Name is required"]}}"#,
        );
        match normalize_error(&response, false) {
            ApiError::Validation { message, field } => {
                assert_eq!(message, "Email already taken");
                assert_eq!(field.as_deref(), Some("email"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_field_order_is_server_order() {
        let response = HttpResponse::new(
            422,
            r#"{"errors": {"name": ["Name is required"], "email": ["Email already taken"]}}"#,
        );
        assert_eq!(normalize_error(&response, false).to_string(), "Name is required");
    }

    #[test]
    fn test_fallback_message() {
        let response = HttpResponse::new(418, "");
        assert_eq!(
            normalize_error(&response, false).to_string(),
            "Request failed with status code 418"
        );
        let response = HttpResponse::new(500, r#"{"message": "Server Error"}"#);
        assert!(matches!(
            normalize_error(&response, false),
            ApiError::Server { status: 500, .. }
        ));
    }

    #[test]
    fn test_401_depends_on_endpoint() {
        let response = HttpResponse::new(401, r#"{"message": "Invalid credentials"}"#);
        match normalize_error(&response, true) {
            ApiError::Unauthorized(message) => assert_eq!(message, "Invalid credentials"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(normalize_error(&response, false).is_session_expired());
    }
}
