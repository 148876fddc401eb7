//! Sign-in, sign-out, and current-user tests against a scripted server.

mod common;

use common::{client, sample_user, signed_in_client, StubTransport};
use serde_json::json;

use clinicdesk::api::auth::{self, LoginRequest, RegisterRequest};
use clinicdesk::api::transport::RequestBody;
use clinicdesk::api::ApiError;
use clinicdesk::core::{QueryKey, Route};

fn auth_payload() -> serde_json::Value {
    json!({
        "success": true,
        "data": {
            "user": {
                "id": 1,
                "name": "Dana Admin",
                "email": "dana@clinic.test",
                "roles": [{"id": 1, "name": "admin"}]
            },
            "token": "issued-token"
        }
    })
}

fn login_request() -> LoginRequest {
    LoginRequest {
        email: "dana@clinic.test".to_string(),
        password: "secret".to_string(),
    }
}

// ============================================================================
// Login / register
// ============================================================================

#[test]
fn test_login_stores_session_and_seeds_current_user() {
    let stub = StubTransport::new();
    stub.respond(200, auth_payload());
    let mut client = client(&stub);

    let user = auth::login(&mut client, &login_request()).unwrap();

    assert_eq!(user.email, "dana@clinic.test");
    assert!(client.is_authenticated());
    assert_eq!(
        client.api().session().get_token().as_deref(),
        Some("issued-token")
    );
    assert_eq!(client.api().session().get_user(), Some(user.clone()));
    assert!(client
        .cache()
        .fresh(&QueryKey::current_user())
        .unwrap()
        .is_some());

    // Served from the seeded entry
    let current = auth::current_user(&mut client).unwrap();
    assert_eq!(current, Some(user));
    assert_eq!(stub.calls(), vec!["POST /login"]);
}

#[test]
fn test_login_sends_credentials_without_token() {
    let stub = StubTransport::new();
    stub.respond(200, auth_payload());
    let mut client = client(&stub);

    auth::login(&mut client, &login_request()).unwrap();

    let request = stub.last();
    assert_eq!(request.header("Authorization"), None);
    assert_eq!(
        request.body,
        RequestBody::Json(json!({"email": "dana@clinic.test", "password": "secret"}))
    );
}

#[test]
fn test_login_accepts_access_token_field() {
    let stub = StubTransport::new();
    stub.respond(
        200,
        json!({
            "user": {"id": 2, "name": "Ines", "email": "ines@clinic.test"},
            "access_token": "other-token"
        }),
    );
    let mut client = client(&stub);

    auth::login(&mut client, &login_request()).unwrap();

    assert_eq!(
        client.api().session().get_token().as_deref(),
        Some("other-token")
    );
}

#[test]
fn test_rejected_login_is_a_form_error() {
    let stub = StubTransport::new();
    stub.respond(401, json!({"message": "Invalid credentials"}));
    let mut client = client(&stub);

    let err = auth::login(&mut client, &login_request()).unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized(_)));
    assert_eq!(err.to_string(), "Invalid credentials");
    assert!(!client.is_authenticated());
    assert_eq!(client.take_redirect(), None);
}

#[test]
fn test_register_sends_confirmation() {
    let stub = StubTransport::new();
    stub.respond(201, auth_payload());
    let mut client = client(&stub);

    let request = RegisterRequest {
        name: "Dana Admin".to_string(),
        email: "dana@clinic.test".to_string(),
        password: "secret-pass".to_string(),
        password_confirmation: "secret-pass".to_string(),
        phone: None,
    };
    auth::register(&mut client, &request).unwrap();

    assert_eq!(stub.calls(), vec!["POST /register"]);
    match stub.last().body {
        RequestBody::Json(body) => {
            assert_eq!(body["password_confirmation"], "secret-pass");
            assert!(body.get("phone").is_none());
        }
        other => panic!("unexpected body {:?}", other),
    }
    assert!(client.is_authenticated());
}

#[test]
fn test_register_validation_error() {
    let stub = StubTransport::new();
    stub.respond(
        422,
        json!({"message": "Invalid", "errors": {"email": ["The email has already been taken."]}}),
    );
    let mut client = client(&stub);

    let err = auth::register(&mut client, &RegisterRequest::default()).unwrap_err();

    assert_eq!(err.to_string(), "The email has already been taken.");
    assert!(!client.is_authenticated());
}

// ============================================================================
// Logout
// ============================================================================

#[test]
fn test_logout_clears_session_and_cache() {
    let stub = StubTransport::new();
    stub.respond(200, json!({"message": "Logged out"}));
    let mut client = signed_in_client(&stub);
    client.seed(&QueryKey::current_user(), &sample_user()).unwrap();

    let outcome = auth::logout(&mut client).unwrap();

    assert_eq!(outcome.landing, Route::Login);
    assert!(outcome.server_error.is_none());
    assert!(!client.is_authenticated());
    assert!(client
        .cache()
        .get(&QueryKey::current_user())
        .unwrap()
        .is_none());
    assert_eq!(stub.calls(), vec!["POST /logout"]);
}

#[test]
fn test_logout_survives_server_failure() {
    let stub = StubTransport::new();
    stub.fail();
    let mut client = signed_in_client(&stub);

    let outcome = auth::logout(&mut client).unwrap();

    assert_eq!(outcome.landing, Route::Login);
    assert!(matches!(
        outcome.server_error,
        Some(ApiError::Network { .. })
    ));
    assert!(!client.is_authenticated());
}

#[test]
fn test_logout_after_expiry_lands_on_login() {
    let stub = StubTransport::new();
    stub.respond(401, json!({"message": "Unauthenticated."}));
    let mut client = signed_in_client(&stub);

    let outcome = auth::logout(&mut client).unwrap();

    assert_eq!(outcome.landing, Route::Login);
    assert_eq!(client.take_redirect(), None);
    assert!(!client.is_authenticated());
}

// ============================================================================
// Current user
// ============================================================================

#[test]
fn test_current_user_without_token_sends_nothing() {
    let stub = StubTransport::new();
    let mut client = client(&stub);

    assert_eq!(auth::current_user(&mut client).unwrap(), None);
    assert_eq!(stub.request_count(), 0);
}

#[test]
fn test_current_user_fetches_and_stores() {
    let stub = StubTransport::new();
    stub.respond(
        200,
        json!({"id": 1, "name": "Dana Renamed", "email": "dana@clinic.test"}),
    );
    let mut client = signed_in_client(&stub);

    let user = auth::current_user(&mut client).unwrap().unwrap();

    assert_eq!(user.name, "Dana Renamed");
    assert_eq!(stub.calls(), vec!["GET /user"]);
    assert_eq!(
        client.api().session().get_user().map(|u| u.name),
        Some("Dana Renamed".to_string())
    );
}
