//! Shared test helpers for integration tests
//!
//! `StubTransport` replays scripted responses in order and records every
//! request, so client behavior can be checked without a server.

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use tempfile::TempDir;

use clinicdesk::api::transport::{HttpRequest, HttpResponse, Transport, TransportError};
use clinicdesk::api::{ApiClient, QueryClient};
use clinicdesk::core::{MemoryStore, QueryCache, Session};
use clinicdesk::entities::User;

pub const BASE_URL: &str = "http://clinic.test/api";

/// Nothing listens on the discard port
pub const DEAD_URL: &str = "http://127.0.0.1:9/api";

/// Helper to get a cdesk command
pub fn cdesk() -> Command {
    Command::new(cargo::cargo_bin!("cdesk"))
}

/// A cdesk command isolated in its own data directory
pub fn cdesk_in(home: &TempDir) -> Command {
    let mut cmd = cdesk();
    cmd.env("CDESK_HOME", home.path())
        .env("CDESK_API_URL", DEAD_URL)
        .env_remove("CDESK_LOG")
        .env_remove("CDESK_PASSWORD");
    cmd
}

// ============================================================================
// Scripted transport
// ============================================================================

#[derive(Default)]
struct Script {
    responses: VecDeque<Result<HttpResponse, String>>,
    requests: Vec<HttpRequest>,
}

#[derive(Clone, Default)]
pub struct StubTransport {
    script: Rc<RefCell<Script>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with the given status and JSON body
    pub fn respond(&self, status: u16, body: serde_json::Value) -> &Self {
        self.script
            .borrow_mut()
            .responses
            .push_back(Ok(HttpResponse::new(status, body.to_string())));
        self
    }

    pub fn respond_empty(&self, status: u16) -> &Self {
        self.script
            .borrow_mut()
            .responses
            .push_back(Ok(HttpResponse::new(status, "")));
        self
    }

    /// Queue a failure with no response (connection refused)
    pub fn fail(&self) -> &Self {
        self.script
            .borrow_mut()
            .responses
            .push_back(Err("connection refused".to_string()));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.script.borrow().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.script.borrow().requests.len()
    }

    /// `METHOD /path` of every request, base URL stripped
    pub fn calls(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| {
                let path = r.url.path().trim_start_matches("/api");
                format!("{} {}", r.method, path)
            })
            .collect()
    }

    pub fn last(&self) -> HttpRequest {
        self.requests()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

impl Transport for StubTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut script = self.script.borrow_mut();
        script.requests.push(request);
        match script.responses.pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(e)) => Err(TransportError(e)),
            None => Err(TransportError("no scripted response left".to_string())),
        }
    }
}

// ============================================================================
// Clients
// ============================================================================

/// A query client with no session, in-memory storage, and an in-memory cache
pub fn client(stub: &StubTransport) -> QueryClient {
    let session = Session::new(MemoryStore::new());
    let api = ApiClient::new(BASE_URL, stub.clone(), session).unwrap();
    let cache = QueryCache::open_in_memory().unwrap();
    QueryClient::new(api, cache)
}

/// A query client already holding a token and user
pub fn signed_in_client(stub: &StubTransport) -> QueryClient {
    let mut client = client(stub);
    client
        .api_mut()
        .session_mut()
        .sign_in("test-token", &sample_user())
        .unwrap();
    client
}

pub fn sample_user() -> User {
    serde_json::from_value(serde_json::json!({
        "id": 1,
        "name": "Dana Admin",
        "email": "dana@clinic.test",
        "roles": [{"id": 1, "name": "admin"}]
    }))
    .unwrap()
}

// ============================================================================
// Response bodies
// ============================================================================

/// Healthcare envelope around one record
pub fn item(data: serde_json::Value) -> serde_json::Value {
    serde_json::json!({"success": true, "data": data})
}

/// Healthcare envelope around a Laravel paginator
pub fn paginated(items: Vec<serde_json::Value>, page: u32, last_page: u32, total: u64) -> serde_json::Value {
    serde_json::json!({
        "success": true,
        "data": {
            "data": items,
            "current_page": page,
            "last_page": last_page,
            "per_page": 15,
            "total": total
        }
    })
}

pub fn clinic_json(id: u64, name: &str) -> serde_json::Value {
    serde_json::json!({"id": id, "name": name, "city": "Porto", "is_active": true})
}

pub fn appointment_json(id: u64, status: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "patient_id": 3,
        "doctor_id": 4,
        "clinic_id": 5,
        "appointment_date": "2026-03-02",
        "start_time": "09:30",
        "status": status
    })
}
