//! Query client integration tests: read-through caching, invalidation after
//! confirmed writes, and session handling on failed requests.

mod common;

use common::{clinic_json, item, paginated, sample_user, signed_in_client, StubTransport};
use serde_json::json;
use tempfile::tempdir;

use clinicdesk::api::error::NETWORK_ERROR_MESSAGE;
use clinicdesk::api::resources;
use clinicdesk::api::{ApiClient, ApiError, QueryClient};
use clinicdesk::core::{
    Filters, MemoryStore, QueryCache, QueryKey, Relation, Resource, Route, Session,
};
use clinicdesk::entities::clinic::ClinicRequest;
use clinicdesk::entities::prescription::PrescriptionRequest;
use clinicdesk::entities::{Appointment, Clinic, Prescription};

fn query_value(stub: &StubTransport, name: &str) -> Option<String> {
    stub.last()
        .url
        .query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

// ============================================================================
// Reads
// ============================================================================

#[test]
fn test_list_reads_through_cache() {
    let stub = StubTransport::new();
    stub.respond(200, paginated(vec![clinic_json(1, "Harbor")], 1, 1, 1));
    let mut client = signed_in_client(&stub);

    let first = client.list::<Clinic>(1, &Filters::new()).unwrap();
    let second = client.list::<Clinic>(1, &Filters::new()).unwrap();

    assert_eq!(stub.calls(), vec!["GET /healthcare/clinics"]);
    assert_eq!(first.items, second.items);
    assert_eq!(second.items[0].name, "Harbor");
    assert_eq!(second.meta.total, 1);
}

#[test]
fn test_list_sends_page_and_filters() {
    let stub = StubTransport::new();
    stub.respond(200, paginated(vec![], 2, 3, 31));
    let mut client = signed_in_client(&stub).with_per_page(10);

    let filters = Filters::new().with("search", "port");
    let page = client.list::<Clinic>(2, &filters).unwrap();

    assert!(page.is_empty());
    assert!(page.meta.has_next());
    assert!(page.meta.has_previous());
    assert_eq!(query_value(&stub, "search").as_deref(), Some("port"));
    assert_eq!(query_value(&stub, "page").as_deref(), Some("2"));
    assert_eq!(query_value(&stub, "per_page").as_deref(), Some("10"));
}

#[test]
fn test_different_filters_are_separate_entries() {
    let stub = StubTransport::new();
    stub.respond(200, paginated(vec![clinic_json(1, "Harbor")], 1, 1, 1));
    stub.respond(200, paginated(vec![clinic_json(2, "Hilltop")], 1, 1, 1));
    let mut client = signed_in_client(&stub);

    let all = client.list::<Clinic>(1, &Filters::new()).unwrap();
    let filtered = client
        .list::<Clinic>(1, &Filters::new().with("city", "Braga"))
        .unwrap();

    assert_eq!(stub.request_count(), 2);
    assert_eq!(all.items[0].name, "Harbor");
    assert_eq!(filtered.items[0].name, "Hilltop");
}

#[test]
fn test_page_size_is_part_of_list_identity() {
    let stub = StubTransport::new();
    stub.respond(200, paginated(vec![clinic_json(1, "Harbor")], 1, 4, 4));
    stub.respond(
        200,
        paginated(
            (1..=4).map(|id| clinic_json(id, "Harbor")).collect(),
            1,
            1,
            4,
        ),
    );
    let mut client = signed_in_client(&stub).with_per_page(1);

    let small = client.list::<Clinic>(1, &Filters::new()).unwrap();
    let mut client = client.with_per_page(50);
    let big = client.list::<Clinic>(1, &Filters::new()).unwrap();

    assert_eq!(stub.request_count(), 2);
    assert_eq!(query_value(&stub, "per_page").as_deref(), Some("50"));
    assert_eq!(small.items.len(), 1);
    assert_eq!(big.items.len(), 4);
    assert_eq!(big.meta.last_page, 1);
}

#[test]
fn test_cache_is_scoped_to_api_origin() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("cache.db");

    let open = |url: &str, stub: &StubTransport| {
        let mut session = Session::new(MemoryStore::new());
        session.sign_in("test-token", &sample_user()).unwrap();
        let api = ApiClient::new(url, stub.clone(), session).unwrap();
        QueryClient::new(api, QueryCache::open_for(&path, url).unwrap())
    };

    let server_a = StubTransport::new();
    server_a.respond(200, paginated(vec![clinic_json(1, "Server A clinic")], 1, 1, 1));
    open("http://a.test/api", &server_a)
        .list::<Clinic>(1, &Filters::new())
        .unwrap();

    let server_b = StubTransport::new();
    server_b.respond(200, paginated(vec![clinic_json(1, "Server B clinic")], 1, 1, 1));
    let page = open("http://b.test/api", &server_b)
        .list::<Clinic>(1, &Filters::new())
        .unwrap();

    assert_eq!(server_b.request_count(), 1);
    assert_eq!(page.items[0].name, "Server B clinic");
}

#[test]
fn test_refresh_bypasses_cache() {
    let stub = StubTransport::new();
    stub.respond(200, paginated(vec![clinic_json(1, "Harbor")], 1, 1, 1));
    stub.respond(200, paginated(vec![clinic_json(1, "Harbor North")], 1, 1, 1));
    let mut client = signed_in_client(&stub).with_refresh(true);

    client.list::<Clinic>(1, &Filters::new()).unwrap();
    let page = client.list::<Clinic>(1, &Filters::new()).unwrap();

    assert_eq!(stub.request_count(), 2);
    assert_eq!(page.items[0].name, "Harbor North");
}

#[test]
fn test_detail_with_no_selection_sends_nothing() {
    let stub = StubTransport::new();
    let mut client = signed_in_client(&stub);

    let clinic = client.query_detail::<Clinic>(0).unwrap();
    let appointments = client
        .query_related::<Appointment>(Relation::PatientAppointments, 0, 1, &Filters::new())
        .unwrap();

    assert!(clinic.is_none());
    assert!(appointments.is_empty());
    assert_eq!(stub.request_count(), 0);
}

#[test]
fn test_detail_unwraps_item_envelope() {
    let stub = StubTransport::new();
    stub.respond(200, item(clinic_json(7, "Riverside")));
    let mut client = signed_in_client(&stub);

    let clinic = client.query_detail::<Clinic>(7).unwrap().unwrap();

    assert_eq!(clinic.id, 7);
    assert!(clinic.is_active);
    assert_eq!(stub.calls(), vec!["GET /healthcare/clinics/7"]);
    assert!(client
        .cache()
        .get(&QueryKey::detail(Resource::Clinic, 7))
        .unwrap()
        .is_some());
}

#[test]
fn test_bearer_token_is_attached() {
    let stub = StubTransport::new();
    stub.respond(200, item(clinic_json(7, "Riverside")));
    let mut client = signed_in_client(&stub);

    client.query_detail::<Clinic>(7).unwrap();

    let request = stub.last();
    assert_eq!(request.header("authorization"), Some("Bearer test-token"));
    assert_eq!(request.header("Accept"), Some("application/json"));
}

// ============================================================================
// Writes
// ============================================================================

#[test]
fn test_update_invalidates_list_and_detail() {
    let stub = StubTransport::new();
    stub.respond(200, paginated(vec![clinic_json(1, "Harbor")], 1, 1, 1));
    stub.respond(200, item(clinic_json(1, "Harbor")));
    stub.respond(200, item(clinic_json(1, "Harbor Bay")));
    stub.respond(200, paginated(vec![clinic_json(1, "Harbor Bay")], 1, 1, 1));
    let mut client = signed_in_client(&stub);

    client.list::<Clinic>(1, &Filters::new()).unwrap();
    client.query_detail::<Clinic>(1).unwrap();

    let request = ClinicRequest {
        name: Some("Harbor Bay".to_string()),
        ..Default::default()
    };
    let updated: Clinic = resources::update(&mut client, 1, &request).unwrap();
    assert_eq!(updated.name, "Harbor Bay");

    let detail = client
        .cache()
        .get(&QueryKey::detail(Resource::Clinic, 1))
        .unwrap()
        .unwrap();
    assert!(detail.stale);

    let page = client.list::<Clinic>(1, &Filters::new()).unwrap();
    assert_eq!(page.items[0].name, "Harbor Bay");
    assert_eq!(
        stub.calls(),
        vec![
            "GET /healthcare/clinics",
            "GET /healthcare/clinics/1",
            "PUT /healthcare/clinics/1",
            "GET /healthcare/clinics",
        ]
    );
}

#[test]
fn test_failed_mutation_leaves_cache_intact() {
    let stub = StubTransport::new();
    stub.respond(200, paginated(vec![clinic_json(1, "Harbor")], 1, 1, 1));
    stub.respond(
        422,
        json!({
            "message": "The given data was invalid.",
            "errors": {"name": ["The name field is required."], "city": ["Too long"]}
        }),
    );
    let mut client = signed_in_client(&stub);

    client.list::<Clinic>(1, &Filters::new()).unwrap();
    let err = resources::update::<Clinic, _>(&mut client, 1, &ClinicRequest::default())
        .unwrap_err();

    match &err {
        ApiError::Validation { message, field } => {
            assert_eq!(message, "The name field is required.");
            assert_eq!(field.as_deref(), Some("name"));
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(err.to_string(), "The name field is required.");

    // Still served from cache
    client.list::<Clinic>(1, &Filters::new()).unwrap();
    assert_eq!(stub.request_count(), 2);
    assert!(client.is_authenticated());
}

#[test]
fn test_delete_invalidates_list() {
    let stub = StubTransport::new();
    stub.respond(200, paginated(vec![clinic_json(1, "Harbor")], 1, 1, 1));
    stub.respond(200, json!({"success": true, "message": "Clinic deleted"}));
    stub.respond(200, paginated(vec![], 1, 1, 0));
    let mut client = signed_in_client(&stub);

    client.list::<Clinic>(1, &Filters::new()).unwrap();
    resources::delete(&mut client, Resource::Clinic, 1).unwrap();
    let page = client.list::<Clinic>(1, &Filters::new()).unwrap();

    assert!(page.is_empty());
    assert_eq!(stub.calls()[1], "DELETE /healthcare/clinics/1");
    assert_eq!(stub.request_count(), 3);
}

#[test]
fn test_prescription_create_refreshes_visit_and_patient_views() {
    let prescription = json!({
        "id": 11,
        "visit_id": 4,
        "patient_id": 3,
        "medication_name": "Amoxicillin"
    });
    let stub = StubTransport::new();
    stub.respond(200, paginated(vec![], 1, 1, 0));
    stub.respond(200, paginated(vec![], 1, 1, 0));
    stub.respond(201, item(prescription.clone()));
    stub.respond(200, paginated(vec![prescription.clone()], 1, 1, 1));
    stub.respond(200, paginated(vec![prescription], 1, 1, 1));
    let mut client = signed_in_client(&stub);

    client
        .query_related::<Prescription>(Relation::VisitPrescriptions, 4, 1, &Filters::new())
        .unwrap();
    client
        .query_related::<Prescription>(Relation::PatientPrescriptions, 3, 1, &Filters::new())
        .unwrap();

    let request = PrescriptionRequest {
        visit_id: Some(4),
        medication_name: Some("Amoxicillin".to_string()),
        ..Default::default()
    };
    let created: Prescription = resources::create(&mut client, &request, None).unwrap();
    assert_eq!(created.id, 11);

    let by_visit = client
        .query_related::<Prescription>(Relation::VisitPrescriptions, 4, 1, &Filters::new())
        .unwrap();
    let by_patient = client
        .query_related::<Prescription>(Relation::PatientPrescriptions, 3, 1, &Filters::new())
        .unwrap();

    assert_eq!(by_visit.items.len(), 1);
    assert_eq!(by_patient.items.len(), 1);
    assert_eq!(
        stub.calls(),
        vec![
            "GET /healthcare/visits/4/prescriptions",
            "GET /healthcare/patients/3/prescriptions",
            "POST /healthcare/prescriptions",
            "GET /healthcare/visits/4/prescriptions",
            "GET /healthcare/patients/3/prescriptions",
        ]
    );
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_expired_session_clears_everything() {
    let stub = StubTransport::new();
    stub.respond(200, paginated(vec![clinic_json(1, "Harbor")], 1, 1, 1));
    stub.respond(401, json!({"message": "Unauthenticated."}));
    let mut client = signed_in_client(&stub);

    client.list::<Clinic>(1, &Filters::new()).unwrap();
    let err = client.query_detail::<Clinic>(1).unwrap_err();

    assert!(err.is_session_expired());
    assert!(!client.is_authenticated());
    assert!(client.api().session().get_user().is_none());
    assert_eq!(client.take_redirect(), Some(Route::Unauthorized));
    assert_eq!(client.take_redirect(), None);
    assert!(client
        .cache()
        .get(&QueryKey::list(Resource::Clinic, 1, client.per_page(), &Filters::new()))
        .unwrap()
        .is_none());
}

#[test]
fn test_no_response_gives_network_message() {
    let stub = StubTransport::new();
    stub.fail();
    let mut client = signed_in_client(&stub);

    let err = client.list::<Clinic>(1, &Filters::new()).unwrap_err();

    assert!(matches!(err, ApiError::Network { .. }));
    assert_eq!(err.to_string(), NETWORK_ERROR_MESSAGE);
    assert_eq!(err.status(), None);
    assert!(client.is_authenticated());
}

#[test]
fn test_server_error_without_message_uses_status() {
    let stub = StubTransport::new();
    stub.respond_empty(503);
    let mut client = signed_in_client(&stub);

    let err = client.query_detail::<Clinic>(3).unwrap_err();

    assert_eq!(err.status(), Some(503));
    assert_eq!(err.to_string(), "Request failed with status code 503");
}

#[test]
fn test_forbidden_keeps_session() {
    let stub = StubTransport::new();
    stub.respond(403, json!({"message": "This action is unauthorized."}));
    let mut client = signed_in_client(&stub);

    let err = client.query_detail::<Clinic>(3).unwrap_err();

    assert!(matches!(err, ApiError::Forbidden(_)));
    assert_eq!(err.to_string(), "This action is unauthorized.");
    assert!(client.is_authenticated());
    assert_eq!(client.take_redirect(), None);
}
