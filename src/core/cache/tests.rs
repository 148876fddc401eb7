//! Unit tests for the cache module

use super::*;
use crate::core::entity::{Relation, Resource};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;
use tempfile::tempdir;

fn clinics_page(page: u32, search: &str) -> QueryKey {
    QueryKey::list(Resource::Clinic, page, 15, &Filters::new().with("search", search))
}

#[test]
fn test_cache_creation() {
    let cache = QueryCache::open_in_memory().unwrap();
    let stats = cache.statistics().unwrap();
    assert_eq!(stats.total_entries, 0);
    assert_eq!(stats.stale_entries, 0);
}

#[test]
fn test_set_then_fresh() {
    let mut cache = QueryCache::open_in_memory().unwrap();
    let key = clinics_page(1, "city");

    assert!(cache.fresh(&key).unwrap().is_none());
    cache.set(&key, &json!({"items": [{"id": 1}]})).unwrap();

    let data = cache.fresh(&key).unwrap().unwrap();
    assert_eq!(data["items"][0]["id"], 1);
}

#[test]
fn test_overwrite_clears_stale_flag() {
    let mut cache = QueryCache::open_in_memory().unwrap();
    let key = clinics_page(1, "");

    cache.set(&key, &json!([1])).unwrap();
    cache.invalidate(&QueryKey::all(Resource::Clinic)).unwrap();
    assert!(cache.fresh(&key).unwrap().is_none());
    assert!(cache.get(&key).unwrap().unwrap().stale);

    cache.set(&key, &json!([1, 2])).unwrap();
    assert_eq!(cache.fresh(&key).unwrap().unwrap(), json!([1, 2]));
}

#[test]
fn test_invalidate_prefix_covers_all_pages_and_filters() {
    let mut cache = QueryCache::open_in_memory().unwrap();
    cache.set(&clinics_page(1, ""), &json!([])).unwrap();
    cache.set(&clinics_page(2, ""), &json!([])).unwrap();
    cache.set(&clinics_page(1, "north"), &json!([])).unwrap();
    cache
        .set(&QueryKey::detail(Resource::Clinic, 4), &json!({}))
        .unwrap();
    cache
        .set(&QueryKey::list(Resource::Doctor, 1, 15, &Filters::new()), &json!([]))
        .unwrap();

    let matched = cache.invalidate(&QueryKey::all(Resource::Clinic)).unwrap();
    assert_eq!(matched, 3);

    // Detail and unrelated lists stay fresh
    assert!(cache
        .fresh(&QueryKey::detail(Resource::Clinic, 4))
        .unwrap()
        .is_some());
    assert!(cache
        .fresh(&QueryKey::list(Resource::Doctor, 1, 15, &Filters::new()))
        .unwrap()
        .is_some());
    assert_eq!(cache.statistics().unwrap().stale_entries, 3);
}

#[test]
fn test_invalidate_detail_by_id() {
    let mut cache = QueryCache::open_in_memory().unwrap();
    cache
        .set(&QueryKey::detail(Resource::Visit, 1), &json!({}))
        .unwrap();
    cache
        .set(&QueryKey::detail(Resource::Visit, 10), &json!({}))
        .unwrap();

    cache.invalidate(&QueryKey::detail(Resource::Visit, 1)).unwrap();

    assert!(cache
        .fresh(&QueryKey::detail(Resource::Visit, 1))
        .unwrap()
        .is_none());
    assert!(cache
        .fresh(&QueryKey::detail(Resource::Visit, 10))
        .unwrap()
        .is_some());
}

#[test]
fn test_relation_prefix_covers_every_parent() {
    let mut cache = QueryCache::open_in_memory().unwrap();
    for visit in [1, 2, 3] {
        cache
            .set(
                &QueryKey::related(Relation::VisitPrescriptions, visit, 1, 15, &Filters::new()),
                &json!([]),
            )
            .unwrap();
    }

    let matched = cache
        .invalidate(&QueryKey::all_related(Relation::VisitPrescriptions))
        .unwrap();
    assert_eq!(matched, 3);
}

#[test]
fn test_remove_and_clear() {
    let mut cache = QueryCache::open_in_memory().unwrap();
    cache.set(&clinics_page(1, ""), &json!([])).unwrap();
    cache.set(&QueryKey::current_user(), &json!({"id": 1})).unwrap();

    assert_eq!(cache.remove(&QueryKey::all(Resource::Clinic)).unwrap(), 1);
    assert!(cache.get(&clinics_page(1, "")).unwrap().is_none());

    cache.clear().unwrap();
    assert_eq!(cache.statistics().unwrap().total_entries, 0);
}

#[test]
fn test_ttl_expires_entries() {
    let mut cache = QueryCache::open_in_memory()
        .unwrap()
        .with_ttl(Some(Duration::seconds(-1)));
    let key = clinics_page(1, "");
    cache.set(&key, &json!([])).unwrap();

    assert!(cache.fresh(&key).unwrap().is_none());
    assert!(cache.get(&key).unwrap().is_some());
}

#[test]
fn test_persistent_cache_survives_reopen() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("cache").join("cache.db");
    let key = clinics_page(1, "city");

    {
        let mut cache = QueryCache::open(&path).unwrap();
        cache.set(&key, &json!({"total": 1})).unwrap();
    }

    let cache = QueryCache::open(&path).unwrap();
    assert_eq!(cache.fresh(&key).unwrap().unwrap()["total"], 1);
}

#[test]
fn test_reopen_for_same_origin_keeps_entries() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("cache.db");
    let key = clinics_page(1, "");

    {
        let mut cache = QueryCache::open_for(&path, "http://a.test/api").unwrap();
        cache.set(&key, &json!([1])).unwrap();
    }

    let mut cache = QueryCache::open_for(&path, "http://a.test/api").unwrap();
    assert!(cache.fresh(&key).unwrap().is_some());
    assert!(!cache.bind_origin("http://a.test/api").unwrap());
}

#[test]
fn test_reopen_for_other_origin_empties_cache() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("cache.db");
    let key = clinics_page(1, "");

    {
        let mut cache = QueryCache::open_for(&path, "http://a.test/api").unwrap();
        cache.set(&key, &json!([1])).unwrap();
    }

    let cache = QueryCache::open_for(&path, "http://b.test/api").unwrap();
    assert!(cache.get(&key).unwrap().is_none());
    assert_eq!(cache.origin().unwrap().as_deref(), Some("http://b.test/api"));
}

#[test]
fn test_subscribers_receive_overlapping_events() {
    let mut cache = QueryCache::open_in_memory().unwrap();
    let seen: Rc<RefCell<Vec<CacheEvent>>> = Rc::new(RefCell::new(Vec::new()));

    let sink = seen.clone();
    cache.subscribe(QueryKey::all(Resource::Clinic), move |event| {
        sink.borrow_mut().push(event.clone())
    });

    cache.set(&clinics_page(1, ""), &json!([])).unwrap();
    cache
        .set(&QueryKey::list(Resource::Doctor, 1, 15, &Filters::new()), &json!([]))
        .unwrap();
    cache.invalidate(&QueryKey::all(Resource::Clinic)).unwrap();
    cache.invalidate(&QueryKey::all(Resource::Doctor)).unwrap();

    let events = seen.borrow();
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[0],
        CacheEvent::Updated {
            key: clinics_page(1, "")
        }
    );
    assert_eq!(
        events[1],
        CacheEvent::Invalidated {
            prefix: QueryKey::all(Resource::Clinic),
            matched: 1
        }
    );
}

#[test]
fn test_unsubscribe() {
    let mut cache = QueryCache::open_in_memory().unwrap();
    let count = Rc::new(RefCell::new(0));

    let counter = count.clone();
    let id = cache.subscribe(QueryKey::root(), move |_| *counter.borrow_mut() += 1);

    cache.set(&clinics_page(1, ""), &json!([])).unwrap();
    assert!(cache.unsubscribe(id));
    assert!(!cache.unsubscribe(id));
    cache.clear().unwrap();

    assert_eq!(*count.borrow(), 1);
}

#[test]
fn test_statistics_group_by_name() {
    let mut cache = QueryCache::open_in_memory().unwrap();
    cache.set(&clinics_page(1, ""), &json!([])).unwrap();
    cache.set(&clinics_page(2, ""), &json!([])).unwrap();
    cache
        .set(&QueryKey::detail(Resource::Patient, 5), &json!({}))
        .unwrap();

    let stats = cache.statistics().unwrap();
    assert_eq!(stats.total_entries, 3);
    assert_eq!(
        stats.resources,
        vec![("clinics".to_string(), 2), ("patient".to_string(), 1)]
    );
}
