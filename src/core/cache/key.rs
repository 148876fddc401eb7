//! Query keys - the identity of a cached read
//!
//! A key is an ordered list of parts: a name, then ids, page numbers and
//! sizes, or a filter map. Two reads share a cache entry exactly when their keys are
//! equal. Invalidation works on prefixes, so `["appointments"]` covers every
//! page and filter combination of the appointments list.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::core::entity::{Relation, Resource};

/// Filter parameters of a list query
///
/// Kept sorted so that equal filter sets always produce equal keys.
/// Empty values are dropped: an empty search box and no search box are
/// the same query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Filters(BTreeMap<String, String>);

impl Filters {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Add a filter value, ignoring empty strings
    pub fn with(mut self, name: &str, value: impl ToString) -> Self {
        self.insert(name, value);
        self
    }

    /// Add a filter value when present
    pub fn with_opt<V: ToString>(mut self, name: &str, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.insert(name, v);
        }
        self
    }

    pub fn insert(&mut self, name: &str, value: impl ToString) {
        let value = value.to_string();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.0.remove(name);
        } else {
            self.0.insert(name.to_string(), trimmed.to_string());
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Query-string pairs in key order
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl std::fmt::Display for Filters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        write!(f, "{{{}}}", parts.join(","))
    }
}

/// One segment of a query key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyPart {
    Int(i64),
    Text(String),
    Filters(Filters),
}

impl std::fmt::Display for KeyPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyPart::Int(n) => write!(f, "{}", n),
            KeyPart::Text(s) => write!(f, "{}", s),
            KeyPart::Filters(filters) => write!(f, "{}", filters),
        }
    }
}

impl From<u64> for KeyPart {
    fn from(value: u64) -> Self {
        KeyPart::Int(value as i64)
    }
}

impl From<u32> for KeyPart {
    fn from(value: u32) -> Self {
        KeyPart::Int(value as i64)
    }
}

impl From<&str> for KeyPart {
    fn from(value: &str) -> Self {
        KeyPart::Text(value.to_string())
    }
}

impl From<Filters> for KeyPart {
    fn from(value: Filters) -> Self {
        KeyPart::Filters(value)
    }
}

/// Identity of a cached query
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryKey(Vec<KeyPart>);

impl QueryKey {
    /// Key with a single name segment (also usable as an invalidation prefix)
    pub fn named(name: &str) -> Self {
        Self(vec![KeyPart::from(name)])
    }

    /// The empty key: a prefix of every key
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Paginated list of a resource; the page size is part of the identity
    pub fn list(resource: Resource, page: u32, per_page: u32, filters: &Filters) -> Self {
        Self::named(resource.list_key())
            .push(page)
            .push(per_page)
            .push(filters.clone())
    }

    /// All list queries of a resource, whatever the page or filters
    pub fn all(resource: Resource) -> Self {
        Self::named(resource.list_key())
    }

    /// Single record of a resource
    pub fn detail(resource: Resource, id: u64) -> Self {
        Self::named(resource.detail_key()).push(id)
    }

    /// Child collection under a parent record
    pub fn related(
        relation: Relation,
        parent_id: u64,
        page: u32,
        per_page: u32,
        filters: &Filters,
    ) -> Self {
        Self::named(relation.key())
            .push(parent_id)
            .push(page)
            .push(per_page)
            .push(filters.clone())
    }

    /// Every query of a relation, whatever the parent
    pub fn all_related(relation: Relation) -> Self {
        Self::named(relation.key())
    }

    pub fn current_user() -> Self {
        Self::named("current-user")
    }

    /// Append a segment
    pub fn push(mut self, part: impl Into<KeyPart>) -> Self {
        self.0.push(part.into());
        self
    }

    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }

    /// Leading name segment, used to index entries
    pub fn name(&self) -> Option<&str> {
        match self.0.first() {
            Some(KeyPart::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// True when `prefix` matches the leading segments of this key
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        prefix.0.len() <= self.0.len() && self.0.iter().zip(prefix.0.iter()).all(|(a, b)| a == b)
    }

    /// True when either key is a prefix of the other
    pub fn overlaps(&self, other: &QueryKey) -> bool {
        self.starts_with(other) || other.starts_with(self)
    }

    /// Canonical JSON form, stable for equal keys
    pub fn canonical(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_default()
    }

    /// Parse the canonical JSON form
    pub fn from_canonical(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// SHA-256 of the canonical form, used as the storage primary key
    pub fn hash(&self) -> String {
        format!("{:x}", Sha256::digest(self.canonical().as_bytes()))
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|p| p.to_string()).collect();
        write!(f, "{}", parts.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_filters_equal_keys() {
        let a = Filters::new().with("search", "smith").with("status", "booked");
        let b = Filters::new().with("status", "booked").with("search", "smith");
        assert_eq!(
            QueryKey::list(Resource::Appointment, 1, 15, &a),
            QueryKey::list(Resource::Appointment, 1, 15, &b)
        );
        assert_eq!(
            QueryKey::list(Resource::Appointment, 1, 15, &a).hash(),
            QueryKey::list(Resource::Appointment, 1, 15, &b).hash()
        );
    }

    #[test]
    fn test_differing_filters_differ() {
        let a = Filters::new().with("search", "smith");
        let b = Filters::new().with("search", "smyth");
        assert_ne!(
            QueryKey::list(Resource::Patient, 1, 15, &a),
            QueryKey::list(Resource::Patient, 1, 15, &b)
        );
        assert_ne!(
            QueryKey::list(Resource::Patient, 1, 15, &a),
            QueryKey::list(Resource::Patient, 2, 15, &a)
        );
        assert_ne!(
            QueryKey::list(Resource::Patient, 1, 15, &a),
            QueryKey::list(Resource::Patient, 1, 50, &a)
        );
    }

    #[test]
    fn test_empty_filter_values_dropped() {
        let filters = Filters::new().with("search", "  ").with_opt::<&str>("status", None);
        assert!(filters.is_empty());
        assert_eq!(filters, Filters::new());
    }

    #[test]
    fn test_prefix_matching() {
        let list = QueryKey::list(Resource::Clinic, 2, 15, &Filters::new().with("search", "city"));
        assert!(list.starts_with(&QueryKey::all(Resource::Clinic)));
        assert!(list.starts_with(&QueryKey::root()));
        assert!(!list.starts_with(&QueryKey::all(Resource::Doctor)));

        let detail = QueryKey::detail(Resource::Clinic, 4);
        assert!(detail.starts_with(&QueryKey::detail(Resource::Clinic, 4)));
        assert!(!detail.starts_with(&QueryKey::detail(Resource::Clinic, 40)));
        assert!(!detail.starts_with(&QueryKey::all(Resource::Clinic)));
    }

    #[test]
    fn test_canonical_roundtrip_preserves_part_kinds() {
        let key = QueryKey::related(
            Relation::VisitPrescriptions,
            7,
            1,
            15,
            &Filters::new().with("status", "active"),
        );
        let parsed = QueryKey::from_canonical(&key.canonical()).unwrap();
        assert_eq!(parsed, key);
        assert_eq!(parsed.name(), Some("visit-prescriptions"));
    }

    #[test]
    fn test_display() {
        let key = QueryKey::list(Resource::Doctor, 1, 15, &Filters::new().with("specialty_id", 3));
        assert_eq!(key.to_string(), "doctors/1/15/{specialty_id=3}");
        assert_eq!(QueryKey::detail(Resource::Doctor, 9).to_string(), "doctor/9");
    }
}
