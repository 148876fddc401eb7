//! Response envelopes
//!
//! The backend answers in two families. Account endpoints return Laravel
//! resource collections (`{data: [...], meta: {...}, links: {...}}`).
//! Healthcare endpoints return `{success, data, meta, message}`, where `data`
//! is either the record, an array, or a nested Laravel paginator. A bare
//! array is treated as a single page.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::api::error::ApiError;

/// Pagination metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub current_page: u32,
    pub last_page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl PageMeta {
    /// Metadata for an unpaginated list of `len` items
    pub fn single(len: usize) -> Self {
        Self {
            current_page: 1,
            last_page: 1,
            per_page: len as u32,
            total: len as u64,
        }
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.last_page
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }
}

/// One page of records
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            meta: PageMeta::single(0),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Page<Value> {
    pub fn decode<T: DeserializeOwned>(self) -> Result<Page<T>, ApiError> {
        let items = self
            .items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()?;
        Ok(Page {
            items,
            meta: self.meta,
        })
    }
}

fn reject_failure(map: &Map<String, Value>) -> Result<(), ApiError> {
    if map.get("success").and_then(Value::as_bool) == Some(false) {
        let message = map
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("request was not successful");
        return Err(ApiError::Envelope(message.to_string()));
    }
    Ok(())
}

fn number(map: &Map<String, Value>, key: &str) -> Option<u64> {
    match map.get(key)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn meta_from(map: &Map<String, Value>, len: usize) -> PageMeta {
    let fallback = PageMeta::single(len);
    PageMeta {
        current_page: number(map, "current_page").map_or(fallback.current_page, |n| n as u32),
        last_page: number(map, "last_page").map_or(fallback.last_page, |n| n as u32),
        per_page: number(map, "per_page").map_or(fallback.per_page, |n| n as u32),
        total: number(map, "total").unwrap_or(fallback.total),
    }
}

/// Extract the records and pagination of a list response
pub fn unwrap_page(value: Value) -> Result<Page<Value>, ApiError> {
    match value {
        Value::Array(items) => {
            let meta = PageMeta::single(items.len());
            Ok(Page { items, meta })
        }
        Value::Object(mut map) => {
            reject_failure(&map)?;
            let meta_map = match map.remove("meta") {
                Some(Value::Object(meta)) => Some(meta),
                _ => None,
            };
            match map.remove("data") {
                Some(Value::Array(items)) => {
                    // Resource collection: meta beside data, or a paginator
                    // whose fields sit at the top level
                    let meta = meta_from(meta_map.as_ref().unwrap_or(&map), items.len());
                    Ok(Page { items, meta })
                }
                Some(Value::Object(inner)) if inner.contains_key("data") => {
                    unwrap_page(Value::Object(inner))
                }
                Some(other) => Err(ApiError::Envelope(format!(
                    "expected a list, got {}",
                    kind(&other)
                ))),
                None => Err(ApiError::Envelope("response has no data".to_string())),
            }
        }
        other => Err(ApiError::Envelope(format!(
            "expected a list, got {}",
            kind(&other)
        ))),
    }
}

/// Extract a single record from an item response
///
/// `{success, data}` and `{data}` wrappers are removed; anything else is
/// returned as-is.
pub fn unwrap_item(value: Value) -> Result<Value, ApiError> {
    match value {
        Value::Object(mut map) => {
            reject_failure(&map)?;
            let wrapped = map.contains_key("data")
                && map
                    .keys()
                    .all(|k| matches!(k.as_str(), "data" | "success" | "message" | "meta" | "links"));
            if wrapped {
                Ok(map.remove("data").unwrap_or(Value::Null))
            } else {
                Ok(Value::Object(map))
            }
        }
        other => Ok(other),
    }
}

/// Decode a single record out of an item response
pub fn decode_item<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    Ok(serde_json::from_value(unwrap_item(value)?)?)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resource_collection() {
        let page = unwrap_page(json!({
            "data": [{"id": 1}, {"id": 2}],
            "meta": {"current_page": 2, "last_page": 5, "per_page": 2, "total": 10},
            "links": {"next": "http://x/users?page=3"}
        }))
        .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.meta.current_page, 2);
        assert_eq!(page.meta.total, 10);
        assert!(page.meta.has_next());
        assert!(page.meta.has_previous());
    }

    #[test]
    fn test_healthcare_nested_paginator() {
        let page = unwrap_page(json!({
            "success": true,
            "data": {
                "data": [{"id": 7}],
                "current_page": 1,
                "last_page": 1,
                "per_page": "15",
                "total": 1
            },
            "message": "Clinics retrieved"
        }))
        .unwrap();
        assert_eq!(page.items, vec![json!({"id": 7})]);
        assert_eq!(page.meta.per_page, 15);
    }

    #[test]
    fn test_healthcare_flat_array_with_meta() {
        let page = unwrap_page(json!({
            "success": true,
            "data": [{"id": 1}, {"id": 2}, {"id": 3}],
            "meta": {"current_page": 1, "last_page": 2, "per_page": 3, "total": 5}
        }))
        .unwrap();
        assert_eq!(page.meta.last_page, 2);
    }

    #[test]
    fn test_bare_array_is_one_page() {
        let page = unwrap_page(json!([{"id": 1}])).unwrap();
        assert_eq!(page.meta, PageMeta::single(1));
        assert!(!page.meta.has_next());
    }

    #[test]
    fn test_unsuccessful_envelope() {
        let err = unwrap_page(json!({"success": false, "message": "Clinic is closed"})).unwrap_err();
        assert_eq!(err.to_string(), "unexpected response: Clinic is closed");
    }

    #[test]
    fn test_unwrap_item_shapes() {
        assert_eq!(
            unwrap_item(json!({"success": true, "data": {"id": 1}})).unwrap(),
            json!({"id": 1})
        );
        assert_eq!(unwrap_item(json!({"data": {"id": 2}})).unwrap(), json!({"id": 2}));
        // A record that happens to have a `data` field stays intact
        assert_eq!(
            unwrap_item(json!({"id": 3, "data": "x"})).unwrap(),
            json!({"id": 3, "data": "x"})
        );
    }
}
