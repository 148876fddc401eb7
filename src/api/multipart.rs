//! Multipart form encoding
//!
//! Request bodies are flattened to form fields the way the backend's form
//! parser expects: arrays become `key[0]`, `key[1]`, objects become
//! `key[field]`, booleans are sent as `1`/`0` and nulls are omitted.

use serde::Serialize;
use serde_json::Value;
use std::path::Path;

/// A file attached to a form
#[derive(Debug, Clone, PartialEq)]
pub struct FileUpload {
    pub field: String,
    pub file_name: String,
    pub mime: String,
    pub content: Vec<u8>,
}

impl FileUpload {
    pub fn new(field: &str, file_name: &str, content: Vec<u8>) -> Self {
        Self {
            field: field.to_string(),
            file_name: file_name.to_string(),
            mime: mime_for(file_name).to_string(),
            content,
        }
    }

    /// Read a file from disk for upload under `field`
    pub fn from_path(field: &str, path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(field, &file_name, content))
    }
}

fn mime_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

/// Flattened text fields plus attached files
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormBody {
    fields: Vec<(String, String)>,
    files: Vec<FileUpload>,
}

impl FormBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten a typed request body into form fields
    pub fn from_payload<T: Serialize>(payload: &T) -> Result<Self, serde_json::Error> {
        let value = serde_json::to_value(payload)?;
        let mut form = Self::new();
        match value {
            Value::Object(map) => {
                for (key, value) in map {
                    flatten(&key, &value, &mut form.fields);
                }
            }
            Value::Null => {}
            other => flatten("data", &other, &mut form.fields),
        }
        Ok(form)
    }

    pub fn text(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields.push((key.to_string(), value.into()));
        self
    }

    pub fn file(mut self, file: FileUpload) -> Self {
        self.files.push(file);
        self
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn files(&self) -> &[FileUpload] {
        &self.files
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

fn flatten(key: &str, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Bool(b) => out.push((key.to_string(), if *b { "1" } else { "0" }.to_string())),
        Value::Number(n) => out.push((key.to_string(), n.to_string())),
        Value::String(s) => out.push((key.to_string(), s.clone())),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                flatten(&format!("{}[{}]", key, i), item, out);
            }
        }
        Value::Object(map) => {
            for (field, item) in map {
                flatten(&format!("{}[{}]", key, field), item, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flattening_rules() {
        let form = FormBody::from_payload(&json!({
            "name": "City Medical Center",
            "is_active": true,
            "company_id": 4,
            "phone": null,
            "roles": ["admin", "doctor"],
            "vital_signs": {"heart_rate": 72, "blood_pressure": "120/80"}
        }))
        .unwrap();

        assert_eq!(form.field("name"), Some("City Medical Center"));
        assert_eq!(form.field("is_active"), Some("1"));
        assert_eq!(form.field("company_id"), Some("4"));
        assert_eq!(form.field("phone"), None);
        assert_eq!(form.field("roles[0]"), Some("admin"));
        assert_eq!(form.field("roles[1]"), Some("doctor"));
        assert_eq!(form.field("vital_signs[heart_rate]"), Some("72"));
        assert_eq!(form.field("vital_signs[blood_pressure]"), Some("120/80"));
    }

    #[test]
    fn test_false_is_zero() {
        let form = FormBody::from_payload(&json!({"is_active": false})).unwrap();
        assert_eq!(form.fields(), &[("is_active".to_string(), "0".to_string())]);
    }

    #[test]
    fn test_field_order_follows_payload() {
        let form = FormBody::from_payload(&json!({
            "name": "Harbor",
            "roles": ["admin", "doctor"],
            "is_active": false
        }))
        .unwrap();
        let rendered: Vec<String> = form
            .fields()
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        insta::assert_snapshot!(rendered.join("&"), @"name=Harbor&roles[0]=admin&roles[1]=doctor&is_active=0");
    }

    #[test]
    fn test_file_mime() {
        let file = FileUpload::new("photo", "front.JPG", vec![1, 2, 3]);
        assert_eq!(file.mime, "image/jpeg");
        let form = FormBody::new().text("_method", "PUT").file(file);
        assert_eq!(form.files().len(), 1);
        assert_eq!(FileUpload::new("doc", "scan", vec![]).mime, "application/octet-stream");
    }
}
