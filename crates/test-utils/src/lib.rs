//! appweb test utilities.
//!
//! Helpers for integration testing: file record fixtures, revision
//! manifests and assertion utilities for rendered pages.

use std::io;
use std::path::Path;

use serde_json::Value as JsonValue;

/// Create a test file record with the given stored type and no tags.
pub fn test_file(id: &str, file_type: &str) -> TestFile {
    TestFile {
        id: id.to_string(),
        file_type: file_type.to_string(),
        tags: None,
        view_fields: serde_json::json!({}),
        fields: serde_json::json!({}),
    }
}

/// A file record builder for creating store fixtures.
#[derive(Debug, Clone)]
pub struct TestFile {
    pub id: String,
    pub file_type: String,
    pub tags: Option<Vec<String>>,
    /// Extra keys placed inside `view`.
    pub view_fields: JsonValue,
    /// Extra top-level keys.
    pub fields: JsonValue,
}

impl TestFile {
    /// Add a tag (creates the tag list on first use).
    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.get_or_insert_with(Vec::new).push(tag.to_string());
        self
    }

    /// Set an empty tag list.
    pub fn with_empty_tags(mut self) -> Self {
        self.tags = Some(Vec::new());
        self
    }

    /// Set the display title.
    pub fn with_title(self, title: &str) -> Self {
        self.with_view_field("title", JsonValue::String(title.to_string()))
    }

    /// Add a key to the view.
    pub fn with_view_field(mut self, name: &str, value: JsonValue) -> Self {
        if let Some(obj) = self.view_fields.as_object_mut() {
            obj.insert(name.to_string(), value);
        }
        self
    }

    /// Mark the record as taken down.
    pub fn removed(self) -> Self {
        self.with_field("removed", JsonValue::Bool(true))
    }

    /// Add a top-level key to the record.
    pub fn with_field(mut self, name: &str, value: JsonValue) -> Self {
        if let Some(obj) = self.fields.as_object_mut() {
            obj.insert(name.to_string(), value);
        }
        self
    }

    /// The record as stored on disk.
    pub fn to_json(&self) -> JsonValue {
        let mut view = serde_json::Map::new();
        view.insert("file_type".to_string(), JsonValue::String(self.file_type.clone()));
        if let Some(tags) = &self.tags {
            view.insert("tags".to_string(), serde_json::json!(tags));
        }
        if let Some(extra) = self.view_fields.as_object() {
            view.extend(extra.clone());
        }

        let mut record = serde_json::Map::new();
        record.insert("view".to_string(), JsonValue::Object(view));
        if let Some(extra) = self.fields.as_object() {
            record.extend(extra.clone());
        }
        JsonValue::Object(record)
    }

    /// Write the record as `<dir>/<id>.json`.
    pub fn write_to(&self, dir: &Path) -> io::Result<()> {
        std::fs::create_dir_all(dir)?;
        std::fs::write(dir.join(format!("{}.json", self.id)), self.to_json().to_string())
    }
}

/// Revision manifest contents with one record per line.
pub fn revision_manifest(records: &[&str]) -> String {
    let mut manifest = records.join("\n");
    manifest.push('\n');
    manifest
}

/// Assertion helpers for rendered responses.
pub mod assert {
    use serde_json::Value;

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{key}', got: {value}"
        );
    }

    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{needle}'\nActual: {haystack}"
        );
    }

    /// Assert that a string does not contain a substring.
    pub fn not_contains(haystack: &str, needle: &str) {
        assert!(
            !haystack.contains(needle),
            "Expected string to NOT contain '{needle}'\nActual: {haystack}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_builder() {
        let file = test_file("abc", "video")
            .with_tag("ebook")
            .with_tag("pdf")
            .with_title("Rust book")
            .with_field("size", serde_json::json!(1024));

        let json = file.to_json();
        assert_eq!(json["view"]["file_type"], "video");
        assert_eq!(json["view"]["tags"], serde_json::json!(["ebook", "pdf"]));
        assert_eq!(json["view"]["title"], "Rust book");
        assert_eq!(json["size"], 1024);
        assert!(json.get("removed").is_none());
    }

    #[test]
    fn removed_file_is_flagged_at_top_level() {
        let json = test_file("gone", "video").removed().to_json();
        assert_eq!(json["removed"], true);
    }

    #[test]
    fn untagged_file_has_no_tags_key() {
        let json = test_file("abc", "audio").to_json();
        assert!(json["view"].get("tags").is_none());

        let json = test_file("abc", "audio").with_empty_tags().to_json();
        assert_eq!(json["view"]["tags"], serde_json::json!([]));
    }

    #[test]
    fn manifest_lines() {
        assert_eq!(revision_manifest(&["a", "b"]), "a\nb\n");
    }

    #[test]
    fn test_assertions() {
        let json = serde_json::json!({"name": "test"});
        assert::has_key(&json, "name");
        assert::contains("hello world", "world");
        assert::not_contains("hello world", "foo");
    }
}
