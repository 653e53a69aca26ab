//! File categories and the display-category remapping pass.
//!
//! A file record arrives with a raw `file_type` (`video`, `audio`, ...) and a
//! set of tags. Before rendering, the display category is chosen from the
//! tags using [`CategoryTable`] (first match in table order wins), falling
//! back to [`FallbackTypeTable`] when no tag matched.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Media host assigned to every remapped record unless configured otherwise.
pub const DEFAULT_IMAGE_SERVER: &str = "images.torrents.com";

/// One display category and the tag that selects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub name: String,
    pub query: String,
}

/// Ordered category table. Order is significant: a record carrying several
/// category tags is assigned the first category listed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CategoryTable {
    entries: Vec<Category>,
}

impl CategoryTable {
    pub fn new(entries: &[(&str, &str)]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|(name, query)| Category {
                    name: (*name).to_string(),
                    query: (*query).to_string(),
                })
                .collect(),
        }
    }

    pub fn entries(&self) -> &[Category] {
        &self.entries
    }

    /// First category whose tag query appears in `tags`.
    pub fn match_tags(&self, tags: &[String]) -> Option<&Category> {
        self.entries
            .iter()
            .find(|category| tags.iter().any(|tag| *tag == category.query))
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::new(&[
            ("movies", "movie"),
            ("games", "game"),
            ("tv", "series"),
            ("music", "audio"),
            ("anime", "anime"),
            ("books", "ebook"),
            ("adult", "porn"),
            ("software", "software"),
            ("mobile", "mobile"),
            ("pictures", "image"),
        ])
    }
}

/// Raw type → category used when tags did not decide the category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackTypeTable {
    entries: Vec<(String, String)>,
}

impl FallbackTypeTable {
    pub fn lookup(&self, file_type: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(raw, _)| raw == file_type)
            .map(|(_, category)| category.as_str())
    }
}

impl Default for FallbackTypeTable {
    fn default() -> Self {
        // "picture" maps to "image", not "pictures": the image views key on it.
        let entries = [
            ("video", "movies"),
            ("document", "books"),
            ("audio", "music"),
            ("picture", "image"),
        ];
        Self {
            entries: entries
                .iter()
                .map(|(raw, category)| ((*raw).to_string(), (*category).to_string()))
                .collect(),
        }
    }
}

/// Display metadata for one file.
///
/// Only the fields the remapping pass touches are typed; everything else
/// produced by the metadata store is carried through in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileView {
    pub file_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_image_server: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A file record as handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub view: FileView,

    /// Taken down; the address answers 410.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub removed: bool,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Turns a raw file record into the payload the file view renders.
///
/// Implementations may annotate the input record as well as produce the
/// payload; callers must treat both as outputs.
pub trait FileRenderer: Send + Sync {
    fn render(&self, record: &mut FileRecord) -> FileRecord;
}

/// Base renderer: the payload is a snapshot of the record as received.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotRenderer;

impl FileRenderer for SnapshotRenderer {
    fn render(&self, record: &mut FileRecord) -> FileRecord {
        record.clone()
    }
}

/// Wraps a base renderer and reassigns the display category afterwards.
///
/// The category is written to the *input* record after the base renderer
/// has produced its payload, so the returned payload keeps the base
/// renderer's `file_type`. Consumers that need the display category read it
/// back from the record.
pub struct CategoryRemapper<R> {
    base: R,
    categories: Arc<CategoryTable>,
    fallbacks: Arc<FallbackTypeTable>,
    image_server: String,
}

impl<R: FileRenderer> CategoryRemapper<R> {
    pub fn new(
        base: R,
        categories: Arc<CategoryTable>,
        fallbacks: Arc<FallbackTypeTable>,
        image_server: impl Into<String>,
    ) -> Self {
        Self {
            base,
            categories,
            fallbacks,
            image_server: image_server.into(),
        }
    }

    fn remap(&self, record: &mut FileRecord, tags: &[String]) {
        let original = record.view.file_type.clone();

        if let Some(category) = self.categories.match_tags(tags) {
            record.view.file_type.clone_from(&category.name);
        }

        if record.view.file_type == original
            && let Some(fallback) = self.fallbacks.lookup(&original)
        {
            record.view.file_type = fallback.to_string();
        }

        record.view.first_image_server = Some(self.image_server.clone());
    }
}

impl<R: FileRenderer> FileRenderer for CategoryRemapper<R> {
    fn render(&self, record: &mut FileRecord) -> FileRecord {
        let payload = self.base.render(record);
        let tags = payload.view.tags.clone().unwrap_or_default();
        self.remap(record, &tags);
        payload
    }
}
