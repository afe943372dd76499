//! File record data model for the registry.

use crate::identity::Identity;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a registered file.
///
/// IDs are assigned from a single monotonic sequence; an ID identifies its
/// record for the lifetime of the registry and is never reused after the
/// record is deleted. ID 0 is never assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(pub u64);

impl FileId {
    /// Get the underlying integer.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Coarse file category, derived client-side from the file extension at
/// upload time and stored verbatim. The registry never re-derives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Image,
    Document,
    Video,
    Audio,
    Other,
}

/// Error returned when a file type string is not one of the known categories.
#[derive(Debug, thiserror::Error)]
#[error("unknown file type: {0}")]
pub struct UnknownFileType(pub String);

impl FromStr for FileType {
    type Err = UnknownFileType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(FileType::Image),
            "document" => Ok(FileType::Document),
            "video" => Ok(FileType::Video),
            "audio" => Ok(FileType::Audio),
            "other" => Ok(FileType::Other),
            unknown => Err(UnknownFileType(unknown.to_string())),
        }
    }
}

impl FileType {
    /// The lowercase name stored and served for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Image => "image",
            FileType::Document => "document",
            FileType::Video => "video",
            FileType::Audio => "audio",
            FileType::Other => "other",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied fields for a new file record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFile {
    /// Display name, required.
    pub file_name: String,

    /// Client-derived category, stored verbatim.
    pub file_type: FileType,

    /// Opaque reference into the external content store. Required; the
    /// registry never fetches or validates the referenced bytes.
    pub content_hash: String,

    /// Byte count as reported by the caller, not independently verified.
    pub file_size: u64,

    /// Whether the record is listed publicly.
    pub is_public: bool,

    /// Optional free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Ordered tags; duplicates permitted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl NewFile {
    /// Validate the caller-supplied fields.
    pub fn validate(&self) -> Result<(), String> {
        if self.file_name.is_empty() {
            return Err("file name is required".to_string());
        }

        if self.file_name.len() > 256 {
            return Err("file name too long (max 256 chars)".to_string());
        }

        if self.content_hash.is_empty() {
            return Err("content hash is required".to_string());
        }

        if let Some(description) = &self.description {
            if description.len() > 1024 {
                return Err("description too long (max 1024 chars)".to_string());
            }
        }

        if self.tags.len() > 32 {
            return Err("too many tags (max 32)".to_string());
        }

        for tag in &self.tags {
            if tag.is_empty() || tag.len() > 64 {
                return Err("tag must be 1-64 characters".to_string());
            }
        }

        Ok(())
    }
}

/// Metadata record for one registered file.
///
/// All fields except `is_public` and `deleted_at_us` are immutable for the
/// record's lifetime. The record never contains file content; `content_hash`
/// is the only link to the external blob store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Unique, never-reused identifier.
    pub id: FileId,

    /// Identity that created the record. Immutable.
    pub owner: Identity,

    /// Display name.
    pub file_name: String,

    /// Client-derived category.
    pub file_type: FileType,

    /// Opaque reference into the external content store.
    pub content_hash: String,

    /// Caller-asserted size in bytes.
    pub file_size: u64,

    /// Registry-assigned creation timestamp (microseconds, monotonic).
    pub upload_time_us: u64,

    /// Whether the record is listed publicly. Mutable only by `owner`.
    pub is_public: bool,

    /// Optional free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Ordered tags; duplicates permitted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Deletion timestamp. A tombstoned record stays out of every
    /// enumeration but keeps its ID reserved forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at_us: Option<u64>,
}

impl FileRecord {
    /// Whether the record has been deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at_us.is_some()
    }
}
