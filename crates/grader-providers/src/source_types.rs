//! Essay source-type registry
//!
//! Essays arrive as typed text, uploaded documents or photos. The manager
//! knows which kinds are enabled and maps an upload to its kind.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use grader_domain::error::{Error, Result};
use grader_domain::ports::{ManagedService, MetricsSource};
use serde::Serialize;

/// One kind of essay source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceType {
    /// Type name (e.g. `image`)
    pub name: &'static str,
    /// Human readable description
    pub description: &'static str,
    /// File extensions mapped to this type, lowercase without dot
    pub extensions: &'static [&'static str],
}

static KNOWN_SOURCE_TYPES: [SourceType; 4] = [
    SourceType {
        name: "text",
        description: "Essay typed or pasted as plain text",
        extensions: &["txt", "md"],
    },
    SourceType {
        name: "file",
        description: "Word processor document",
        extensions: &["doc", "docx", "rtf"],
    },
    SourceType {
        name: "image",
        description: "Photo or scan of a handwritten essay",
        extensions: &["png", "jpg", "jpeg", "webp"],
    },
    SourceType {
        name: "pdf",
        description: "PDF document",
        extensions: &["pdf"],
    },
];

/// Registry of enabled essay source types
pub struct SourceTypeManager {
    enabled: BTreeMap<&'static str, SourceType>,
    resolutions: AtomicU64,
}

impl SourceTypeManager {
    /// Enable the named source types
    ///
    /// Unknown names are rejected.
    pub fn new<S: AsRef<str>>(enabled: &[S]) -> Result<Self> {
        let mut map = BTreeMap::new();
        for name in enabled {
            let name = name.as_ref();
            let source_type = KNOWN_SOURCE_TYPES
                .iter()
                .find(|t| t.name == name)
                .ok_or_else(|| Error::invalid_argument(format!("Unknown source type '{name}'")))?;
            map.insert(source_type.name, source_type.clone());
        }
        Ok(Self {
            enabled: map,
            resolutions: AtomicU64::new(0),
        })
    }

    /// Check if a source type is enabled
    pub fn is_supported(&self, name: &str) -> bool {
        self.enabled.contains_key(name)
    }

    /// Enabled source types in name order
    pub fn list(&self) -> Vec<&SourceType> {
        self.enabled.values().collect()
    }

    /// Map a type name or file name to an enabled source type
    pub fn resolve(&self, source: &str) -> Option<&SourceType> {
        self.resolutions.fetch_add(1, Ordering::Relaxed);
        if let Some(source_type) = self.enabled.get(source) {
            return Some(source_type);
        }
        let extension = source.rsplit_once('.')?.1.to_ascii_lowercase();
        self.enabled
            .values()
            .find(|t| t.extensions.contains(&extension.as_str()))
    }
}

impl MetricsSource for SourceTypeManager {
    fn metrics(&self) -> Result<serde_json::Value> {
        Ok(serde_json::json!({
            "enabled": self.enabled.keys().collect::<Vec<_>>(),
            "resolutions": self.resolutions.load(Ordering::Relaxed),
        }))
    }
}

impl ManagedService for SourceTypeManager {
    fn as_metrics_source(&self) -> Option<&dyn MetricsSource> {
        Some(self)
    }
}
