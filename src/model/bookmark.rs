//! Outline bookmarks, consumed by the interchange exporter.

use serde::{Deserialize, Serialize};

use crate::geometry::DocPoint;

/// A named destination in the document outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub title: String,
    /// 0-based page index.
    pub page_index: u32,
    /// Optional destination point on the page, in document space.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<DocPoint>,
}

impl Bookmark {
    pub fn new(title: impl Into<String>, page_index: u32) -> Self {
        Self {
            title: title.into(),
            page_index,
            destination: None,
        }
    }

    pub fn with_destination(mut self, destination: DocPoint) -> Self {
        self.destination = Some(destination);
        self
    }
}
