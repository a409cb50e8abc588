//! Interchange document import/export.
//!
//! Annotations are exchanged as XFDF, the XML companion format PDF tools
//! use to merge annotations back into a source document. Export emits one
//! element per annotation plus an outline section for bookmarks; import is
//! forward-tolerant, skipping unknown or damaged elements with warnings
//! instead of failing the whole document.

mod error;
pub mod xfdf;

#[cfg(test)]
mod tests;

pub use error::FormatError;
pub use xfdf::{ImportReport, from_document, to_document};

/// Warning generated while importing an interchange document.
#[derive(Debug, Clone)]
pub struct FormatWarning {
    /// Element name the warning relates to, if known.
    pub element: Option<String>,

    /// Human-readable warning message.
    pub message: String,

    /// Severity level of the warning.
    pub severity: WarningSeverity,
}

impl FormatWarning {
    /// Create a new warning.
    pub fn new(message: impl Into<String>, severity: WarningSeverity) -> Self {
        Self {
            element: None,
            message: message.into(),
            severity,
        }
    }

    /// Create an info-level warning.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, WarningSeverity::Info)
    }

    /// Create a warning-level warning.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, WarningSeverity::Warning)
    }

    /// Create an error-level warning.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, WarningSeverity::Error)
    }

    /// Set the element name this warning relates to.
    pub fn with_element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }
}

/// Severity level for import warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    /// Informational message, not a problem.
    Info,
    /// Something was skipped or modified.
    Warning,
    /// The import stopped early or data integrity is affected.
    Error,
}
