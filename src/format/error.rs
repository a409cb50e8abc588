//! Error types for interchange document operations.

use thiserror::Error;

/// Errors that can occur while reading or writing interchange documents.
#[derive(Error, Debug)]
pub enum FormatError {
    /// XML parsing or serialization error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Invalid document structure or content
    #[error("Invalid document: {message}")]
    InvalidDocument {
        /// Description of the problem
        message: String,
    },

    /// Required field is missing
    #[error("Missing required field: {field}")]
    MissingField {
        /// Name of the missing field
        field: String,
    },
}

impl FormatError {
    /// Create an invalid document error with a message.
    pub fn invalid_document(message: impl Into<String>) -> Self {
        Self::InvalidDocument {
            message: message.into(),
        }
    }

    /// Create a missing field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }
}
