//! Error types for XAML scene loading
//!
//! The loader is deliberately permissive: malformed numbers, missing
//! attributes and unresolved resource keys are repaired or skipped rather
//! than reported. The errors in this module therefore only cover the
//! conditions the loader cannot recover from on its own.
//!
//! # Error Codes
//!
//! Error codes follow the pattern: `E<category><number>`
//!
//! Categories:
//! - **E1xxx**: Fetch errors
//! - **E2xxx**: XML parsing and document structure errors
//!
//! ## Error Codes
//!
//! - `E1002`: A document or texture fetch failed
//! - `E2001`: XML parsing error
//! - `E2002`: XML attribute error
//! - `E2003`: Invalid XML structure
//! - `E2004`: Unsupported document text encoding

use thiserror::Error;

/// Result type for XAML loading operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when loading XAML documents
#[derive(Error, Debug)]
pub enum Error {
    /// A collaborator failed to fetch a document or texture
    ///
    /// **Error Code**: E1002
    ///
    /// The reason is passed through verbatim from the loading facility. The
    /// filesystem loaders report I/O failures this way, with the OS error as
    /// the reason.
    #[error("[E1002] Failed to fetch '{url}': {reason}")]
    Fetch {
        /// URL that could not be fetched
        url: String,
        /// Reason reported by the loading facility
        reason: String,
    },

    /// XML parsing error
    ///
    /// **Error Code**: E2001
    ///
    /// **Common Causes**:
    /// - Malformed XML syntax
    /// - Unclosed tags
    #[error("[E2001] XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// XML attribute error
    ///
    /// **Error Code**: E2002
    ///
    /// **Common Causes**:
    /// - Attribute without a value
    /// - Duplicate attribute
    /// - Unescapable entity in an attribute value
    #[error("[E2002] XML attribute error: {0}")]
    XmlAttr(String),

    /// Invalid XML structure
    ///
    /// **Error Code**: E2003
    ///
    /// **Common Causes**:
    /// - End tag without a matching start tag
    /// - Document without a root element
    #[error("[E2003] Invalid XML: {0}")]
    InvalidXml(String),

    /// Document bytes are not valid UTF-8 or BOM-marked UTF-16
    ///
    /// **Error Code**: E2004
    #[error("[E2004] Unsupported document encoding: {0}")]
    Encoding(String),
}

impl Error {
    /// Create a fetch error for the given URL
    pub fn fetch(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Fetch {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Get the error code of this error
    pub fn code(&self) -> &'static str {
        match self {
            Error::Fetch { .. } => "E1002",
            Error::Xml(_) => "E2001",
            Error::XmlAttr(_) => "E2002",
            Error::InvalidXml(_) => "E2003",
            Error::Encoding(_) => "E2004",
        }
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlAttr(err.to_string())
    }
}
