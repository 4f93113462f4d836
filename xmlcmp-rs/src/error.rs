//! Error types for xmlcmp.
//!
//! Every variant describes a document that could not be turned into a
//! comparable tree. Differences between two well-formed documents are never
//! errors; they are reported through [`crate::ComparisonResult`].

use thiserror::Error;

/// Result type alias for xmlcmp operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading or parsing a document.
#[derive(Error, Debug)]
pub enum Error {
    /// No document exists at the resolved path.
    #[error("Resource not found: {path}")]
    ResourceNotFound {
        /// Logical path as given by the caller.
        path: String,
    },

    /// Reading the document failed.
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// Logical path as given by the caller.
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid UTF-8.
    #[error("{path} is not valid UTF-8: {source}")]
    Decode {
        /// Logical path as given by the caller.
        path: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// The document is not well-formed XML.
    #[error("Malformed XML in {path} at line {line}, column {column}: {message}")]
    MalformedXml {
        /// Logical path of the document.
        path: String,
        /// 1-based line of the error.
        line: usize,
        /// 1-based column (in characters) of the error.
        column: usize,
        /// Parser message.
        message: String,
    },
}

impl Error {
    /// Returns the logical path of the document this error refers to.
    pub fn path(&self) -> &str {
        match self {
            Error::ResourceNotFound { path }
            | Error::Io { path, .. }
            | Error::Decode { path, .. }
            | Error::MalformedXml { path, .. } => path,
        }
    }

    /// Returns true if the document itself is broken (undecodable or not
    /// well-formed), as opposed to missing or unreadable.
    pub fn is_broken_document(&self) -> bool {
        matches!(self, Error::Decode { .. } | Error::MalformedXml { .. })
    }
}
