//! Document loading.
//!
//! Documents are addressed by a logical path that is resolved against a
//! resource root, much like test resources on a classpath.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};

const UTF8_BOM: &str = "\u{feff}";

/// Textual XML content together with the logical path it was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    path: String,
    content: String,
}

impl Document {
    /// Creates a document from in-memory content.
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Document {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Returns the logical path of the document.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the full textual content.
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Resolves logical paths against a root directory and reads them.
#[derive(Debug, Clone)]
pub struct ResourceLoader {
    root: PathBuf,
}

impl Default for ResourceLoader {
    fn default() -> Self {
        Self::new(".")
    }
}

impl ResourceLoader {
    /// Creates a loader rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ResourceLoader { root: root.into() }
    }

    /// Returns the resource root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the filesystem path a logical path resolves to.
    ///
    /// Leading separators are ignored so `"/xml/a.xml"` and `"xml/a.xml"`
    /// name the same resource.
    pub fn resolve(&self, logical_path: &str) -> PathBuf {
        self.root
            .join(logical_path.trim_start_matches(['/', '\\']))
    }

    /// Loads the document at `logical_path`.
    ///
    /// The content must be valid UTF-8; a leading byte-order mark is
    /// dropped.
    pub fn load(&self, logical_path: &str) -> Result<Document> {
        let resolved = self.resolve(logical_path);
        debug!(path = logical_path, resolved = %resolved.display(), "loading document");

        if resolved.is_dir() {
            return Err(Error::ResourceNotFound {
                path: logical_path.to_string(),
            });
        }

        let bytes = std::fs::read(&resolved).map_err(|source| match source.kind() {
            ErrorKind::NotFound => Error::ResourceNotFound {
                path: logical_path.to_string(),
            },
            _ => Error::Io {
                path: logical_path.to_string(),
                source,
            },
        })?;

        let mut content = String::from_utf8(bytes).map_err(|source| Error::Decode {
            path: logical_path.to_string(),
            source,
        })?;
        if content.starts_with(UTF8_BOM) {
            content.drain(..UTF8_BOM.len());
        }

        debug!(path = logical_path, bytes = content.len(), "document loaded");
        Ok(Document::new(logical_path, content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_relative_to_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("xml")).unwrap();
        fs::write(dir.path().join("xml/control.xml"), "<root/>").unwrap();

        let loader = ResourceLoader::new(dir.path());
        let doc = loader.load("xml/control.xml").unwrap();
        assert_eq!(doc.path(), "xml/control.xml");
        assert_eq!(doc.content(), "<root/>");

        let doc = loader.load("/xml/control.xml").unwrap();
        assert_eq!(doc.content(), "<root/>");
    }

    #[test]
    fn test_missing_resource() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ResourceLoader::new(dir.path());
        match loader.load("nope.xml") {
            Err(Error::ResourceNotFound { path }) => assert_eq!(path, "nope.xml"),
            other => panic!("Expected ResourceNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_directory_is_not_a_resource() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("xml")).unwrap();
        let loader = ResourceLoader::new(dir.path());
        assert!(matches!(
            loader.load("xml"),
            Err(Error::ResourceNotFound { .. })
        ));
    }

    #[test]
    fn test_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.xml"), [b'<', b'a', b'>', 0xff, 0xfe]).unwrap();
        let loader = ResourceLoader::new(dir.path());
        let err = loader.load("bad.xml").unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
        assert!(err.is_broken_document());
    }

    #[test]
    fn test_bom_is_stripped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bom.xml"), "\u{feff}<root/>").unwrap();
        let loader = ResourceLoader::new(dir.path());
        assert_eq!(loader.load("bom.xml").unwrap().content(), "<root/>");
    }
}
