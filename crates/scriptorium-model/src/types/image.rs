//! Images stored under the project's image directory

use super::Fields;
use crate::error::ResourceError;
use crate::kind::ResourceKind;
use crate::schema::FieldValue;
use once_cell::unsync::OnceCell;
use std::path::Path;

/// Image file owned by the project
///
/// The file payload is read on first access and cached for the lifetime of
/// the resource. A missing file only surfaces at that point.
#[derive(Debug, Clone, Default)]
pub struct Image {
    /// File extension of the stored image (`png`, `jpg`, ...)
    pub format: String,
    payload: OnceCell<Vec<u8>>,
}

impl Image {
    /// Create image payload for a stored format
    #[must_use]
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            payload: OnceCell::new(),
        }
    }

    /// Raw file bytes, read from `path` on first call
    ///
    /// # Errors
    /// Returns the I/O error (typically `NotFound`) when the file cannot be read
    pub fn bytes(&self, path: &Path) -> std::io::Result<&[u8]> {
        self.payload
            .get_or_try_init(|| {
                tracing::debug!("Loading image from {}", path.display());
                std::fs::read(path)
            })
            .map(Vec::as_slice)
    }

    /// Whether the payload has been loaded already
    #[inline]
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.payload.get().is_some()
    }
}

impl PartialEq for Image {
    fn eq(&self, other: &Self) -> bool {
        self.format == other.format
    }
}

impl Eq for Image {}

impl Fields for Image {
    const KIND: ResourceKind = ResourceKind::Image;

    fn read(&self, name: &str) -> Option<FieldValue> {
        match name {
            "format" => Some(FieldValue::Text(self.format.clone())),
            _ => None,
        }
    }

    fn write(&mut self, name: &'static str, value: FieldValue) -> Result<(), ResourceError> {
        match (name, value) {
            ("format", FieldValue::Text(format)) => {
                self.format = format;
                self.payload = OnceCell::new();
                Ok(())
            }
            _ => Err(Self::mismatch(name, "text")),
        }
    }
}
