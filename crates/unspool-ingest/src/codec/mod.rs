//! Archive codecs.
//!
//! # Design
//! - Each supported format sits behind [`ArchiveCodec`], which can list entry
//!   names without extracting and extract everything under a target folder.
//! - [`CodecRegistry`] picks the codec from the file extension; codecs can be
//!   swapped, for example to point RAR handling at a specific tool.

mod rar;
mod zip;

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use unspool_config::validate::path_extension;

use crate::error::{IngestError, IngestResult};

pub use self::rar::{RAR_INSTALL_HINT, RarCodec};
pub use self::zip::ZipCodec;

/// Archive formats recognised by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    /// `.zip`
    Zip,
    /// `.rar`, including the first volume of a multi-part set.
    Rar,
}

impl ArchiveFormat {
    /// Detect the format from the final extension, case-insensitively.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path_extension(path)?.as_str() {
            "zip" => Some(Self::Zip),
            "rar" => Some(Self::Rar),
            _ => None,
        }
    }

    /// Upper-case label used in progress lines.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Zip => "ZIP",
            Self::Rar => "RAR",
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Reader for one archive format.
pub trait ArchiveCodec: Send + Sync {
    /// Format handled by this codec.
    fn format(&self) -> ArchiveFormat;

    /// Entry names as stored in the archive, without extracting.
    ///
    /// # Errors
    ///
    /// Returns an error when the archive cannot be opened or decoded.
    fn list_entries(&self, archive: &Path) -> IngestResult<Vec<String>>;

    /// Extract every entry beneath `target`, creating it when missing.
    ///
    /// # Errors
    ///
    /// Returns an error when decoding or writing fails, or when an entry would
    /// land outside `target`.
    fn extract_all(&self, archive: &Path, target: &Path) -> IngestResult<()>;
}

/// Codec lookup by format.
#[derive(Clone)]
pub struct CodecRegistry {
    codecs: HashMap<ArchiveFormat, Arc<dyn ArchiveCodec>>,
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("formats", &self.codecs.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::empty()
            .with_codec(Arc::new(ZipCodec))
            .with_codec(Arc::new(RarCodec::discover()))
    }
}

impl CodecRegistry {
    /// Registry with no codecs installed.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            codecs: HashMap::new(),
        }
    }

    /// Install `codec`, replacing any codec for the same format.
    #[must_use]
    pub fn with_codec(mut self, codec: Arc<dyn ArchiveCodec>) -> Self {
        self.codecs.insert(codec.format(), codec);
        self
    }

    /// Codec responsible for `path`.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::UnsupportedFormat`] when the extension is not a
    /// known archive type or no codec is installed for it.
    pub fn for_path(&self, path: &Path) -> IngestResult<Arc<dyn ArchiveCodec>> {
        ArchiveFormat::from_path(path)
            .and_then(|format| self.codecs.get(&format).cloned())
            .ok_or_else(|| IngestError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: path_extension(path),
            })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_detection_is_case_insensitive() {
        assert_eq!(
            ArchiveFormat::from_path(Path::new("a/B.ZIP")),
            Some(ArchiveFormat::Zip)
        );
        assert_eq!(
            ArchiveFormat::from_path(Path::new("set.part1.Rar")),
            Some(ArchiveFormat::Rar)
        );
        assert_eq!(ArchiveFormat::from_path(Path::new("notes.txt")), None);
        assert_eq!(ArchiveFormat::from_path(Path::new("zip")), None);
    }

    #[test]
    fn registry_rejects_unknown_extensions() {
        let registry = CodecRegistry::default();
        assert!(registry.for_path(Path::new("x.zip")).is_ok());
        assert!(matches!(
            registry.for_path(Path::new("x.7z")),
            Err(IngestError::UnsupportedFormat { extension: Some(ref ext), .. }) if ext == "7z"
        ));
        assert!(matches!(
            CodecRegistry::empty().for_path(Path::new("x.zip")),
            Err(IngestError::UnsupportedFormat { .. })
        ));
    }
}
