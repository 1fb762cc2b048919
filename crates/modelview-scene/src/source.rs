//! Model sources: remote URLs pass through, local data is inlined.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// MIME type assumed for inlined model data.
pub const GLTF_BINARY_MIME: &str = "model/gltf-binary";

/// Where a model comes from before it is handed to the viewer as `src`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModelSource {
    /// A URL (or any string) used as-is.
    Url(String),
    /// A local file, read and embedded as a data URI.
    Path(PathBuf),
    /// Raw model bytes, embedded as a data URI.
    Bytes(Vec<u8>),
}

#[derive(Debug)]
pub enum SourceError {
    Read { path: PathBuf, source: io::Error },
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read model file '{}': {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
        }
    }
}

impl ModelSource {
    /// Turn the source into a string suitable for the viewer's `src`.
    pub fn resolve(&self) -> Result<String, SourceError> {
        self.resolve_with_mime(GLTF_BINARY_MIME)
    }

    pub fn resolve_with_mime(&self, mime: &str) -> Result<String, SourceError> {
        match self {
            Self::Url(url) => Ok(url.clone()),
            Self::Path(path) => {
                let bytes = read_model(path)?;
                Ok(data_uri(mime, &bytes))
            }
            Self::Bytes(bytes) => Ok(data_uri(mime, bytes)),
        }
    }
}

impl From<&str> for ModelSource {
    fn from(url: &str) -> Self {
        Self::Url(url.to_string())
    }
}

impl From<String> for ModelSource {
    fn from(url: String) -> Self {
        Self::Url(url)
    }
}

impl From<PathBuf> for ModelSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<Vec<u8>> for ModelSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

/// `data:<mime>;base64,<payload>` with standard, padded base64.
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

fn read_model(path: &Path) -> Result<Vec<u8>, SourceError> {
    std::fs::read(path).map_err(|source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    })
}
