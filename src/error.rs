//! Error types for gvfsmeta
//!
//! Provides a unified error type for all operations.

use std::str::Utf8Error;

use thiserror::Error;

/// Result type alias using MetaError
pub type Result<T> = std::result::Result<T, MetaError>;

/// Unified error type for gvfsmeta operations
#[derive(Debug, Error)]
pub enum MetaError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Format Errors (file is not a metadata tree we can read)
    // -------------------------------------------------------------------------
    #[error("Bad magic: expected da1a6d657461, got {}", hex(.found))]
    BadMagic { found: [u8; 6] },

    #[error("Unsupported version {major}.{minor} (expected 1.0)")]
    UnsupportedVersion { major: u8, minor: u8 },

    // -------------------------------------------------------------------------
    // Bounds Errors (truncated or corrupt file)
    // -------------------------------------------------------------------------
    #[error("Read of {len} bytes at offset {offset} exceeds file size {size}")]
    OutOfBounds { offset: usize, len: usize, size: usize },

    #[error("Unterminated string at offset {offset}")]
    Unterminated { offset: usize },

    #[error("Tree deeper than {limit} levels")]
    TooDeep { limit: usize },

    // -------------------------------------------------------------------------
    // Decode Errors (recoverable per field)
    // -------------------------------------------------------------------------
    #[error("Invalid UTF-8 in string at offset {offset}: {source}")]
    InvalidUtf8 {
        offset: usize,
        #[source]
        source: Utf8Error,
    },

    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(&'static str),

    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    #[error("No such entry: {0}")]
    NotFound(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MetaError {
    /// The file is not a metadata tree this decoder understands
    pub fn is_format_error(&self) -> bool {
        matches!(self, Self::BadMagic { .. } | Self::UnsupportedVersion { .. })
    }

    /// The file claims the format but its offsets cannot be trusted
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::OutOfBounds { .. } | Self::Unterminated { .. } | Self::TooDeep { .. }
        )
    }

    pub fn is_decode_error(&self) -> bool {
        matches!(self, Self::InvalidUtf8 { .. })
    }

    /// Whether a consumer probing many candidate files should drop this
    /// candidate and keep going
    pub fn skips_candidate(&self) -> bool {
        self.is_format_error() || self.is_corruption()
    }

    /// Errno reported to the kernel for this error
    #[cfg(feature = "fuse")]
    pub fn to_errno(&self) -> libc::c_int {
        match self {
            Self::Io(err) => err.raw_os_error().unwrap_or(libc::EIO),
            Self::NotFound(_) => libc::ENOENT,
            Self::UnsupportedFeature(_) => libc::EOPNOTSUPP,
            Self::Config(_) => libc::EINVAL,
            Self::BadMagic { .. }
            | Self::UnsupportedVersion { .. }
            | Self::OutOfBounds { .. }
            | Self::Unterminated { .. }
            | Self::TooDeep { .. }
            | Self::InvalidUtf8 { .. } => libc::EIO,
        }
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
