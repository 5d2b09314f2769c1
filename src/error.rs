//! Error types for the radeon-adl library

use std::io;
use thiserror::Error;

use crate::status::AdlStatus;

/// Main error type for ADL operations
#[derive(Error, Debug)]
pub enum AdlError {
    /// None of the candidate shared libraries could be loaded
    #[error("AMD Display Library not found (tried: {})", tried.join(", "))]
    LibraryNotFound {
        /// Library names or paths that were attempted, in order
        tried: Vec<String>,
    },

    /// The shared library exists but failed to load
    #[error("Failed to load {path}: {source}")]
    LibraryLoad {
        /// Path or name that was opened
        path: String,
        /// Loader error
        #[source]
        source: libloading::Error,
    },

    /// The loaded driver does not export the requested entry point
    #[error("Driver does not export {0}")]
    SymbolNotFound(&'static str),

    /// A driver call returned an error code
    #[error("{function} failed: {status}")]
    Status {
        /// Entry point that failed
        function: &'static str,
        /// Decoded return code
        status: AdlStatus,
    },

    /// No AMD adapter is present
    #[error("No AMD adapter found")]
    NoAdapter,

    /// Adapter index unknown to this context
    #[error("Invalid adapter index: {0}")]
    InvalidAdapter(i32),

    /// Invalid parameter or configuration
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Feature reported as unsupported by a capability query
    #[error("{0} is not supported on this adapter")]
    Unsupported(&'static str),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl AdlError {
    /// The driver status carried by this error, if any
    pub fn status(&self) -> Option<AdlStatus> {
        match self {
            AdlError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the driver or the loaded library lacks the feature
    pub fn is_not_supported(&self) -> bool {
        matches!(
            self,
            AdlError::SymbolNotFound(_)
                | AdlError::Unsupported(_)
                | AdlError::Status {
                    status: AdlStatus::NotSupported,
                    ..
                }
        )
    }
}

/// Result type for ADL operations
pub type AdlResult<T> = std::result::Result<T, AdlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_supported_covers_missing_symbols() {
        assert!(AdlError::SymbolNotFound("ADL2_Workstation_Caps").is_not_supported());
        assert!(AdlError::Status {
            function: "ADL2_Workstation_Caps",
            status: AdlStatus::NotSupported,
        }
        .is_not_supported());
        assert!(!AdlError::NoAdapter.is_not_supported());
    }

    #[test]
    fn library_not_found_lists_every_attempt() {
        let err = AdlError::LibraryNotFound {
            tried: vec!["atiadlxx.dll".into(), "atiadlxy.dll".into()],
        };
        assert_eq!(
            err.to_string(),
            "AMD Display Library not found (tried: atiadlxx.dll, atiadlxy.dll)"
        );
    }
}
