//! Locating and loading the vendor shared library

use std::path::{Path, PathBuf};

use libloading::Library;

use crate::config::{AdlConfig, LIBRARY_PATH_ENV};
use crate::error::{AdlError, AdlResult};
use crate::ffi::AdlFunctions;

/// Library names probed in order when no explicit path is configured
pub fn candidate_names() -> &'static [&'static str] {
    #[cfg(windows)]
    {
        // 64-bit driver first, then the 32-bit one shipped for WOW64 clients
        &["atiadlxx.dll", "atiadlxy.dll"]
    }
    #[cfg(not(windows))]
    {
        &["libatiadlxx.so"]
    }
}

/// An opened ADL shared library with its resolved function table
pub struct AdlLibrary {
    library: Library,
    location: String,
    functions: AdlFunctions,
}

impl AdlLibrary {
    /// Load the library named by `config` or [`LIBRARY_PATH_ENV`], or the
    /// first platform candidate that loads
    pub fn open(config: &AdlConfig) -> AdlResult<Self> {
        let explicit = config.library_path.clone().or_else(|| {
            std::env::var_os(LIBRARY_PATH_ENV)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
        });
        if let Some(path) = explicit {
            return Self::open_path(&path);
        }

        let mut tried = Vec::new();
        for name in candidate_names() {
            match Self::open_name(name) {
                Ok(library) => return Ok(library),
                Err(err) => {
                    log::debug!("{}", err);
                    tried.push((*name).to_string());
                }
            }
        }

        Err(AdlError::LibraryNotFound { tried })
    }

    /// Load a specific library file
    pub fn open_path(path: &Path) -> AdlResult<Self> {
        // SAFETY: loading runs the library's initialisers; the ADL driver
        // library has no initialisers with preconditions on the caller.
        let library = unsafe { Library::new(path) }.map_err(|source| AdlError::LibraryLoad {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::bind(library, path.display().to_string()))
    }

    fn open_name(name: &str) -> AdlResult<Self> {
        // SAFETY: see `open_path`.
        let library = unsafe { Library::new(name) }.map_err(|source| AdlError::LibraryLoad {
            path: name.to_string(),
            source,
        })?;
        Ok(Self::bind(library, name.to_string()))
    }

    fn bind(library: Library, location: String) -> Self {
        // SAFETY: the table is stored next to the library and never outlives it.
        let functions = unsafe { AdlFunctions::load(&library) };
        log::info!(
            "Loaded {} ({} of {} entry points resolved)",
            location,
            functions.resolved_names().len(),
            AdlFunctions::NAMES.len()
        );
        Self {
            library,
            location,
            functions,
        }
    }

    /// The path or name the library was loaded from
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Resolved entry points
    pub fn functions(&self) -> &AdlFunctions {
        &self.functions
    }

    /// Consume the handle; the returned [`Library`] must outlive any copy of the table
    pub(crate) fn into_parts(self) -> (Library, AdlFunctions, String) {
        (self.library, self.functions, self.location)
    }
}

impl std::fmt::Debug for AdlLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdlLibrary")
            .field("location", &self.location)
            .field("functions", &self.functions)
            .finish()
    }
}

/// Resolve the library location without keeping it loaded
pub fn find_library(config: &AdlConfig) -> Option<PathBuf> {
    AdlLibrary::open(config)
        .ok()
        .map(|library| PathBuf::from(library.location()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_follow_the_platform() {
        let names = candidate_names();
        assert!(!names.is_empty());
        #[cfg(windows)]
        assert_eq!(names, &["atiadlxx.dll", "atiadlxy.dll"]);
        #[cfg(not(windows))]
        assert_eq!(names, &["libatiadlxx.so"]);
    }

    #[test]
    #[serial_test::serial]
    fn missing_explicit_path_is_a_load_error() {
        let config = AdlConfig::default().with_library("/nonexistent/dir/libatiadlxx.so");
        match AdlLibrary::open(&config) {
            Err(AdlError::LibraryLoad { path, .. }) => {
                assert_eq!(path, "/nonexistent/dir/libatiadlxx.so");
            }
            other => panic!("expected a load error, got {other:?}"),
        }
    }
}
