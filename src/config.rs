//! Library and context configuration

use std::env;
use std::path::PathBuf;

use crate::ffi::{ADL_THREADING_LOCKED, ADL_THREADING_UNLOCKED};

/// Environment variable naming an explicit ADL shared library
pub const LIBRARY_PATH_ENV: &str = "ADL_LIBRARY_PATH";

/// How the driver serialises calls made through one context
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ThreadingModel {
    /// Several threads may enter ADL at once; the caller serialises
    Unlocked,
    /// ADL serialises calls internally
    Locked,
}

impl ThreadingModel {
    pub(crate) fn raw(self) -> std::os::raw::c_int {
        match self {
            ThreadingModel::Unlocked => ADL_THREADING_UNLOCKED,
            ThreadingModel::Locked => ADL_THREADING_LOCKED,
        }
    }
}

/// Configuration for loading ADL and creating a context
#[derive(Debug, Clone)]
pub struct AdlConfig {
    /// Explicit shared library to load instead of probing the platform names
    pub library_path: Option<PathBuf>,
    /// Only enumerate adapters that are physically present and enabled
    pub connected_only: bool,
    /// Requested threading model; `None` uses the driver default
    pub threading: Option<ThreadingModel>,
}

impl Default for AdlConfig {
    fn default() -> Self {
        Self {
            library_path: None,
            connected_only: true,
            threading: None,
        }
    }
}

impl AdlConfig {
    /// Defaults plus the library override from [`LIBRARY_PATH_ENV`]
    pub fn from_env() -> Self {
        Self {
            library_path: env::var_os(LIBRARY_PATH_ENV)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from),
            ..Self::default()
        }
    }

    /// Enumerate every adapter that has ever been present
    pub fn all_adapters() -> Self {
        Self {
            connected_only: false,
            ..Self::from_env()
        }
    }

    /// Use a specific library file
    pub fn with_library(mut self, path: impl Into<PathBuf>) -> Self {
        self.library_path = Some(path.into());
        self
    }

    /// Request a threading model
    pub fn with_threading(mut self, threading: ThreadingModel) -> Self {
        self.threading = Some(threading);
        self
    }

    pub(crate) fn enum_connected_adapters(&self) -> std::os::raw::c_int {
        if self.connected_only {
            1
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn env_override_is_picked_up() {
        env::set_var(LIBRARY_PATH_ENV, "/opt/amdgpu/lib/libatiadlxx.so");
        let config = AdlConfig::from_env();
        env::remove_var(LIBRARY_PATH_ENV);

        assert_eq!(
            config.library_path,
            Some(PathBuf::from("/opt/amdgpu/lib/libatiadlxx.so"))
        );
        assert!(config.connected_only);
    }

    #[test]
    #[serial]
    fn empty_env_value_is_ignored() {
        env::set_var(LIBRARY_PATH_ENV, "");
        let config = AdlConfig::from_env();
        env::remove_var(LIBRARY_PATH_ENV);

        assert!(config.library_path.is_none());
    }

    #[test]
    #[serial]
    fn all_adapters_disables_connected_filter() {
        env::remove_var(LIBRARY_PATH_ENV);
        let config = AdlConfig::all_adapters().with_threading(ThreadingModel::Locked);
        assert_eq!(config.enum_connected_adapters(), 0);
        assert_eq!(config.threading.map(ThreadingModel::raw), Some(ADL_THREADING_LOCKED));
    }
}
