//! ADL return codes

use std::fmt;
use std::os::raw::c_int;

use crate::error::{AdlError, AdlResult};

/// Status code returned by every ADL entry point
///
/// Non-negative codes are successes, some of which carry a request for the
/// caller (wait, restart, mode change). Negative codes are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum AdlStatus {
    /// All Ok, but need to wait
    OkWait,
    /// All Ok, but need restart
    OkRestart,
    /// All Ok, but need mode change
    OkModeChange,
    /// All Ok, but with warning
    OkWarning,
    /// Function completed successfully
    Ok,
    /// Generic error, most likely a failed escape call to the driver
    Err,
    /// ADL not initialized
    NotInit,
    /// One of the parameters passed is invalid
    InvalidParam,
    /// One of the parameter sizes is invalid
    InvalidParamSize,
    /// Invalid ADL adapter index passed
    InvalidAdlIdx,
    /// Invalid controller index passed
    InvalidControllerIdx,
    /// Invalid display index passed
    InvalidDisplayIdx,
    /// Function not supported by the driver
    NotSupported,
    /// Null pointer error
    NullPointer,
    /// Call can't be made due to disabled adapter
    DisabledAdapter,
    /// Invalid callback
    InvalidCallback,
    /// Display resource conflict
    ResourceConflict,
    /// Not all values of a multi-value set request were committed
    SetIncomplete,
    /// No X display in a Linux console environment
    NoXDisplay,
    /// Escape call failed because of an incompatible driver in the driver store
    CallToIncompatibleDriver,
    /// Administrator privileges are required
    NoAdministratorPrivileges,
    /// Feature sync has not been started
    FeatureSyncNotStarted,
    /// Adapter is in a power state that does not allow the call
    InvalidPowerState,
    /// Code not known to this crate
    Unknown(i32),
}

impl AdlStatus {
    /// Decode a raw return value
    pub fn from_raw(raw: c_int) -> Self {
        match raw {
            4 => AdlStatus::OkWait,
            3 => AdlStatus::OkRestart,
            2 => AdlStatus::OkModeChange,
            1 => AdlStatus::OkWarning,
            0 => AdlStatus::Ok,
            -1 => AdlStatus::Err,
            -2 => AdlStatus::NotInit,
            -3 => AdlStatus::InvalidParam,
            -4 => AdlStatus::InvalidParamSize,
            -5 => AdlStatus::InvalidAdlIdx,
            -6 => AdlStatus::InvalidControllerIdx,
            -7 => AdlStatus::InvalidDisplayIdx,
            -8 => AdlStatus::NotSupported,
            -9 => AdlStatus::NullPointer,
            -10 => AdlStatus::DisabledAdapter,
            -11 => AdlStatus::InvalidCallback,
            -12 => AdlStatus::ResourceConflict,
            -20 => AdlStatus::SetIncomplete,
            -21 => AdlStatus::NoXDisplay,
            -22 => AdlStatus::CallToIncompatibleDriver,
            -23 => AdlStatus::NoAdministratorPrivileges,
            -24 => AdlStatus::FeatureSyncNotStarted,
            -25 => AdlStatus::InvalidPowerState,
            other => AdlStatus::Unknown(other),
        }
    }

    /// Raw integer value as the driver returns it
    pub fn code(&self) -> i32 {
        match self {
            AdlStatus::OkWait => 4,
            AdlStatus::OkRestart => 3,
            AdlStatus::OkModeChange => 2,
            AdlStatus::OkWarning => 1,
            AdlStatus::Ok => 0,
            AdlStatus::Err => -1,
            AdlStatus::NotInit => -2,
            AdlStatus::InvalidParam => -3,
            AdlStatus::InvalidParamSize => -4,
            AdlStatus::InvalidAdlIdx => -5,
            AdlStatus::InvalidControllerIdx => -6,
            AdlStatus::InvalidDisplayIdx => -7,
            AdlStatus::NotSupported => -8,
            AdlStatus::NullPointer => -9,
            AdlStatus::DisabledAdapter => -10,
            AdlStatus::InvalidCallback => -11,
            AdlStatus::ResourceConflict => -12,
            AdlStatus::SetIncomplete => -20,
            AdlStatus::NoXDisplay => -21,
            AdlStatus::CallToIncompatibleDriver => -22,
            AdlStatus::NoAdministratorPrivileges => -23,
            AdlStatus::FeatureSyncNotStarted => -24,
            AdlStatus::InvalidPowerState => -25,
            AdlStatus::Unknown(code) => *code,
        }
    }

    /// Every non-negative code is a success
    pub fn is_ok(&self) -> bool {
        self.code() >= 0
    }

    /// Success codes that ask the caller to do something before the change
    /// becomes visible
    pub fn needs_attention(&self) -> bool {
        matches!(
            self,
            AdlStatus::OkWait | AdlStatus::OkRestart | AdlStatus::OkModeChange
        )
    }

    /// Split into success and failure
    pub fn into_result(self) -> Result<AdlStatus, AdlStatus> {
        if self.is_ok() {
            Ok(self)
        } else {
            Err(self)
        }
    }

    /// Decode the return value of `function` and turn failures into [`AdlError::Status`]
    pub fn check(function: &'static str, raw: c_int) -> AdlResult<AdlStatus> {
        let status = AdlStatus::from_raw(raw);
        match status.into_result() {
            Ok(status) => {
                if status != AdlStatus::Ok {
                    log::debug!("{} returned {}", function, status);
                }
                Ok(status)
            }
            Err(status) => {
                log::debug!("{} failed: {}", function, status);
                Err(AdlError::Status { function, status })
            }
        }
    }

    /// Short description of the code
    pub fn description(&self) -> &'static str {
        match self {
            AdlStatus::OkWait => "success, caller needs to wait",
            AdlStatus::OkRestart => "success, restart required",
            AdlStatus::OkModeChange => "success, mode change required",
            AdlStatus::OkWarning => "success with warning",
            AdlStatus::Ok => "success",
            AdlStatus::Err => "generic driver error",
            AdlStatus::NotInit => "ADL not initialized",
            AdlStatus::InvalidParam => "invalid parameter",
            AdlStatus::InvalidParamSize => "invalid parameter size",
            AdlStatus::InvalidAdlIdx => "invalid adapter index",
            AdlStatus::InvalidControllerIdx => "invalid controller index",
            AdlStatus::InvalidDisplayIdx => "invalid display index",
            AdlStatus::NotSupported => "not supported by the driver",
            AdlStatus::NullPointer => "null pointer",
            AdlStatus::DisabledAdapter => "adapter is disabled",
            AdlStatus::InvalidCallback => "invalid callback",
            AdlStatus::ResourceConflict => "display resource conflict",
            AdlStatus::SetIncomplete => "some values were not set",
            AdlStatus::NoXDisplay => "no X display available",
            AdlStatus::CallToIncompatibleDriver => "incompatible driver",
            AdlStatus::NoAdministratorPrivileges => "administrator privileges required",
            AdlStatus::FeatureSyncNotStarted => "feature sync not started",
            AdlStatus::InvalidPowerState => "invalid power state",
            AdlStatus::Unknown(_) => "unknown status code",
        }
    }
}

impl fmt::Display for AdlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.code())
    }
}

impl From<c_int> for AdlStatus {
    fn from(raw: c_int) -> Self {
        AdlStatus::from_raw(raw)
    }
}
