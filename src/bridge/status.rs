/*!
 * Guest Status Codes
 * One stable negative code per error kind
 */

use crate::core::errors::{AcquireError, BridgeError, RegistryError};
use serde::{Deserialize, Serialize};

/// Status handed back across the trust boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum BridgeStatus {
    Success = 0,
    InvalidArgument = -1,
    ResourceCreationFailed = -2,
    EndpointNotFound = -3,
    EndpointActivationFailed = -4,
    BindFailed = -5,
    FilterRejected = -6,
    RightsExceeded = -7,
    TableFull = -8,
    BadDescriptor = -9,
    Io = -10,
    NotCapable = -11,
}

impl BridgeStatus {
    const ALL: [BridgeStatus; 12] = [
        Self::Success,
        Self::InvalidArgument,
        Self::ResourceCreationFailed,
        Self::EndpointNotFound,
        Self::EndpointActivationFailed,
        Self::BindFailed,
        Self::FilterRejected,
        Self::RightsExceeded,
        Self::TableFull,
        Self::BadDescriptor,
        Self::Io,
        Self::NotCapable,
    ];

    #[inline]
    pub const fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.code() == code)
    }
}

impl From<&AcquireError> for BridgeStatus {
    fn from(err: &AcquireError) -> Self {
        match err {
            AcquireError::InvalidArgument(_) => Self::InvalidArgument,
            AcquireError::ResourceCreationFailed { .. } => Self::ResourceCreationFailed,
            AcquireError::EndpointNotFound { .. } => Self::EndpointNotFound,
            AcquireError::EndpointActivationFailed { .. } => Self::EndpointActivationFailed,
            AcquireError::BindFailed { .. } => Self::BindFailed,
            AcquireError::FilterRejected { .. } => Self::FilterRejected,
        }
    }
}

impl From<&RegistryError> for BridgeStatus {
    fn from(err: &RegistryError) -> Self {
        match err {
            RegistryError::RightsExceeded { .. } => Self::RightsExceeded,
            RegistryError::TableFull { .. } => Self::TableFull,
            RegistryError::BadDescriptor(_) => Self::BadDescriptor,
            RegistryError::NotCapable { .. } => Self::NotCapable,
        }
    }
}

impl From<&BridgeError> for BridgeStatus {
    fn from(err: &BridgeError) -> Self {
        match err {
            BridgeError::Acquire(e) => e.into(),
            BridgeError::Registry(e) => e.into(),
            BridgeError::Io { .. } => Self::Io,
            // Configuration never reaches a guest call; closest meaning
            BridgeError::Configuration(_) => Self::InvalidArgument,
        }
    }
}
