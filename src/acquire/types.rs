/*!
 * Acquisition Types
 * Filter specifications, bind targets and acquisition errors
 */

use crate::core::limits::FILTER_SPEC_SIZE;
use crate::core::types::{EndpointIndex, InlineString, NativeCode};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Acquisition result
pub type AcquireResult<T> = Result<T, AcquireError>;

/// Failures while creating and binding a native bus resource
///
/// Every native variant carries the errno reported by the failing call.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error", content = "details", rename_all = "snake_case")]
pub enum AcquireError {
    #[error("Invalid argument: {0}")]
    #[diagnostic(
        code(acquire::invalid_argument),
        help("Endpoint names must be non-empty interface names of at most 15 bytes.")
    )]
    InvalidArgument(InlineString),

    #[error("Failed to create bus socket (errno {code})")]
    #[diagnostic(
        code(acquire::resource_creation_failed),
        help("The host may lack CAN support or the descriptor limit is exhausted.")
    )]
    ResourceCreationFailed { code: NativeCode },

    #[error("Endpoint {endpoint} not found (errno {code})")]
    #[diagnostic(
        code(acquire::endpoint_not_found),
        help("Check that the bus interface exists on the host.")
    )]
    EndpointNotFound {
        endpoint: InlineString,
        code: NativeCode,
    },

    #[error("Failed to activate endpoint {endpoint} (errno {code})")]
    #[diagnostic(
        code(acquire::endpoint_activation_failed),
        help("Bringing an interface up usually requires CAP_NET_ADMIN.")
    )]
    EndpointActivationFailed {
        endpoint: InlineString,
        code: NativeCode,
    },

    #[error("Failed to bind to endpoint {endpoint} (errno {code})")]
    #[diagnostic(code(acquire::bind_failed))]
    BindFailed {
        endpoint: InlineString,
        code: NativeCode,
    },

    #[error("Filter rejected on endpoint {endpoint} (errno {code})")]
    #[diagnostic(code(acquire::filter_rejected))]
    FilterRejected {
        endpoint: InlineString,
        code: NativeCode,
    },
}

impl AcquireError {
    #[inline]
    pub fn invalid_argument(msg: impl Into<InlineString>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Native errno, `None` for argument validation failures
    pub fn native_code(&self) -> Option<NativeCode> {
        match self {
            Self::InvalidArgument(_) => None,
            Self::ResourceCreationFailed { code }
            | Self::EndpointNotFound { code, .. }
            | Self::EndpointActivationFailed { code, .. }
            | Self::BindFailed { code, .. }
            | Self::FilterRejected { code, .. } => Some(*code),
        }
    }
}

/// Inbound selection predicate for a bus resource
///
/// A frame is accepted when `(received & match_mask) == (match_value & match_mask)`.
/// The bridge hands the triple to the platform unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FilterSpec {
    pub match_value: u32,
    pub match_mask: u32,
    pub flags: u32,
}

impl FilterSpec {
    /// Accept every inbound frame
    pub const ALLOW_ALL: FilterSpec = FilterSpec::new(0, 0, 0);

    pub const fn new(match_value: u32, match_mask: u32, flags: u32) -> Self {
        Self {
            match_value,
            match_mask,
            flags,
        }
    }

    /// Little-endian (value, mask, flags)
    pub fn encode(&self) -> [u8; FILTER_SPEC_SIZE] {
        let mut out = [0u8; FILTER_SPEC_SIZE];
        out[0..4].copy_from_slice(&self.match_value.to_le_bytes());
        out[4..8].copy_from_slice(&self.match_mask.to_le_bytes());
        out[8..12].copy_from_slice(&self.flags.to_le_bytes());
        out
    }

    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < FILTER_SPEC_SIZE {
            return None;
        }
        let word = |i: usize| u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
        Some(Self::new(word(0), word(4), word(8)))
    }
}

/// Concrete target an endpoint name resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindTarget {
    pub name: InlineString,
    pub index: EndpointIndex,
}

impl fmt::Display for BindTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.index)
    }
}

/// Outcome of liveness assurance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Liveness {
    AlreadyActive,
    Activated,
}

/// Platform implementation type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformType {
    /// Linux SocketCAN raw sockets
    LinuxSocketCan,
    /// In-memory endpoints (tests, hosts without CAN support)
    Virtual,
}
