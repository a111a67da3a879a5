/*!
 * Registry Types
 * Descriptor metadata and registry policy errors
 */

use crate::acquire::NativeHandle;
use crate::core::types::{DescriptorId, InlineString};
use crate::metadata::ResourceType;
use crate::rights::RightsSet;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Registry policy failures; none of them touch the OS
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error", content = "details", rename_all = "snake_case")]
pub enum RegistryError {
    #[error("Requested rights ({requested}) exceed the sandbox maximum ({maximum})")]
    #[diagnostic(
        code(registry::rights_exceeded),
        help("Request a subset of the rights the sandbox was configured with.")
    )]
    RightsExceeded {
        requested: RightsSet,
        maximum: RightsSet,
    },

    #[error("Descriptor table full ({capacity} slots)")]
    #[diagnostic(
        code(registry::table_full),
        help("Close unused descriptors or raise table_capacity.")
    )]
    TableFull { capacity: usize },

    #[error("Bad descriptor {0}")]
    #[diagnostic(code(registry::bad_descriptor))]
    BadDescriptor(DescriptorId),

    #[error("Descriptor {id} lacks the {right} right")]
    #[diagnostic(code(registry::not_capable))]
    NotCapable {
        id: DescriptorId,
        right: InlineString,
    },
}

/// What the guest may know about a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptorInfo {
    pub resource_type: ResourceType,
    pub rights: RightsSet,
}

/// Failed insertion; ownership of the handle returns to the caller
#[derive(Debug)]
pub struct Rejected {
    pub error: RegistryError,
    pub handle: NativeHandle,
}

impl Rejected {
    pub fn into_parts(self) -> (RegistryError, NativeHandle) {
        (self.error, self.handle)
    }
}
