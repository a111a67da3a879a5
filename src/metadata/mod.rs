/*!
 * Metadata Module
 * Normalizes native resource metadata into a portable representation
 */

mod filetype;
mod stat;
mod timestamp;

pub use filetype::{classify, ResourceType, SocketKind};
pub use stat::{NativeMetadata, NativeTimespec, PortableStat};
pub use timestamp::normalize_timestamp;
