/*!
 * Core Types
 * Common types used across the bridge
 */

use smartstring::alias::String as SmartString;

/// Sandbox-visible descriptor number
pub type DescriptorId = u32;

/// Portable timestamp in nanoseconds since the Unix epoch
pub type Timestamp = u64;

/// Raw native error code (errno value) carried for diagnostics
pub type NativeCode = i32;

/// Interface index of a resolved bus endpoint
pub type EndpointIndex = u32;

/// Inline-optimized string for endpoint names and short error messages
///
/// Strings up to 23 bytes (every realistic interface name) never allocate.
pub type InlineString = SmartString;
