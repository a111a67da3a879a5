/*!
 * Bridge Limits and Constants
 *
 * Centralized location for table sizes, timestamp bounds and bring-up timings.
 * Security-critical constants are marked with [SECURITY].
 */

use std::time::Duration;

// =============================================================================
// DESCRIPTOR TABLE
// =============================================================================

/// Default number of descriptor slots per sandbox
/// [SECURITY] Bounds how many native resources one guest can pin
pub const DEFAULT_DESCRIPTOR_CAPACITY: usize = 1024;

/// First descriptor handed out to bridged resources
/// 0, 1 and 2 belong to the guest's stdio
pub const FIRST_GUEST_DESCRIPTOR: u32 = 3;

/// Highest descriptor a guest can receive
/// Ids travel back as non-negative i32 return values
pub const MAX_GUEST_DESCRIPTOR: u32 = i32::MAX as u32;

// =============================================================================
// TIMESTAMPS
// =============================================================================

/// Nanoseconds in one second
pub const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Largest valid nanosecond component of a native timespec
pub const MAX_NANOSECOND_FIELD: i64 = 999_999_999;

/// Smallest representable portable timestamp
pub const MIN_TIMESTAMP: u64 = 0;

/// Largest representable portable timestamp
pub const MAX_TIMESTAMP: u64 = u64::MAX;

/// Seconds at or beyond which `seconds * 1e9` no longer fits a portable timestamp
pub const TIMESTAMP_OVERFLOW_SECONDS: u64 = MAX_TIMESTAMP / NANOS_PER_SECOND;

// =============================================================================
// WIRE LAYOUTS
// =============================================================================

/// Encoded size of a portable stat record (7 x u64 + type byte, padded)
pub const PORTABLE_STAT_SIZE: usize = 64;

/// Encoded size of a filter specification (3 x u32)
pub const FILTER_SPEC_SIZE: usize = 12;

// =============================================================================
// ENDPOINT BRING-UP
// =============================================================================

/// Settle time after bringing a Linux CAN interface up
/// The kernel reports IFF_UP synchronously, nothing to wait for
pub const LINUX_SETTLE_DELAY: Duration = Duration::ZERO;

// =============================================================================
// OBSERVABILITY
// =============================================================================

/// Entry-point calls slower than this are logged at warn level
pub const SLOW_CALL_THRESHOLD: Duration = Duration::from_millis(10);

// =============================================================================
// ENDPOINT NAMES
// =============================================================================

/// Longest accepted endpoint name in bytes (IFNAMSIZ minus the NUL)
/// [SECURITY] Longer names are rejected before they reach any OS call
pub const MAX_ENDPOINT_NAME_LEN: usize = 15;
