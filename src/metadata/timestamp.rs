/*!
 * Timestamp Normalization
 * Native (seconds, nanoseconds) pairs to portable nanosecond timestamps
 */

use crate::core::limits::{
    MAX_NANOSECOND_FIELD, MAX_TIMESTAMP, MIN_TIMESTAMP, NANOS_PER_SECOND,
    TIMESTAMP_OVERFLOW_SECONDS,
};
use crate::core::types::Timestamp;

/// Convert a native timespec into nanoseconds since the epoch
///
/// Pre-epoch times clamp to [`MIN_TIMESTAMP`], times whose nanosecond value
/// does not fit 64 bits clamp to [`MAX_TIMESTAMP`].
pub fn normalize_timestamp(seconds: i64, nanoseconds: i64) -> Timestamp {
    if seconds < 0 {
        return MIN_TIMESTAMP;
    }
    let seconds = seconds as u64;
    if seconds >= TIMESTAMP_OVERFLOW_SECONDS {
        return MAX_TIMESTAMP;
    }
    let nanoseconds = nanoseconds.clamp(0, MAX_NANOSECOND_FIELD) as u64;
    seconds * NANOS_PER_SECOND + nanoseconds
}
