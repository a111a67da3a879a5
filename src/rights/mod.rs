/*!
 * Rights Module
 * Capability bitmasks attached to every bridged descriptor
 */

mod types;

pub use types::{Rights, RightsSet};
