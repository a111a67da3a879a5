/*!
 * Bridge Module
 * Host-call entry points that admit native bus resources into a sandbox
 */

mod entry;
mod status;

pub use entry::Bridge;
pub use status::BridgeStatus;
