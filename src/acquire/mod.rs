/*!
 * Acquire Module
 * Creates native bus resources and binds them to named endpoints
 */

mod acquirer;
mod handle;
#[cfg(target_os = "linux")]
mod linux;
mod manager;
mod traits;
mod types;
mod virtual_bus;

pub use acquirer::{acquire_and_bind, activate, validate_endpoint};
pub use handle::{NativeHandle, VirtualHandle};
#[cfg(target_os = "linux")]
pub use linux::LinuxCanBus;
pub use manager::select_platform;
pub use traits::BusPlatform;
pub use types::*;
pub use virtual_bus::{Resolution, VirtualBus};
