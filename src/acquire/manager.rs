/*!
 * Platform Selection
 * Picks the bus platform implementation for the current host
 */

use super::traits::BusPlatform;
use super::virtual_bus::VirtualBus;
use crate::config::{BridgeConfig, PlatformSelection};
use std::sync::Arc;
use tracing::{info, warn};

/// Select the best available platform for `config`
///
/// `Auto` prefers SocketCAN and falls back to the virtual platform when the
/// host cannot create CAN sockets.
pub fn select_platform(config: &BridgeConfig) -> Arc<dyn BusPlatform> {
    if config.platform == PlatformSelection::Auto {
        #[cfg(target_os = "linux")]
        {
            let mut linux = super::linux::LinuxCanBus::new();
            if let Some(delay) = config.settle_delay() {
                linux = linux.with_settle_delay(delay);
            }
            if linux.is_supported() {
                info!("Bus platform: Linux SocketCAN");
                return Arc::new(linux);
            }
            warn!("SocketCAN unavailable, falling back to virtual endpoints");
        }
    }

    let mut bus = VirtualBus::new();
    for name in &config.virtual_endpoints {
        bus = bus.with_inactive_endpoint(name);
    }
    if let Some(delay) = config.settle_delay() {
        bus = bus.with_settle_delay(delay);
    }
    info!(
        endpoints = config.virtual_endpoints.len(),
        "Bus platform: virtual"
    );
    Arc::new(bus)
}
