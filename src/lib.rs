/*!
 * Bus Bridge Library
 * Admits native bus sockets into a sandbox descriptor table under explicit rights
 */

pub mod acquire;
pub mod bridge;
pub mod config;
pub mod core;
pub mod metadata;
pub mod monitoring;
pub mod registry;
pub mod rights;

// Re-exports
pub use acquire::{
    acquire_and_bind, activate, select_platform, BusPlatform, FilterSpec, Liveness, NativeHandle,
    PlatformType, VirtualBus,
};
pub use bridge::{Bridge, BridgeStatus};
pub use config::{BridgeConfig, PlatformSelection};
pub use core::errors::*;
pub use core::types::*;
pub use metadata::{normalize_timestamp, PortableStat, ResourceType};
pub use monitoring::init_tracing;
pub use registry::{DescriptorInfo, DescriptorRegistry};
pub use rights::{Rights, RightsSet};
