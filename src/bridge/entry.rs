/*!
 * Bridge Entry Points
 * Guest-facing calls: open, activate, stat, close
 */

use super::status::BridgeStatus;
use crate::acquire::{acquire_and_bind, activate, select_platform, BusPlatform, FilterSpec, Liveness};
use crate::config::BridgeConfig;
use crate::core::errors::{BridgeError, BridgeResult, RegistryError};
use crate::core::types::DescriptorId;
use crate::metadata::PortableStat;
use crate::monitoring::span_bridge_call;
use crate::registry::{DescriptorInfo, DescriptorRegistry};
use crate::rights::Rights;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Capability bridge for one sandbox instance
///
/// Cheap to share: the platform and descriptor table sit behind `Arc`s, and
/// every call is synchronous on the calling thread.
pub struct Bridge {
    platform: Arc<dyn BusPlatform>,
    registry: Arc<DescriptorRegistry>,
    config: BridgeConfig,
}

impl Bridge {
    /// Build a bridge over `platform` with a fresh descriptor table
    pub fn new(platform: Arc<dyn BusPlatform>, config: BridgeConfig) -> BridgeResult<Self> {
        config.validate()?;
        let registry = Arc::new(DescriptorRegistry::new(
            config.table_capacity,
            config.first_descriptor,
            config.max_rights,
        ));
        info!(
            platform = ?platform.platform(),
            capacity = config.table_capacity,
            "bridge ready"
        );
        Ok(Self {
            platform,
            registry,
            config,
        })
    }

    /// Build a bridge on whatever platform the host supports
    pub fn from_config(config: BridgeConfig) -> BridgeResult<Self> {
        let platform = select_platform(&config);
        Self::new(platform, config)
    }

    pub fn registry(&self) -> &Arc<DescriptorRegistry> {
        &self.registry
    }

    pub fn platform(&self) -> &Arc<dyn BusPlatform> {
        &self.platform
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Open a bus endpoint for the guest
    ///
    /// Returns the new descriptor id (>= 0) or a negative [`BridgeStatus`].
    pub fn open_bus_endpoint(&self, endpoint: Option<&str>) -> i32 {
        let span = span_bridge_call("open_bus_endpoint", endpoint);
        let _entered = span.enter();

        let status = match self.try_open_bus_endpoint(endpoint) {
            // The registry never hands out ids above MAX_GUEST_DESCRIPTOR
            Ok(id) => id as i32,
            Err(e) => {
                span.record_error(&e.to_string());
                BridgeStatus::from(&e).code()
            }
        };
        span.record_status(status);
        status
    }

    /// Typed form of [`Bridge::open_bus_endpoint`] using the configured filter
    pub fn try_open_bus_endpoint(&self, endpoint: Option<&str>) -> BridgeResult<DescriptorId> {
        self.open_bus_endpoint_with_filter(endpoint, &self.config.filter)
    }

    /// Open a bus endpoint with an explicit receive filter
    pub fn open_bus_endpoint_with_filter(
        &self,
        endpoint: Option<&str>,
        filter: &FilterSpec,
    ) -> BridgeResult<DescriptorId> {
        let handle = acquire_and_bind(self.platform.as_ref(), endpoint, filter)?;
        let resource_type = self.platform.resource_type();

        match self
            .registry
            .insert(handle, resource_type, self.config.socket_rights)
        {
            Ok(id) => {
                info!(id, endpoint, resource_type = %resource_type, "bus endpoint admitted");
                Ok(id)
            }
            Err(rejected) => {
                let (error, handle) = rejected.into_parts();
                warn!(endpoint, error = %error, "registration refused, releasing bus socket");
                drop(handle);
                Err(error.into())
            }
        }
    }

    /// Make sure `endpoint` exists and is up
    ///
    /// Returns 0 or a negative [`BridgeStatus`].
    pub fn activate_transport(&self, endpoint: Option<&str>) -> i32 {
        let span = span_bridge_call("activate_transport", endpoint);
        let _entered = span.enter();

        let status = match self.try_activate_transport(endpoint) {
            Ok(_) => BridgeStatus::Success.code(),
            Err(e) => {
                span.record_error(&e.to_string());
                BridgeStatus::from(&e).code()
            }
        };
        span.record_status(status);
        status
    }

    pub fn try_activate_transport(&self, endpoint: Option<&str>) -> BridgeResult<Liveness> {
        Ok(activate(self.platform.as_ref(), endpoint)?)
    }

    /// Portable metadata for `id`, reported with the type it was registered under
    pub fn stat(&self, id: DescriptorId) -> BridgeResult<PortableStat> {
        let result = self.registry.with_handle(id, |handle, info| {
            if !info.rights.base().contains(Rights::FD_FILESTAT_GET) {
                return Err(BridgeError::from(RegistryError::NotCapable {
                    id,
                    right: "fd_filestat_get".into(),
                }));
            }
            handle
                .stat()
                .map(|stat| stat.with_filetype(info.resource_type))
                .map_err(|errno| BridgeError::Io {
                    descriptor: id,
                    code: errno as i32,
                })
        })?;

        if let Err(ref e) = result {
            debug!(id, error = %e, "stat failed");
        }
        result
    }

    /// Drop `id` and release its native handle
    pub fn close(&self, id: DescriptorId) -> BridgeResult<()> {
        let handle = self.registry.take(id)?;
        drop(handle);
        debug!(id, "descriptor closed");
        Ok(())
    }

    pub fn descriptor_info(&self, id: DescriptorId) -> BridgeResult<DescriptorInfo> {
        self.registry
            .lookup(id)
            .ok_or_else(|| RegistryError::BadDescriptor(id).into())
    }
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("platform", &self.platform.platform())
            .field("registry", &self.registry)
            .finish()
    }
}
