/*!
 * Virtual Bus Platform
 * In-memory endpoints for hosts without SocketCAN and for fault injection
 */

use super::handle::{NativeHandle, VirtualHandle};
use super::traits::BusPlatform;
use super::types::{BindTarget, FilterSpec, Liveness, PlatformType};
use crate::core::types::{EndpointIndex, InlineString};
use crate::metadata::{NativeMetadata, SocketKind};
use ahash::RandomState;
use nix::errno::Errno;
use nix::libc;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// How endpoint names map onto endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Look the endpoint up by name
    ByName,
    /// Ignore the name and take the first endpoint, as network stacks without
    /// name lookup do
    FirstAvailable,
}

#[derive(Debug, Clone)]
struct VirtualEndpoint {
    name: InlineString,
    index: EndpointIndex,
    active: bool,
    activation_error: Option<Errno>,
    bind_error: Option<Errno>,
    filter_error: Option<Errno>,
    filter: Option<FilterSpec>,
}

#[derive(Default)]
struct VirtualState {
    endpoints: Vec<VirtualEndpoint>,
    create_error: Option<Errno>,
    bindings: HashMap<u64, EndpointIndex, RandomState>,
}

impl VirtualState {
    fn endpoint_mut(&mut self, index: EndpointIndex) -> Option<&mut VirtualEndpoint> {
        self.endpoints.iter_mut().find(|ep| ep.index == index)
    }

    fn endpoint_named_mut(&mut self, name: &str) -> Option<&mut VirtualEndpoint> {
        self.endpoints.iter_mut().find(|ep| ep.name == name)
    }
}

#[derive(Default)]
struct HandleCounters {
    next_id: AtomicU64,
    created: AtomicUsize,
    released: AtomicUsize,
}

/// In-memory bus platform
///
/// Tracks every handle it hands out so callers can verify that nothing leaks
/// and nothing is released twice.
#[derive(Clone)]
pub struct VirtualBus {
    state: Arc<Mutex<VirtualState>>,
    counters: Arc<HandleCounters>,
    resolution: Resolution,
    settle_delay: Duration,
}

impl VirtualBus {
    pub fn new() -> Self {
        info!("Virtual bus platform initialized");
        Self {
            state: Arc::new(Mutex::new(VirtualState::default())),
            counters: Arc::new(HandleCounters::default()),
            resolution: Resolution::ByName,
            settle_delay: Duration::ZERO,
        }
    }

    /// Add an endpoint that is already up
    pub fn with_endpoint(self, name: &str) -> Self {
        self.add_endpoint(name, true)
    }

    /// Add an endpoint that must be brought up before use
    pub fn with_inactive_endpoint(self, name: &str) -> Self {
        self.add_endpoint(name, false)
    }

    /// Resolve every name to the first endpoint
    pub fn enumerating(mut self) -> Self {
        self.resolution = Resolution::FirstAvailable;
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Make resource creation fail with `errno`
    pub fn fail_create(self, errno: Errno) -> Self {
        self.state.lock().create_error = Some(errno);
        self
    }

    /// Make bringing `name` up fail with `errno`
    pub fn fail_activation(self, name: &str, errno: Errno) -> Self {
        self.configure(name, |ep| ep.activation_error = Some(errno))
    }

    /// Make binding to `name` fail with `errno`
    pub fn fail_bind(self, name: &str, errno: Errno) -> Self {
        self.configure(name, |ep| ep.bind_error = Some(errno))
    }

    /// Make filters on `name` be rejected with `errno`
    pub fn reject_filter(self, name: &str, errno: Errno) -> Self {
        self.configure(name, |ep| ep.filter_error = Some(errno))
    }

    fn add_endpoint(self, name: &str, active: bool) -> Self {
        {
            let mut state = self.state.lock();
            let index = state.endpoints.len() as EndpointIndex + 1;
            state.endpoints.push(VirtualEndpoint {
                name: name.into(),
                index,
                active,
                activation_error: None,
                bind_error: None,
                filter_error: None,
                filter: None,
            });
        }
        self
    }

    fn configure<F: FnOnce(&mut VirtualEndpoint)>(self, name: &str, f: F) -> Self {
        if let Some(ep) = self.state.lock().endpoint_named_mut(name) {
            f(ep);
        }
        self
    }

    /// Handles created and not yet released
    pub fn live_handles(&self) -> usize {
        self.created_handles() - self.released_handles()
    }

    pub fn created_handles(&self) -> usize {
        self.counters.created.load(Ordering::SeqCst)
    }

    pub fn released_handles(&self) -> usize {
        self.counters.released.load(Ordering::SeqCst)
    }

    pub fn is_active(&self, name: &str) -> Option<bool> {
        self.state.lock().endpoint_named_mut(name).map(|ep| ep.active)
    }

    /// Filter most recently installed on `name`
    pub fn installed_filter(&self, name: &str) -> Option<FilterSpec> {
        self.state
            .lock()
            .endpoint_named_mut(name)
            .and_then(|ep| ep.filter)
    }

    /// Endpoint index a live handle is bound to
    pub fn binding_of(&self, handle: &NativeHandle) -> Option<EndpointIndex> {
        let id = handle.virtual_id()?;
        self.state.lock().bindings.get(&id).copied()
    }
}

impl Default for VirtualBus {
    fn default() -> Self {
        Self::new()
    }
}

impl BusPlatform for VirtualBus {
    fn create(&self) -> nix::Result<NativeHandle> {
        if let Some(errno) = self.state.lock().create_error {
            return Err(errno);
        }

        let id = self.counters.next_id.fetch_add(1, Ordering::SeqCst);
        self.counters.created.fetch_add(1, Ordering::SeqCst);

        let counters = Arc::clone(&self.counters);
        let state = Arc::clone(&self.state);
        let metadata = NativeMetadata {
            ino: id,
            nlink: 1,
            mode: libc::S_IFSOCK as u32 | 0o777,
            ..Default::default()
        };
        let handle = VirtualHandle::new(id, metadata, move |id| {
            state.lock().bindings.remove(&id);
            counters.released.fetch_add(1, Ordering::SeqCst);
        })
        .with_socket_kind(SocketKind::from_raw(libc::SOCK_RAW));

        debug!(id, "virtual bus handle created");
        Ok(NativeHandle::from_virtual(handle))
    }

    fn resolve(&self, endpoint: &str) -> nix::Result<BindTarget> {
        let state = self.state.lock();
        let found = match self.resolution {
            Resolution::ByName => state.endpoints.iter().find(|ep| ep.name == endpoint),
            Resolution::FirstAvailable => state.endpoints.first(),
        };
        found
            .map(|ep| BindTarget {
                name: ep.name.clone(),
                index: ep.index,
            })
            .ok_or(Errno::ENODEV)
    }

    fn ensure_active(&self, target: &BindTarget) -> nix::Result<Liveness> {
        {
            let mut state = self.state.lock();
            let ep = state.endpoint_mut(target.index).ok_or(Errno::ENODEV)?;
            if ep.active {
                return Ok(Liveness::AlreadyActive);
            }
            if let Some(errno) = ep.activation_error {
                return Err(errno);
            }
            ep.active = true;
        }
        if !self.settle_delay.is_zero() {
            std::thread::sleep(self.settle_delay);
        }
        Ok(Liveness::Activated)
    }

    fn bind(&self, handle: &NativeHandle, target: &BindTarget) -> nix::Result<()> {
        let id = handle.virtual_id().ok_or(Errno::EBADF)?;
        let mut state = self.state.lock();
        let ep = state.endpoint_mut(target.index).ok_or(Errno::ENODEV)?;
        if !ep.active {
            return Err(Errno::ENETDOWN);
        }
        if let Some(errno) = ep.bind_error {
            return Err(errno);
        }
        state.bindings.insert(id, target.index);
        Ok(())
    }

    fn apply_filter(
        &self,
        handle: &NativeHandle,
        target: &BindTarget,
        filter: &FilterSpec,
    ) -> nix::Result<()> {
        let id = handle.virtual_id().ok_or(Errno::EBADF)?;
        let mut state = self.state.lock();
        if state.bindings.get(&id) != Some(&target.index) {
            return Err(Errno::EINVAL);
        }
        let ep = state.endpoint_mut(target.index).ok_or(Errno::ENODEV)?;
        if let Some(errno) = ep.filter_error {
            return Err(errno);
        }
        ep.filter = Some(*filter);
        Ok(())
    }

    fn is_supported(&self) -> bool {
        true // Always available as fallback
    }

    fn platform(&self) -> PlatformType {
        PlatformType::Virtual
    }
}
