/*!
 * Linux SocketCAN Platform
 * Raw CAN sockets bound to named interfaces
 */

use super::handle::NativeHandle;
use super::traits::BusPlatform;
use super::types::{BindTarget, FilterSpec, Liveness, PlatformType};
use crate::core::limits::LINUX_SETTLE_DELAY;
use nix::errno::Errno;
use nix::ifaddrs::getifaddrs;
use nix::libc;
use nix::net::if_::{if_nametoindex, InterfaceFlags};
use nix::sys::socket::{socket, AddressFamily, SockFlag, SockProtocol, SockType};
use std::mem;
use std::time::Duration;
use tracing::{debug, info, warn};

/// SocketCAN implementation of the bus platform
#[derive(Debug, Clone)]
pub struct LinuxCanBus {
    settle_delay: Duration,
}

impl LinuxCanBus {
    pub fn new() -> Self {
        Self {
            settle_delay: LINUX_SETTLE_DELAY,
        }
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    fn open_raw_socket() -> nix::Result<std::os::fd::OwnedFd> {
        socket(
            AddressFamily::Can,
            SockType::Raw,
            SockFlag::SOCK_CLOEXEC,
            SockProtocol::CanRaw,
        )
    }

    fn is_up(name: &str) -> nix::Result<bool> {
        getifaddrs()?
            .find(|addr| addr.interface_name == name)
            .map(|addr| addr.flags.contains(InterfaceFlags::IFF_UP))
            .ok_or(Errno::ENODEV)
    }

    /// Set IFF_UP over rtnetlink from a private current-thread runtime
    fn bring_up(index: u32) -> nix::Result<()> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_io()
            .build()
            .map_err(|e| io_errno(&e))?;

        runtime.block_on(async move {
            let (connection, handle, _) = rtnetlink::new_connection().map_err(|e| io_errno(&e))?;
            tokio::spawn(connection);

            handle
                .link()
                .set(index)
                .up()
                .execute()
                .await
                .map_err(|e| {
                    warn!(index, error = %e, "netlink link-up request failed");
                    netlink_errno(&e)
                })
        })
    }
}

impl Default for LinuxCanBus {
    fn default() -> Self {
        Self::new()
    }
}

impl BusPlatform for LinuxCanBus {
    fn create(&self) -> nix::Result<NativeHandle> {
        Self::open_raw_socket().map(NativeHandle::from_owned_fd)
    }

    fn resolve(&self, endpoint: &str) -> nix::Result<BindTarget> {
        let index = if_nametoindex(endpoint)?;
        Ok(BindTarget {
            name: endpoint.into(),
            index,
        })
    }

    fn ensure_active(&self, target: &BindTarget) -> nix::Result<Liveness> {
        if Self::is_up(&target.name)? {
            return Ok(Liveness::AlreadyActive);
        }

        info!(endpoint = %target.name, "bringing CAN interface up");
        Self::bring_up(target.index)?;
        if !self.settle_delay.is_zero() {
            std::thread::sleep(self.settle_delay);
        }
        Ok(Liveness::Activated)
    }

    fn bind(&self, handle: &NativeHandle, target: &BindTarget) -> nix::Result<()> {
        let fd = handle.as_raw_fd().ok_or(Errno::EBADF)?;

        // SAFETY: sockaddr_can is plain old data, all-zero is a valid value
        let mut addr: libc::sockaddr_can = unsafe { mem::zeroed() };
        addr.can_family = libc::AF_CAN as libc::sa_family_t;
        addr.can_ifindex = target.index as libc::c_int;

        debug!(fd, can_ifindex = addr.can_ifindex, "binding CAN socket");
        // SAFETY: `addr` outlives the call and the length matches its type
        let rc = unsafe {
            libc::bind(
                fd,
                &addr as *const libc::sockaddr_can as *const libc::sockaddr,
                mem::size_of::<libc::sockaddr_can>() as libc::socklen_t,
            )
        };
        Errno::result(rc).map(drop)
    }

    fn apply_filter(
        &self,
        handle: &NativeHandle,
        _target: &BindTarget,
        filter: &FilterSpec,
    ) -> nix::Result<()> {
        let fd = handle.as_raw_fd().ok_or(Errno::EBADF)?;

        // CAN_RAW has no flags word; only value and mask reach the kernel
        let raw = libc::can_filter {
            can_id: filter.match_value,
            can_mask: filter.match_mask,
        };
        // SAFETY: `raw` outlives the call and the length matches its type
        let rc = unsafe {
            libc::setsockopt(
                fd,
                libc::SOL_CAN_RAW,
                libc::CAN_RAW_FILTER,
                &raw as *const libc::can_filter as *const libc::c_void,
                mem::size_of::<libc::can_filter>() as libc::socklen_t,
            )
        };
        Errno::result(rc).map(drop)
    }

    fn is_supported(&self) -> bool {
        // Probing with a throwaway socket tells us whether the can_raw module is loaded
        Self::open_raw_socket().is_ok()
    }

    fn platform(&self) -> PlatformType {
        PlatformType::LinuxSocketCan
    }
}

fn io_errno(err: &std::io::Error) -> Errno {
    err.raw_os_error().map(Errno::from_raw).unwrap_or(Errno::EIO)
}

fn netlink_errno(err: &rtnetlink::Error) -> Errno {
    match err {
        rtnetlink::Error::NetlinkError(msg) => msg
            .code
            .map(|code| Errno::from_raw(-code.get()))
            .unwrap_or(Errno::EIO),
        _ => Errno::EIO,
    }
}
