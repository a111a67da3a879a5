/*!
 * Native Handles
 * One owning abstraction over every platform's resource representation
 */

use crate::metadata::{NativeMetadata, PortableStat, SocketKind};
use nix::errno::Errno;
use nix::sys::socket::{getsockopt, sockopt};
use nix::sys::stat::fstat;
use std::fmt;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, OwnedFd, RawFd};

type ReleaseFn = Box<dyn FnOnce(u64) + Send>;

/// Owned native resource
///
/// Dropping the handle releases the underlying resource exactly once. Callers
/// never need to know which platform representation sits inside.
pub struct NativeHandle {
    repr: HandleRepr,
}

enum HandleRepr {
    /// Host file descriptor, closed by `OwnedFd`'s drop
    Os(OwnedFd),
    /// Resource owned by a non-POSIX stack or the in-memory platform
    Virtual(VirtualHandle),
}

impl NativeHandle {
    pub fn from_owned_fd(fd: OwnedFd) -> Self {
        Self {
            repr: HandleRepr::Os(fd),
        }
    }

    pub fn from_virtual(handle: VirtualHandle) -> Self {
        Self {
            repr: HandleRepr::Virtual(handle),
        }
    }

    /// Raw descriptor for OS-backed handles
    pub fn as_raw_fd(&self) -> Option<RawFd> {
        self.as_fd().map(|fd| fd.as_raw_fd())
    }

    pub fn as_fd(&self) -> Option<BorrowedFd<'_>> {
        match &self.repr {
            HandleRepr::Os(fd) => Some(fd.as_fd()),
            HandleRepr::Virtual(_) => None,
        }
    }

    /// Identifier of a virtual handle
    pub fn virtual_id(&self) -> Option<u64> {
        match &self.repr {
            HandleRepr::Os(_) => None,
            HandleRepr::Virtual(v) => Some(v.id()),
        }
    }

    /// Native metadata snapshot (`fstat` for OS handles)
    pub fn metadata(&self) -> nix::Result<NativeMetadata> {
        match &self.repr {
            HandleRepr::Os(fd) => fstat(fd.as_raw_fd()).map(NativeMetadata::from),
            HandleRepr::Virtual(v) => Ok(v.metadata),
        }
    }

    /// Transport kind of a socket handle (`SO_TYPE`)
    pub fn probe_socket_kind(&self) -> nix::Result<SocketKind> {
        match &self.repr {
            HandleRepr::Os(fd) => {
                getsockopt(fd, sockopt::SockType).map(|ty| SocketKind::from_raw(ty as i32))
            }
            HandleRepr::Virtual(v) => v.socket_kind.ok_or(Errno::ENOTSOCK),
        }
    }

    /// Portable snapshot of this resource
    pub fn stat(&self) -> nix::Result<PortableStat> {
        let native = self.metadata()?;
        Ok(PortableStat::from_native(&native, || self.probe_socket_kind()))
    }
}

impl fmt::Debug for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            HandleRepr::Os(fd) => f.debug_tuple("NativeHandle::Os").field(&fd.as_raw_fd()).finish(),
            HandleRepr::Virtual(v) => f.debug_tuple("NativeHandle::Virtual").field(&v.id).finish(),
        }
    }
}

/// Resource that is not a host file descriptor
///
/// The release callback runs once when the handle is dropped.
pub struct VirtualHandle {
    id: u64,
    metadata: NativeMetadata,
    socket_kind: Option<SocketKind>,
    on_release: Option<ReleaseFn>,
}

impl VirtualHandle {
    pub fn new<F>(id: u64, metadata: NativeMetadata, on_release: F) -> Self
    where
        F: FnOnce(u64) + Send + 'static,
    {
        Self {
            id,
            metadata,
            socket_kind: None,
            on_release: Some(Box::new(on_release)),
        }
    }

    /// Report `kind` from socket probes; without it probes fail with ENOTSOCK
    pub fn with_socket_kind(mut self, kind: SocketKind) -> Self {
        self.socket_kind = Some(kind);
        self
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for VirtualHandle {
    fn drop(&mut self) {
        if let Some(release) = self.on_release.take() {
            release(self.id);
        }
    }
}
