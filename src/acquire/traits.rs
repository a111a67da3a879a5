/*!
 * Bus Platform Traits
 * Platform-agnostic capabilities the acquirer drives
 */

use super::handle::NativeHandle;
use super::types::{BindTarget, FilterSpec, Liveness, PlatformType};
use crate::metadata::ResourceType;

/// Capabilities one target platform provides for bus endpoints
///
/// Every method reports failures as the native errno; the acquirer maps them
/// onto the step that failed.
pub trait BusPlatform: Send + Sync {
    /// Create an unbound resource of the platform's bus transport kind
    fn create(&self) -> nix::Result<NativeHandle>;

    /// Map a logical endpoint name to a bind target
    ///
    /// Platforms without name lookup enumerate their endpoints instead.
    fn resolve(&self, endpoint: &str) -> nix::Result<BindTarget>;

    /// Make sure the target is up, bringing it up (and waiting for it to
    /// settle) when it is not
    fn ensure_active(&self, target: &BindTarget) -> nix::Result<Liveness>;

    /// Bind `handle` to `target`
    fn bind(&self, handle: &NativeHandle, target: &BindTarget) -> nix::Result<()>;

    /// Install `filter` as the inbound selection predicate of a bound handle
    fn apply_filter(
        &self,
        handle: &NativeHandle,
        target: &BindTarget,
        filter: &FilterSpec,
    ) -> nix::Result<()>;

    /// Type bound resources are presented as
    fn resource_type(&self) -> ResourceType {
        ResourceType::CharacterDevice
    }

    /// Check if this implementation works on the current host
    fn is_supported(&self) -> bool;

    /// Get the platform type
    fn platform(&self) -> PlatformType;
}
