/*!
 * Acquisition Cleanup Tests
 * Every failing step leaves no live handle and no registry entry
 */

use bus_bridge::acquire::{acquire_and_bind, AcquireError, FilterSpec, VirtualBus};
use bus_bridge::{Bridge, BridgeConfig, BridgeStatus};
use nix::errno::Errno;
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn open_status(bus: &VirtualBus) -> i32 {
    let bridge = Bridge::new(Arc::new(bus.clone()), BridgeConfig::default()).unwrap();
    let status = bridge.open_bus_endpoint(Some("vcan0"));
    assert!(bridge.registry().is_empty());
    status
}

#[test]
fn test_create_failure() {
    let bus = VirtualBus::new()
        .with_endpoint("vcan0")
        .fail_create(Errno::EAFNOSUPPORT);

    assert_eq!(
        open_status(&bus),
        BridgeStatus::ResourceCreationFailed.code()
    );
    assert_eq!(bus.created_handles(), 0);
}

#[test]
fn test_bind_failure_releases_handle() {
    let bus = VirtualBus::new()
        .with_endpoint("vcan0")
        .fail_bind("vcan0", Errno::EADDRINUSE);

    assert_eq!(open_status(&bus), BridgeStatus::BindFailed.code());
    assert_eq!(bus.created_handles(), 1);
    assert_eq!(bus.released_handles(), 1);
}

#[test]
fn test_filter_rejection_releases_handle() {
    let bus = VirtualBus::new()
        .with_endpoint("vcan0")
        .reject_filter("vcan0", Errno::EINVAL);

    assert_eq!(open_status(&bus), BridgeStatus::FilterRejected.code());
    assert_eq!(bus.created_handles(), 1);
    assert_eq!(bus.live_handles(), 0);
}

#[test]
fn test_errno_travels_with_error() {
    let bus = VirtualBus::new()
        .with_endpoint("vcan0")
        .fail_bind("vcan0", Errno::EADDRINUSE);

    let err = acquire_and_bind(&bus, Some("vcan0"), &FilterSpec::ALLOW_ALL).unwrap_err();
    assert_eq!(
        err,
        AcquireError::BindFailed {
            endpoint: "vcan0".into(),
            code: Errno::EADDRINUSE as i32,
        }
    );
    assert_eq!(err.native_code(), Some(Errno::EADDRINUSE as i32));
}

#[test]
fn test_successful_handle_is_bound_and_filtered() {
    let bus = VirtualBus::new().with_endpoint("vcan0");
    let filter = FilterSpec::new(0x18DA_F110, 0x1FFF_FFFF, 0);

    let handle = acquire_and_bind(&bus, Some("vcan0"), &filter).unwrap();
    assert_eq!(bus.binding_of(&handle), Some(1));
    assert_eq!(bus.installed_filter("vcan0"), Some(filter));

    drop(handle);
    assert_eq!(bus.live_handles(), 0);
}
