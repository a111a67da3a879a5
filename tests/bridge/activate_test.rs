/*!
 * Activation Tests
 * Bringing endpoints up, on request and during open
 */

use bus_bridge::{Bridge, BridgeConfig, BridgeStatus, Liveness, VirtualBus};
use nix::errno::Errno;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn bridge_over(bus: &VirtualBus) -> Bridge {
    Bridge::new(Arc::new(bus.clone()), BridgeConfig::default()).unwrap()
}

#[test]
fn test_activate_brings_endpoint_up_once() {
    let bus = VirtualBus::new().with_inactive_endpoint("vcan0");
    let bridge = bridge_over(&bus);

    assert_eq!(bus.is_active("vcan0"), Some(false));
    assert_eq!(
        bridge.try_activate_transport(Some("vcan0")).unwrap(),
        Liveness::Activated
    );
    assert_eq!(bus.is_active("vcan0"), Some(true));
    assert_eq!(
        bridge.try_activate_transport(Some("vcan0")).unwrap(),
        Liveness::AlreadyActive
    );
    assert_eq!(bridge.activate_transport(Some("vcan0")), 0);
    assert_eq!(bus.created_handles(), 0);
}

#[test]
fn test_activate_validates_and_resolves() {
    let bus = VirtualBus::new().with_inactive_endpoint("vcan0");
    let bridge = bridge_over(&bus);

    assert_eq!(
        bridge.activate_transport(None),
        BridgeStatus::InvalidArgument.code()
    );
    assert_eq!(
        bridge.activate_transport(Some("can9")),
        BridgeStatus::EndpointNotFound.code()
    );
    assert_eq!(bus.is_active("vcan0"), Some(false));
}

#[test]
fn test_open_activates_inactive_endpoint() {
    let bus = VirtualBus::new().with_inactive_endpoint("vcan0");
    let bridge = bridge_over(&bus);

    let id = bridge.open_bus_endpoint(Some("vcan0"));
    assert!(id >= 3);
    assert_eq!(bus.is_active("vcan0"), Some(true));
}

#[test]
fn test_activation_failure_is_fatal_for_open() {
    let bus = VirtualBus::new()
        .with_inactive_endpoint("vcan0")
        .fail_activation("vcan0", Errno::EPERM);
    let bridge = bridge_over(&bus);

    assert_eq!(
        bridge.open_bus_endpoint(Some("vcan0")),
        BridgeStatus::EndpointActivationFailed.code()
    );
    assert_eq!(
        bridge.activate_transport(Some("vcan0")),
        BridgeStatus::EndpointActivationFailed.code()
    );
    assert_eq!(bus.live_handles(), 0);
    assert!(bridge.registry().is_empty());
}

#[test]
fn test_settle_delay_applies_only_on_bring_up() {
    let bus = VirtualBus::new()
        .with_inactive_endpoint("vcan0")
        .with_settle_delay(Duration::from_millis(30));
    let bridge = bridge_over(&bus);

    let start = Instant::now();
    bridge.try_activate_transport(Some("vcan0")).unwrap();
    assert!(start.elapsed() >= Duration::from_millis(30));

    let start = Instant::now();
    bridge.try_activate_transport(Some("vcan0")).unwrap();
    assert!(start.elapsed() < Duration::from_millis(30));
}
