/*!
 * Open Endpoint Tests
 * Descriptor allocation and argument validation for open_bus_endpoint
 */

use bus_bridge::{Bridge, BridgeConfig, BridgeStatus, FilterSpec, VirtualBus};
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use std::sync::Arc;

fn bridge_over(bus: &VirtualBus) -> Bridge {
    Bridge::new(Arc::new(bus.clone()), BridgeConfig::default()).unwrap()
}

#[test]
fn test_open_hands_out_distinct_descriptors() {
    let bus = VirtualBus::new().with_endpoint("vcan0");
    let bridge = bridge_over(&bus);

    let ids: HashSet<i32> = (0..16)
        .map(|_| bridge.open_bus_endpoint(Some("vcan0")))
        .collect();

    assert_eq!(ids.len(), 16);
    assert!(ids.iter().all(|id| *id >= 3));
    assert_eq!(bridge.registry().len(), 16);
    assert_eq!(bus.live_handles(), 16);
}

#[test]
fn test_empty_name_creates_nothing() {
    let bus = VirtualBus::new().with_endpoint("vcan0");
    let bridge = bridge_over(&bus);

    assert_eq!(
        bridge.open_bus_endpoint(Some("")),
        BridgeStatus::InvalidArgument.code()
    );
    assert_eq!(bus.created_handles(), 0);
    assert!(bridge.registry().is_empty());
}

#[test]
fn test_overlong_or_nul_name_is_rejected() {
    let bus = VirtualBus::new().with_endpoint("vcan0");
    let bridge = bridge_over(&bus);

    assert_eq!(
        bridge.open_bus_endpoint(Some("a-very-long-interface")),
        BridgeStatus::InvalidArgument.code()
    );
    assert_eq!(
        bridge.open_bus_endpoint(Some("vcan\u{0}0")),
        BridgeStatus::InvalidArgument.code()
    );
    assert_eq!(bus.created_handles(), 0);
}

#[test]
fn test_unknown_endpoint_releases_handle() {
    let bus = VirtualBus::new().with_endpoint("vcan0");
    let bridge = bridge_over(&bus);

    assert_eq!(
        bridge.open_bus_endpoint(Some("can7")),
        BridgeStatus::EndpointNotFound.code()
    );
    assert_eq!(bus.created_handles(), 1);
    assert_eq!(bus.live_handles(), 0);
    assert!(bridge.registry().is_empty());
}

#[test]
fn test_enumerating_platform_ignores_name() {
    let bus = VirtualBus::new()
        .with_endpoint("bus0")
        .with_endpoint("bus1")
        .enumerating();
    let bridge = bridge_over(&bus);

    let id = bridge.open_bus_endpoint(Some("anything"));
    assert!(id >= 3);
    let bound = bridge
        .registry()
        .with_handle(id as u32, |handle, _| bus.binding_of(handle))
        .unwrap();
    assert_eq!(bound, Some(1));
}

#[test]
fn test_configured_filter_is_installed() {
    let bus = VirtualBus::new().with_endpoint("vcan0");
    let config = BridgeConfig {
        filter: FilterSpec::new(0x100, 0x700, 0),
        ..Default::default()
    };
    let bridge = Bridge::new(Arc::new(bus.clone()), config).unwrap();

    bridge.try_open_bus_endpoint(Some("vcan0")).unwrap();
    assert_eq!(
        bus.installed_filter("vcan0"),
        Some(FilterSpec::new(0x100, 0x700, 0))
    );

    let explicit = FilterSpec::new(0x7E8, 0x7FF, 0);
    bridge
        .open_bus_endpoint_with_filter(Some("vcan0"), &explicit)
        .unwrap();
    assert_eq!(bus.installed_filter("vcan0"), Some(explicit));
}
