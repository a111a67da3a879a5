/*!
 * Configuration Tests
 * File loading and BRIDGE_* environment overrides
 */

use bus_bridge::{Bridge, BridgeConfig, PlatformSelection, PlatformType};
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::io::Write;

const ENV_KEYS: [&str; 6] = [
    "BRIDGE_CONFIG",
    "BRIDGE_TABLE_CAPACITY",
    "BRIDGE_FIRST_DESCRIPTOR",
    "BRIDGE_PLATFORM",
    "BRIDGE_SETTLE_DELAY_MS",
    "BRIDGE_VIRTUAL_ENDPOINTS",
];

fn clear_env() {
    for key in ENV_KEYS {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_load_defaults_without_environment() {
    clear_env();
    let config = BridgeConfig::load().unwrap();
    assert_eq!(config, BridgeConfig::default());
}

#[test]
#[serial]
fn test_environment_overrides() {
    clear_env();
    std::env::set_var("BRIDGE_TABLE_CAPACITY", "8");
    std::env::set_var("BRIDGE_FIRST_DESCRIPTOR", "10");
    std::env::set_var("BRIDGE_PLATFORM", "virtual");
    std::env::set_var("BRIDGE_VIRTUAL_ENDPOINTS", "vcan0, vcan1,,");

    let config = BridgeConfig::load();
    clear_env();
    let config = config.unwrap();

    assert_eq!(config.table_capacity, 8);
    assert_eq!(config.first_descriptor, 10);
    assert_eq!(config.platform, PlatformSelection::Virtual);
    assert_eq!(config.virtual_endpoints, vec!["vcan0", "vcan1"]);
}

#[test]
#[serial]
fn test_malformed_environment_is_rejected() {
    clear_env();
    std::env::set_var("BRIDGE_TABLE_CAPACITY", "lots");
    let result = BridgeConfig::load();
    clear_env();
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_file_then_environment() {
    clear_env();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{ "table_capacity": 4, "platform": "virtual", "virtual_endpoints": ["bench0"] }}"#
    )
    .unwrap();

    std::env::set_var("BRIDGE_CONFIG", file.path());
    std::env::set_var("BRIDGE_TABLE_CAPACITY", "6");
    let config = BridgeConfig::load();
    clear_env();
    let config = config.unwrap();

    assert_eq!(config.table_capacity, 6);
    assert_eq!(config.virtual_endpoints, vec!["bench0"]);

    let bridge = Bridge::from_config(config).unwrap();
    assert_eq!(bridge.platform().platform(), PlatformType::Virtual);
    assert_eq!(bridge.activate_transport(Some("bench0")), 0);
    assert!(bridge.open_bus_endpoint(Some("bench0")) >= 3);
}

#[test]
fn test_invalid_configuration_is_refused() {
    let config = BridgeConfig {
        table_capacity: 0,
        ..Default::default()
    };
    assert!(Bridge::from_config(config).is_err());

    let config = BridgeConfig {
        first_descriptor: i32::MAX as u32,
        table_capacity: 2,
        ..Default::default()
    };
    assert!(config.validate().is_err());
}
