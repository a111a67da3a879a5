/*!
 * Property Tests
 * Timestamp normalization, file type classification and rights policy
 */

use bus_bridge::acquire::{NativeHandle, VirtualHandle};
use bus_bridge::metadata::{classify, normalize_timestamp, NativeMetadata, ResourceType, SocketKind};
use bus_bridge::{DescriptorRegistry, RegistryError, RightsSet};
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_timestamp_is_monotonic_in_seconds(a in 0i64..4_000_000_000, b in 0i64..4_000_000_000, nsec in 0i64..1_000_000_000) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(normalize_timestamp(lo, nsec) <= normalize_timestamp(hi, nsec));
    }

    #[test]
    fn prop_pre_epoch_is_zero(seconds in i64::MIN..0, nsec in any::<i64>()) {
        prop_assert_eq!(normalize_timestamp(seconds, nsec), 0);
    }

    #[test]
    fn prop_nanoseconds_stay_in_range(seconds in 0i64..1_000_000, nsec in any::<i64>()) {
        let ts = normalize_timestamp(seconds, nsec);
        prop_assert_eq!(ts / 1_000_000_000, seconds as u64);
    }

    #[test]
    fn prop_classify_without_socket_never_probes(mode in any::<u32>()) {
        let is_socket = mode & 0o170000 == 0o140000;
        let mut probed = false;
        let kind = classify(mode, || {
            probed = true;
            Ok::<_, ()>(SocketKind::Stream)
        });
        prop_assert_eq!(probed, is_socket);
        if is_socket {
            prop_assert_eq!(kind, ResourceType::SocketStream);
        }
    }

    #[test]
    fn prop_resource_type_codes_round_trip(code in 0u8..=255) {
        if let Some(ty) = ResourceType::from_code(code) {
            prop_assert_eq!(ty.code(), code);
        }
    }

    #[test]
    fn prop_derive_never_escalates(parent in any::<(u64, u64)>(), child in any::<(u64, u64)>()) {
        let parent = RightsSet::new(parent.0, parent.1);
        let requested = RightsSet::new(child.0, child.1);
        if let Some(derived) = parent.derive(requested) {
            prop_assert!(derived.base().bits() & !parent.inheriting().bits() == 0);
            prop_assert!(derived.inheriting().bits() & !parent.inheriting().bits() == 0);
        }
    }

    #[test]
    fn prop_insert_accepts_exactly_subsets(max in any::<(u64, u64)>(), requested in any::<(u64, u64)>()) {
        let max = RightsSet::new(max.0, max.1);
        let requested = RightsSet::new(requested.0, requested.1);
        let registry = DescriptorRegistry::new(4, 3, max);
        let handle = NativeHandle::from_virtual(VirtualHandle::new(0, NativeMetadata::default(), |_| {}));

        match registry.insert(handle, ResourceType::CharacterDevice, requested) {
            Ok(id) => {
                prop_assert!(requested.is_subset_of(&max));
                prop_assert_eq!(id, 3);
            }
            Err(rejected) => {
                prop_assert!(!requested.is_subset_of(&max));
                let is_rights_exceeded = matches!(rejected.error, RegistryError::RightsExceeded { .. });
                prop_assert!(is_rights_exceeded);
            }
        }
    }
}
