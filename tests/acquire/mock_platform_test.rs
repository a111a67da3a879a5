/*!
 * Acquirer Step Ordering Tests
 * Drives the acquirer against a mocked platform
 */

use bus_bridge::acquire::{
    acquire_and_bind, activate, AcquireError, BindTarget, BusPlatform, FilterSpec, Liveness,
    NativeHandle, PlatformType, VirtualHandle,
};
use bus_bridge::metadata::{NativeMetadata, ResourceType};
use mockall::{mock, predicate::*, Sequence};
use nix::errno::Errno;
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

mock! {
    pub Platform {}

    impl BusPlatform for Platform {
        fn create(&self) -> nix::Result<NativeHandle>;
        fn resolve(&self, endpoint: &str) -> nix::Result<BindTarget>;
        fn ensure_active(&self, target: &BindTarget) -> nix::Result<Liveness>;
        fn bind(&self, handle: &NativeHandle, target: &BindTarget) -> nix::Result<()>;
        fn apply_filter(
            &self,
            handle: &NativeHandle,
            target: &BindTarget,
            filter: &FilterSpec,
        ) -> nix::Result<()>;
        fn resource_type(&self) -> ResourceType;
        fn is_supported(&self) -> bool;
        fn platform(&self) -> PlatformType;
    }
}

fn target() -> BindTarget {
    BindTarget {
        name: "can0".into(),
        index: 4,
    }
}

fn counted_handle(released: &Arc<AtomicUsize>) -> NativeHandle {
    let released = Arc::clone(released);
    NativeHandle::from_virtual(VirtualHandle::new(1, NativeMetadata::default(), move |_| {
        released.fetch_add(1, Ordering::SeqCst);
    }))
}

#[test]
fn test_steps_run_in_order() {
    let released = Arc::new(AtomicUsize::new(0));
    let mut platform = MockPlatform::new();
    let mut seq = Sequence::new();

    let handle_source = Arc::clone(&released);
    platform
        .expect_create()
        .times(1)
        .in_sequence(&mut seq)
        .returning(move || Ok(counted_handle(&handle_source)));
    platform
        .expect_resolve()
        .withf(|endpoint: &str| endpoint == "can0")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(target()));
    platform
        .expect_ensure_active()
        .with(eq(target()))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(Liveness::AlreadyActive));
    platform
        .expect_bind()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(()));
    platform
        .expect_apply_filter()
        .withf(|_, t, f| t.index == 4 && *f == FilterSpec::new(0x100, 0x7FF, 0))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Ok(()));

    let handle =
        acquire_and_bind(&platform, Some("can0"), &FilterSpec::new(0x100, 0x7FF, 0)).unwrap();
    assert_eq!(released.load(Ordering::SeqCst), 0);
    drop(handle);
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[test]
fn test_invalid_name_touches_nothing() {
    let mut platform = MockPlatform::new();
    platform.expect_create().never();
    platform.expect_resolve().never();

    for name in [None, Some("")] {
        let err = acquire_and_bind(&platform, name, &FilterSpec::ALLOW_ALL).unwrap_err();
        assert!(matches!(err, AcquireError::InvalidArgument(_)));
    }
}

#[test]
fn test_resolution_failure_stops_before_bind() {
    let released = Arc::new(AtomicUsize::new(0));
    let mut platform = MockPlatform::new();

    let handle_source = Arc::clone(&released);
    platform
        .expect_create()
        .times(1)
        .returning(move || Ok(counted_handle(&handle_source)));
    platform
        .expect_resolve()
        .times(1)
        .returning(|_| Err(Errno::ENODEV));
    platform.expect_ensure_active().never();
    platform.expect_bind().never();
    platform.expect_apply_filter().never();

    let err = acquire_and_bind(&platform, Some("can0"), &FilterSpec::ALLOW_ALL).unwrap_err();
    assert_eq!(
        err,
        AcquireError::EndpointNotFound {
            endpoint: "can0".into(),
            code: Errno::ENODEV as i32,
        }
    );
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[test]
fn test_activate_never_creates() {
    let mut platform = MockPlatform::new();
    platform.expect_create().never();
    platform.expect_resolve().returning(|_| Ok(target()));
    platform
        .expect_ensure_active()
        .times(1)
        .returning(|_| Ok(Liveness::Activated));

    assert_eq!(activate(&platform, Some("can0")), Ok(Liveness::Activated));
}
