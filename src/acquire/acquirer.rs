/*!
 * Native Resource Acquirer
 * create -> resolve -> ensure active -> bind -> filter, with cleanup on failure
 */

use super::handle::NativeHandle;
use super::traits::BusPlatform;
use super::types::{AcquireError, AcquireResult, BindTarget, FilterSpec, Liveness};
use crate::core::limits::MAX_ENDPOINT_NAME_LEN;
use tracing::{debug, error, info};

/// Check an endpoint name before anything touches the OS
pub fn validate_endpoint(endpoint: Option<&str>) -> AcquireResult<&str> {
    let name = endpoint.ok_or_else(|| AcquireError::invalid_argument("endpoint name is absent"))?;
    if name.is_empty() {
        return Err(AcquireError::invalid_argument("endpoint name is empty"));
    }
    if name.len() > MAX_ENDPOINT_NAME_LEN {
        return Err(AcquireError::invalid_argument("endpoint name is too long"));
    }
    if name.contains('\0') {
        return Err(AcquireError::invalid_argument("endpoint name contains NUL"));
    }
    Ok(name)
}

/// Create a bus resource, bind it to `endpoint` and install `filter`
///
/// Any partially created handle is dropped, and therefore released exactly
/// once, before an error is returned.
pub fn acquire_and_bind(
    platform: &dyn BusPlatform,
    endpoint: Option<&str>,
    filter: &FilterSpec,
) -> AcquireResult<NativeHandle> {
    let endpoint = validate_endpoint(endpoint)?;

    let handle = platform.create().map_err(|errno| {
        error!(endpoint, errno = %errno, "failed to create bus socket");
        AcquireError::ResourceCreationFailed { code: errno as i32 }
    })?;

    let target = resolve(platform, endpoint)?;
    ensure_active(platform, &target)?;

    debug!(endpoint, index = target.index, "binding bus socket");
    platform.bind(&handle, &target).map_err(|errno| {
        error!(endpoint, errno = %errno, "failed to bind bus socket");
        AcquireError::BindFailed {
            endpoint: endpoint.into(),
            code: errno as i32,
        }
    })?;

    platform
        .apply_filter(&handle, &target, filter)
        .map_err(|errno| {
            error!(endpoint, errno = %errno, "failed to set bus filter");
            AcquireError::FilterRejected {
                endpoint: endpoint.into(),
                code: errno as i32,
            }
        })?;

    info!(endpoint, target = %target, "bus socket bound");
    Ok(handle)
}

/// Resolve and bring up `endpoint` without creating a resource
pub fn activate(platform: &dyn BusPlatform, endpoint: Option<&str>) -> AcquireResult<Liveness> {
    let endpoint = validate_endpoint(endpoint)?;
    let target = resolve(platform, endpoint)?;
    ensure_active(platform, &target)
}

fn resolve(platform: &dyn BusPlatform, endpoint: &str) -> AcquireResult<BindTarget> {
    platform.resolve(endpoint).map_err(|errno| {
        error!(endpoint, errno = %errno, "bus endpoint not found");
        AcquireError::EndpointNotFound {
            endpoint: endpoint.into(),
            code: errno as i32,
        }
    })
}

fn ensure_active(platform: &dyn BusPlatform, target: &BindTarget) -> AcquireResult<Liveness> {
    let liveness = platform.ensure_active(target).map_err(|errno| {
        error!(endpoint = %target.name, errno = %errno, "failed to bring endpoint up");
        AcquireError::EndpointActivationFailed {
            endpoint: target.name.clone(),
            code: errno as i32,
        }
    })?;
    if liveness == Liveness::Activated {
        info!(endpoint = %target.name, "endpoint brought up");
    }
    Ok(liveness)
}
