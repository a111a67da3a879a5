/*!
 * Bus Bridge - Main Entry Point
 *
 * Opens one bus endpoint through the bridge and prints its portable metadata:
 * - `bus-bridge <endpoint>` opens and stats the endpoint
 * - `bus-bridge --activate <endpoint>` brings the endpoint up first
 */

use bus_bridge::{init_tracing, Bridge, BridgeConfig, BridgeStatus};
use miette::IntoDiagnostic;
use tracing::{error, info};

fn main() -> miette::Result<()> {
    init_tracing();

    let mut activate = false;
    let mut endpoint = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--activate" => activate = true,
            _ => endpoint = Some(arg),
        }
    }

    let config = BridgeConfig::load()?;
    let bridge = Bridge::from_config(config)?;
    info!(bridge = ?bridge, "bus bridge started");

    if activate {
        let liveness = bridge
            .try_activate_transport(endpoint.as_deref())
            .inspect_err(|e| error!(status = BridgeStatus::from(e).code(), "activation failed"))?;
        info!(?liveness, "endpoint active");
    }

    let id = bridge.try_open_bus_endpoint(endpoint.as_deref())?;
    let stat = bridge.stat(id)?;
    let info = bridge.descriptor_info(id)?;

    let report = serde_json::json!({
        "descriptor": id,
        "rights": info.rights,
        "stat": stat,
    });
    println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);

    bridge.close(id)?;
    Ok(())
}
