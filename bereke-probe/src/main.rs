//! Bereke probe: checks connectivity to the merchant gateway.
//!
//! ```text
//! bereke-probe <config.toml> [order-id]
//! ```
//!
//! Loads the configuration, pings the gateway and, when an order id is given,
//! queries its status. Prints a JSON report on stdout and exits non-zero if
//! any step failed.
//!
//! # Environment Variables
//!
//! - `LOG_FORMAT`: `json` or `pretty` (default: `pretty`)
//! - `RUST_LOG`: log level filter (default: `info`)
//! - whatever secret variables the configuration names

#![allow(
    clippy::print_stdout,
    clippy::print_stderr,
    reason = "command-line tool prints its report"
)]

mod observability;

use std::process::ExitCode;

use bereke_merchant::{GatewayConfig, MerchantClient};
use observability::{CheckStatus, LogFormat, ProbeCheck, ProbeReport, init_observability};
use tracing::{info, warn};

const USAGE: &str = "usage: bereke-probe <config.toml> [order-id]";

#[tokio::main]
async fn main() -> ExitCode {
    init_observability(LogFormat::from_env());

    let mut args = std::env::args().skip(1);
    let Some(config_path) = args.next() else {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };
    let order_id = args.next();

    let report = run(&config_path, order_id.as_deref()).await;

    match report.to_json() {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("failed to render report: {e}"),
    }

    if report.status() == CheckStatus::Fail { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

async fn run(config_path: &str, order_id: Option<&str>) -> ProbeReport {
    let mut report = ProbeReport::new();

    let client = match GatewayConfig::from_file(config_path)
        .and_then(|config| MerchantClient::from_config(&config))
    {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "configuration rejected");
            report.checks.push(ProbeCheck::fail("config", e.to_string()));
            return report;
        }
    };

    let dispatcher = client.dispatcher();
    report.environment = Some(dispatcher.environment().to_string());
    report.base_url = Some(dispatcher.base_url().to_owned());
    report.checks.push(ProbeCheck::pass(
        "config",
        format!(
            "auth mode {}, signing {}, transport {}",
            dispatcher.auth_mode().as_str(),
            if dispatcher.signs_requests() { "on" } else { "off" },
            dispatcher.protocol_name()
        ),
    ));

    match client.ping().await {
        Ok(()) => {
            info!("gateway reachable");
            report.checks.push(ProbeCheck::pass("ping", "gateway reachable"));
        }
        Err(e) => {
            warn!(error = %e, "gateway unreachable");
            report.checks.push(ProbeCheck::fail("ping", e.to_string()));
            return report;
        }
    }

    if let Some(order_id) = order_id {
        report.checks.push(check_order_status(&client, order_id).await);
    }

    report
}

async fn check_order_status(client: &MerchantClient, order_id: &str) -> ProbeCheck {
    match client.get_order_status_by_id(order_id).await {
        Ok(status) => match status.response.ensure_success() {
            Ok(()) => ProbeCheck::pass(
                "order_status",
                format!("order {order_id}: {:?}", status.order_status),
            ),
            Err(e) => ProbeCheck::warn("order_status", e.to_string()),
        },
        Err(e) => {
            warn!(error = %e, order_id, "order status query failed");
            ProbeCheck::fail("order_status", e.to_string())
        }
    }
}
