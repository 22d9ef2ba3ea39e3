//! Order status example.
//!
//! Loads a client from a TOML configuration file and prints the extended
//! status of one order.
//!
//! # Usage
//!
//! ```bash
//! BEREKE_TOKEN=... cargo run --example order_status -- bereke.toml <order-id>
//! ```
#![allow(clippy::print_stdout, reason = "example demonstrates output")]

use bereke_merchant::MerchantClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let (Some(config), Some(order_id)) = (args.next(), args.next()) else {
        return Err("usage: order_status <config.toml> <order-id>".into());
    };

    let client = MerchantClient::from_config_file(config)?;
    let status = client.get_order_status_by_id(&order_id).await?;

    if !status.response.is_success() {
        println!(
            "Gateway error {}: {}",
            status.response.error_code, status.response.error_message
        );
        return Ok(());
    }

    println!("Order {} ({})", status.order_number, status.order_id);
    println!("  Status: {:?}", status.order_status);
    println!("  Amount: {} {}", status.amount()?, status.currency);
    if let Some(registered) = status.registered_at() {
        println!("  Registered: {registered}");
    }
    if let Some(card) = &status.card_auth_info {
        println!("  Card: {} ({})", card.masked_pan, card.cardholder_name);
    }
    if let Some(amounts) = &status.payment_amount_info {
        println!(
            "  Approved/deposited/refunded: {}/{}/{} ({})",
            amounts.approved_amount,
            amounts.deposited_amount,
            amounts.refunded_amount,
            amounts.payment_state
        );
    }

    Ok(())
}
