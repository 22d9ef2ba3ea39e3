//! Order registration example.
//!
//! Registers a one-phase order on the test gateway and prints the payment
//! page URL the customer should be redirected to.
//!
//! # Usage
//!
//! ```bash
//! BEREKE_LOGIN=merchant-api BEREKE_PASSWORD=secret cargo run --example register_order
//! ```
#![allow(clippy::print_stdout, reason = "example demonstrates output")]

use bereke_merchant::{
    MerchantClient,
    currency::KZT,
    orders::{PaymentFeature, RegisterOrderRequest},
};
use rust_decimal_macros::dec;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let login = std::env::var("BEREKE_LOGIN")?;
    let password = std::env::var("BEREKE_PASSWORD")?;

    let client = MerchantClient::with_login(login, password, "test")?;

    println!("1. Gateway");
    println!("   Base URL: {}", client.dispatcher().base_url());
    client.ping().await?;
    println!("   Reachable\n");

    let request = RegisterOrderRequest {
        return_url: "https://shop.example.kz/payment/ok".to_owned(),
        fail_url: "https://shop.example.kz/payment/fail".to_owned(),
        description: "Coffee beans, 1 kg".to_owned(),
        language: "ru".to_owned(),
        session_timeout_secs: Some(1200),
        features: Some(PaymentFeature::ForceTds),
        ..RegisterOrderRequest::new(format!("DEMO-{}", std::process::id()), dec!(4990), KZT)
    };

    println!("2. Registering order {}", request.order_number);
    let response = client.register_order(&request).await?;
    response.response.ensure_success()?;

    println!("   Order ID: {}", response.order_id);
    println!("   Payment page: {}", response.form_url);

    Ok(())
}
