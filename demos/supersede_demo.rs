//! Fires two identical GET requests back to back: the first is superseded
//! and settles as a cancellation failure, the second reaches the network.
//!
//! Run with `RUST_LOG=debug cargo run --example supersede_demo`.

use request_coordinator::{RequestConfig, RequestCoordinator};
use std::time::Duration;

#[tokio::main]
async fn main() {
    env_logger::init();

    let coordinator = RequestCoordinator::new();
    let config = RequestConfig::new()
        .param("page", "1")
        .timeout(Duration::from_secs(10));

    let (first, second) = futures::join!(
        coordinator.get("https://example.com/items", Some(config.clone())),
        coordinator.get("https://example.com/items", Some(config)),
    );

    for (label, outcome) in [("first", first), ("second", second)] {
        match outcome {
            Ok(envelope) => println!("{label}: {} {}", envelope.code, envelope.message),
            Err(error) if error.is_canceled() => println!("{label}: superseded"),
            Err(error) => println!("{label}: failed: {error}"),
        }
    }
}
