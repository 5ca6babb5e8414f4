//! Runs a full register flow with no backend configured: every remote write
//! is simulated, so the whole demo works offline.
//!
//! ```sh
//! cargo run -p souk-engine --example offline_demo
//! ```

use std::sync::Arc;

use souk_core::{DiscountSpec, Money, Product};
use souk_engine::{checkout, Cart, CheckoutOutcome, CustomerInput, SessionManager};
use souk_store::{EntityStore, LocalStore, SharedStore};
use souk_sync::{RemoteClient, SyncCoordinator};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let dir = tempfile::tempdir()?;
    let local = LocalStore::open(dir.path())?;
    let mut store = EntityStore::new(local);
    store.load();

    let client = Arc::new(RemoteClient::new());
    let coordinator = SyncCoordinator::new(SharedStore::new(store), client.clone());
    let session = SessionManager::new(coordinator.clone(), client);

    let user = session.login("demo@souk.example").await?;
    println!("logged in as {} ({:?})", user.name, user.role);

    // Stock the shelf
    coordinator
        .save_product(Product {
            id: "tea-01".to_string(),
            name: "Mint Tea".to_string(),
            price: Money::from_cents(1_200),
            stock: 10,
            image: String::new(),
            category: Some("Drinks".to_string()),
            barcode: None,
        })
        .await?;
    coordinator
        .save_product(Product {
            id: "baklava-01".to_string(),
            name: "Baklava Box".to_string(),
            price: Money::from_cents(4_500),
            stock: 4,
            image: String::new(),
            category: Some("Sweets".to_string()),
            barcode: None,
        })
        .await?;

    // Ring up an order
    let mut cart = Cart::new();
    let tax = coordinator.store().with(|s| s.settings.tax_rate);
    let (tea, baklava) = coordinator
        .store()
        .with(|s| (s.products[0].clone(), s.products[1].clone()));

    cart.add_line(&tea, 2, tax)?;
    let line = cart.add_line(&baklava, 1, tax)?.id.clone();
    cart.set_discount(&line, DiscountSpec::percentage(10.0))?;

    let totals = cart.totals();
    println!(
        "cart: {} items, subtotal {}, discount {}, total {}",
        totals.quantity, totals.subtotal, totals.discount, totals.total
    );

    let outcome = checkout(
        &coordinator,
        &mut cart,
        &CustomerInput {
            name: "Nadia".to_string(),
            phone: "0600000000".to_string(),
            address: String::new(),
        },
    )
    .await?;

    println!("{}", outcome.describe());
    if let CheckoutOutcome::Completed { receipt } | CheckoutOutcome::Partial { receipt, .. } =
        outcome
    {
        println!("--- {} ---", receipt.store_name);
        for line in &receipt.lines {
            println!("{:>2} x {:<16} {}", line.quantity, line.name, line.total);
        }
        println!("total: {} {}", receipt.totals.total, receipt.currency);
    }

    // Low-stock alerts queued by the checkout
    for alert in coordinator.store().with_mut(|s| s.take_alerts()) {
        println!("[{:?}] {}", alert.level, alert.message);
    }

    Ok(())
}
