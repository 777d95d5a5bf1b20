//! Terminal order dashboard.
//!
//! Lists the active orders, then refreshes the list whenever an order event arrives on the
//! live stream. Pass an order id and a status to move that order first.
//!
//! ```sh
//! RUST_LOG=info cargo run --example dashboard --features orders,events,tracing
//! RUST_LOG=info cargo run --example dashboard --features orders,events,tracing -- 6f1c2d3e-4b5a-4c6d-8e7f-8091a2b3c4d5 preparing
//! ```
//!
//! `ORDERS_URL` points at the order service (default `http://localhost:3000`) and
//! `ORDERS_TOKEN`, if set, is sent as a bearer token.

use themenu_client::events::{Config as StreamConfig, StreamClient};
use themenu_client::orders::types::{OrderStatus, UpdateOrderStatusRequest};
use themenu_client::orders::{Client, Config};
use themenu_client::types::Uuid;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

async fn show_active_orders(client: &Client) {
    match client.active_orders().await {
        Ok(orders) => {
            info!(active = orders.len(), "active orders");
            for order in orders {
                info!(
                    id = %order.id,
                    dish = %order.dish_name,
                    price = %order.dish_price,
                    status = %order.status,
                    updated_at = %order.updated_at,
                );
            }
        }
        Err(e) => error!(endpoint = "orders", error = %e),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let host =
        std::env::var("ORDERS_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
    let config = match std::env::var("ORDERS_TOKEN") {
        Ok(token) => Config::builder().bearer_token(token).build(),
        Err(_) => Config::default(),
    };
    let client = Client::new(&host, config)?;

    let mut args = std::env::args().skip(1);
    if let (Some(order_id), Some(status)) = (args.next(), args.next()) {
        let order_id = Uuid::parse_str(&order_id)?;
        let status: OrderStatus = serde_json::from_value(serde_json::Value::String(status))?;
        let request = UpdateOrderStatusRequest::builder().status(status).build();

        match client.update_order_status(order_id, &request).await {
            Ok(response) => info!(endpoint = "update_order_status", message = %response.message),
            Err(e) => error!(endpoint = "update_order_status", error = %e),
        }
    }

    show_active_orders(&client).await;

    let (refresh_tx, mut refresh_rx) = mpsc::unbounded_channel();
    let (failed_tx, mut failed_rx) = mpsc::unbounded_channel();

    let stream = StreamClient::new(client.events_endpoint()?, StreamConfig::default());
    stream.on_event(move |event| {
        info!(event_type = %event.event_type, status = %event.status, "order event");
        if event.is_order_event() {
            _ = refresh_tx.send(());
        }
    });
    stream.on_error(move |e| {
        if e.is_terminal() {
            _ = failed_tx.send(e.to_string());
        } else {
            warn!(error = %e, "event stream");
        }
    });
    stream.start();

    loop {
        tokio::select! {
            Some(()) = refresh_rx.recv() => show_active_orders(&client).await,
            Some(reason) = failed_rx.recv() => {
                error!(%reason, "live updates stopped, restart the dashboard to reconnect");
                break;
            }
            else => break,
        }
    }

    stream.shutdown().await;

    Ok(())
}
