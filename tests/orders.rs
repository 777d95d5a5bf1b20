#![cfg(feature = "orders")]
#![allow(
    clippy::unwrap_used,
    reason = "Do not need additional syntax for setting up tests"
)]

use serde_json::{Value, json};

const FIRST_ORDER: &str = "6f1c2d3e-4b5a-4c6d-8e7f-8091a2b3c4d5";
const SECOND_ORDER: &str = "7a2d3e4f-5c6b-4d7e-9f80-91a2b3c4d5e6";
const THIRD_ORDER: &str = "8b3e4f50-6d7c-4e8f-a091-a2b3c4d5e6f7";
const USER: &str = "0b7d5a26-7f7f-4c3e-9d6e-7f3a7f0b7d5a";
const DISH: &str = "2d9f7c48-9191-4e50-bf80-915c9122f97c";

fn order_json(id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "user_id": USER,
        "dish_id": DISH,
        "status": status,
        "dish_name": "Pasta",
        "dish_description": "Fresh tagliatelle",
        "dish_price": 12.5,
        "created_at": "2024-05-01T12:00:00Z",
        "updated_at": "2024-05-01T12:05:00.123456789Z"
    })
}

mod list {
    use httpmock::{Method::GET, MockServer};
    use reqwest::StatusCode;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use themenu_client::orders::types::OrderStatus;
    use themenu_client::orders::{Client, Config};
    use themenu_client::types::Uuid;

    use super::{DISH, FIRST_ORDER, SECOND_ORDER, THIRD_ORDER, order_json};

    #[tokio::test]
    async fn orders_should_succeed() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = Client::new(&server.base_url(), Config::default())?;

        let mock = server.mock(|when, then| {
            when.method(GET).path("/orders");
            then.status(StatusCode::OK).json_body(json!([
                order_json(FIRST_ORDER, "received"),
                order_json(SECOND_ORDER, "served")
            ]));
        });

        let orders = client.orders().await?;

        assert_eq!(orders.len(), 2);
        let first = &orders[0];
        assert_eq!(first.id, Uuid::parse_str(FIRST_ORDER)?);
        assert_eq!(first.dish_id, Uuid::parse_str(DISH)?);
        assert_eq!(first.status, OrderStatus::Received);
        assert_eq!(first.dish_name, "Pasta");
        assert_eq!(first.dish_description, "Fresh tagliatelle");
        assert_eq!(first.dish_price, dec!(12.5));
        assert!(first.updated_at > first.created_at, "timestamps decode in order");
        assert_eq!(orders[1].status, OrderStatus::Served);
        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn empty_list_should_succeed() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = Client::new(&server.base_url(), Config::default())?;

        let mock = server.mock(|when, then| {
            when.method(GET).path("/orders");
            then.status(StatusCode::OK).json_body(json!([]));
        });

        assert!(client.orders().await?.is_empty(), "no orders expected");
        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn unknown_status_and_fields_are_tolerated() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = Client::new(&server.base_url(), Config::default())?;

        let mut order = order_json(FIRST_ORDER, "pending");
        order["table"] = json!(7);
        let mock = server.mock(|when, then| {
            when.method(GET).path("/orders");
            then.status(StatusCode::OK).json_body(json!([order.clone()]));
        });

        let orders = client.orders().await?;

        assert_eq!(
            orders[0].status,
            OrderStatus::Unknown("pending".to_owned())
        );
        assert!(orders[0].is_active(), "unknown statuses are not terminal");
        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn active_orders_should_skip_finished() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = Client::new(&server.base_url(), Config::default())?;

        let mock = server.mock(|when, then| {
            when.method(GET).path("/orders");
            then.status(StatusCode::OK).json_body(json!([
                order_json(FIRST_ORDER, "preparing"),
                order_json(SECOND_ORDER, "served"),
                order_json(THIRD_ORDER, "cancelled")
            ]));
        });

        let orders = client.active_orders().await?;

        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, Uuid::parse_str(FIRST_ORDER)?);
        assert_eq!(orders[0].status, OrderStatus::Preparing);
        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn bearer_token_should_be_sent() -> anyhow::Result<()> {
        let server = MockServer::start();
        let config = Config::builder()
            .bearer_token("secret-token".to_owned())
            .build();
        let client = Client::new(&server.base_url(), config)?;

        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/orders")
                .header("authorization", "Bearer secret-token");
            then.status(StatusCode::OK).json_body(json!([]));
        });

        client.orders().await?;
        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn host_with_path_prefix_should_succeed() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = Client::new(&server.url("/api"), Config::default())?;

        let mock = server.mock(|when, then| {
            when.method(GET).path("/api/orders");
            then.status(StatusCode::OK).json_body(json!([]));
        });

        client.orders().await?;
        mock.assert();
        assert_eq!(client.events_endpoint()?.path(), "/api/events");

        Ok(())
    }
}

mod update_status {
    use httpmock::{Method::PATCH, MockServer};
    use reqwest::StatusCode;
    use serde_json::json;
    use themenu_client::error::{Kind, Status};
    use themenu_client::orders::types::{OrderStatus, UpdateOrderStatusRequest};
    use themenu_client::orders::{Client, Config};
    use themenu_client::types::Uuid;

    use super::FIRST_ORDER;

    #[tokio::test]
    async fn update_order_status_should_succeed() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = Client::new(&server.base_url(), Config::default())?;
        let order_id = Uuid::parse_str(FIRST_ORDER)?;

        let mock = server.mock(|when, then| {
            when.method(PATCH)
                .path(format!("/orders/{FIRST_ORDER}/status"))
                .header("Content-Type", "application/json")
                .json_body(json!({ "status": "preparing" }));
            then.status(StatusCode::OK).json_body(json!({
                "message": format!("Order {FIRST_ORDER} updated to preparing")
            }));
        });

        let request = UpdateOrderStatusRequest::builder()
            .status(OrderStatus::Preparing)
            .build();
        let response = client.update_order_status(order_id, &request).await?;

        assert_eq!(
            response.message,
            format!("Order {FIRST_ORDER} updated to preparing")
        );
        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn server_error_should_fail_with_status() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = Client::new(&server.base_url(), Config::default())?;
        let order_id = Uuid::parse_str(FIRST_ORDER)?;

        let mock = server.mock(|when, then| {
            when.method(PATCH).path(format!("/orders/{FIRST_ORDER}/status"));
            then.status(StatusCode::INTERNAL_SERVER_ERROR)
                .body("Failed to update order status");
        });

        let request = UpdateOrderStatusRequest::builder()
            .status(OrderStatus::Served)
            .build();
        let err = client
            .update_order_status(order_id, &request)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::Status);
        let status = err.downcast_ref::<Status>().unwrap();
        assert_eq!(status.status_code, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status.path, format!("/orders/{FIRST_ORDER}/status"));
        assert_eq!(status.message, "Failed to update order status");
        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn unknown_status_should_fail_locally() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = Client::new(&server.base_url(), Config::default())?;
        let order_id = Uuid::parse_str(FIRST_ORDER)?;

        let mock = server.mock(|when, then| {
            when.method(PATCH).path(format!("/orders/{FIRST_ORDER}/status"));
            then.status(StatusCode::OK)
                .json_body(json!({ "message": "unexpected" }));
        });

        let request = UpdateOrderStatusRequest::builder()
            .status(OrderStatus::Unknown("pending".to_owned()))
            .build();
        let err = client
            .update_order_status(order_id, &request)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::Validation);
        assert!(
            err.to_string().contains("pending"),
            "error should name the rejected status: {err}"
        );
        mock.assert_calls(0);

        Ok(())
    }
}
