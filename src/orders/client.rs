use std::time::Duration;

use bon::Builder;
use reqwest::{
    Client as ReqwestClient, Method, RequestBuilder,
    header::{HeaderMap, HeaderValue},
};
use secrecy::{ExposeSecret as _, SecretString};
use url::Url;
use uuid::Uuid;

use super::types::{Order, UpdateOrderStatusRequest, UpdateOrderStatusResponse};
use crate::Result;

/// Matches the timeout the dashboard server uses for its own upstream calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for [`Client`]
#[derive(Clone, Debug, Builder)]
pub struct Config {
    /// Opaque token sent as `Authorization: Bearer <token>` on every request.
    #[builder(into)]
    bearer_token: Option<SecretString>,
    /// Total time allowed for a single request. Defaults to ten (10) seconds.
    #[builder(default = DEFAULT_TIMEOUT)]
    timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config::builder().build()
    }
}

/// Client for the order API.
///
/// # Example
///
/// ```no_run
/// use themenu_client::orders::{Client, Config};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::new("http://localhost:3000", Config::default())?;
/// let orders = client.orders().await?;
/// println!("{} orders", orders.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Client {
    host: Url,
    client: ReqwestClient,
    bearer_token: Option<SecretString>,
}

impl Client {
    /// Creates a new order API client against `host`.
    ///
    /// # Errors
    ///
    /// Returns an error if the host URL is invalid or the HTTP client fails to build.
    pub fn new(host: &str, config: Config) -> Result<Client> {
        let mut headers = HeaderMap::new();

        headers.insert("User-Agent", HeaderValue::from_static("themenu_client"));
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        let client = ReqwestClient::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        let mut host = Url::parse(host)?;
        if !host.path().ends_with('/') {
            let path = format!("{}/", host.path());
            host.set_path(&path);
        }

        Ok(Self {
            host,
            client,
            bearer_token: config.bearer_token,
        })
    }

    /// Returns the host URL for the client.
    #[must_use]
    pub fn host(&self) -> &Url {
        &self.host
    }

    /// The server-sent event endpoint served next to this API, suitable for
    /// [`StreamClient::new`](crate::events::StreamClient::new).
    pub fn events_endpoint(&self) -> Result<Url> {
        Ok(self.host.join("events")?)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let builder = self.client.request(method, self.host.join(path)?);

        Ok(match &self.bearer_token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        })
    }

    /// List every order known to the server.
    pub async fn orders(&self) -> Result<Vec<Order>> {
        let request = self.request(Method::GET, "orders")?.build()?;

        crate::request(&self.client, request).await
    }

    /// List the orders that still need attention, i.e. neither served nor cancelled.
    pub async fn active_orders(&self) -> Result<Vec<Order>> {
        let mut orders = self.orders().await?;
        orders.retain(Order::is_active);

        Ok(orders)
    }

    /// Move `order_id` to the status carried by `request`.
    ///
    /// The request is validated locally first: a status the server does not accept
    /// (anything outside [`OrderStatus`](super::types::OrderStatus)'s known values)
    /// is rejected with a [`Kind::Validation`](crate::error::Kind::Validation) error
    /// without touching the network.
    pub async fn update_order_status(
        &self,
        order_id: Uuid,
        request: &UpdateOrderStatusRequest,
    ) -> Result<UpdateOrderStatusResponse> {
        request.validate()?;

        #[cfg(feature = "tracing")]
        tracing::debug!(%order_id, status = %request.status, "updating order status");

        let request = self
            .request(Method::PATCH, &format!("orders/{order_id}/status"))?
            .json(request)
            .build()?;

        crate::request(&self.client, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_gains_trailing_slash() -> anyhow::Result<()> {
        let client = Client::new("http://localhost:3000/api", Config::default())?;

        assert_eq!(client.host().as_str(), "http://localhost:3000/api/");
        assert_eq!(
            client.events_endpoint()?.as_str(),
            "http://localhost:3000/api/events"
        );
        Ok(())
    }

    #[test]
    fn invalid_host_should_fail() {
        let err = Client::new("not a url", Config::default()).unwrap_err();
        assert_eq!(err.kind(), crate::error::Kind::Internal);
    }

    #[test]
    fn default_timeout_is_ten_seconds() {
        let config = Config::default();

        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(config.bearer_token.is_none(), "no token by default");
    }
}
