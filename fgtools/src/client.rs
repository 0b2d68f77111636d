use std::env;

use anyhow::{anyhow, bail, Context, Result};
use fetchgo_engine::db_types::{Order, OrderId};
use fetchgo_server::data_objects::RoleUpdateRequest;
use log::debug;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::{OrderSearchParams, QuoteParams, RoleParams};

/// A thin authenticated client over the server's admin-facing endpoints.
pub struct FetchGoClient {
    base_url: String,
    access_token: String,
    client: Client,
}

impl FetchGoClient {
    /// Reads `FG_SERVER_URL` (default `http://127.0.0.1:8360`) and `FG_ACCESS_TOKEN`.
    pub fn from_env() -> Result<Self> {
        let base_url = env::var("FG_SERVER_URL").unwrap_or_else(|_| "http://127.0.0.1:8360".to_string());
        let access_token = env::var("FG_ACCESS_TOKEN")
            .map_err(|_| anyhow!("FG_ACCESS_TOKEN is not set. Generate one with `fgtools token`."))?;
        let client = Client::builder().build().context("Could not build the HTTP client")?;
        Ok(Self { base_url, access_token, client })
    }

    pub async fn search_orders(&self, params: &OrderSearchParams) -> Result<Vec<Order>> {
        let mut query = vec![];
        if let Some(id) = params.customer_id {
            query.push(("customer_id", id.to_string()));
        }
        if let Some(id) = params.rider_id {
            query.push(("rider_id", id.to_string()));
        }
        if let Some(status) = params.status {
            query.push(("status", status.to_string()));
        }
        let req = self.request(Method::GET, "/api/search/orders").query(&query);
        self.send(req).await
    }

    pub async fn cancel_order(&self, order_id: &OrderId) -> Result<Order> {
        let req = self.request(Method::POST, &format!("/api/orders/{}/cancel", order_id.as_str()));
        self.send(req).await
    }

    pub async fn update_roles(&self, params: &RoleParams) -> Result<()> {
        let body = vec![RoleUpdateRequest {
            kind: params.kind,
            account_id: params.account_id,
            apply: params.apply.clone(),
            revoke: params.revoke.clone(),
        }];
        let req = self.request(Method::POST, "/api/roles").json(&body);
        let response = req.send().await.context("Could not reach the server")?;
        if !response.status().is_success() {
            bail!("Server returned {}: {}", response.status(), response.text().await.unwrap_or_default());
        }
        Ok(())
    }

    pub async fn quote(&self, params: &QuoteParams) -> Result<Value> {
        let body = json!({
            "pickup": { "lat": params.from_lat, "lng": params.from_lng },
            "destination": { "lat": params.to_lat, "lng": params.to_lng },
        });
        let req = self.request(Method::POST, "/api/quote").json(&body);
        self.send(req).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        debug!("{method} {url}");
        self.client.request(method, url).bearer_auth(&self.access_token)
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        let response = req.send().await.context("Could not reach the server")?;
        let status = response.status();
        if !status.is_success() {
            bail!("Server returned {status}: {}", response.text().await.unwrap_or_default());
        }
        response.json::<T>().await.context("Could not parse the server response")
    }
}
