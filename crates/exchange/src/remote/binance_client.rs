use std::time::Duration;

use async_trait::async_trait;
use common::config::BinanceConfig;
use common::models::{AssetBalance, MarketOrder, OpenPosition, OrderAck};
use hmac::{Hmac, Mac};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use sha2::Sha256;
use tracing::{debug, error, info};

use crate::error::ExchangeError;
use crate::remote::{
    FuturesBalance, LeverageResponse, OrderResponse, PositionModeResponse, PositionRisk,
};
use crate::traits::FuturesExchange;

type HmacSha256 = Hmac<Sha256>;

/// Signed REST client for Binance USDⓈ-M futures.
#[derive(Clone)]
pub struct BinanceFuturesClient {
    client: Client,
    base_url: String,
    api_key: String,
    secret_key: String,
    recv_window_ms: u64,
}

impl BinanceFuturesClient {
    pub fn new(config: &BinanceConfig) -> Result<Self, ExchangeError> {
        let client = Client::builder()
            .user_agent("signal_bridge/0.1.0")
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            secret_key: config.secret_key.clone(),
            recv_window_ms: config.recv_window_ms,
        })
    }

    async fn send_signed<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ExchangeError> {
        let timestamp = chrono::Utc::now().timestamp_millis();
        let query = signed_query(&self.secret_key, params, self.recv_window_ms, timestamp);
        let url = format!("{}{}?{}", self.base_url, path, query);

        let resp = self
            .client
            .request(method.clone(), &url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            error!("Binance {} {} failed ({}): {}", method, path, status, body);
            return Err(ExchangeError::from_response(status.as_u16(), &body));
        }

        debug!("Binance {} {} -> {}", method, path, body);
        Ok(serde_json::from_str::<T>(&body)?)
    }
}

#[async_trait]
impl FuturesExchange for BinanceFuturesClient {
    async fn place_market_order(&self, order: MarketOrder) -> Result<OrderAck, ExchangeError> {
        info!(
            "Placing Order: {} {} {} ({}) id={}",
            order.side, order.quantity, order.symbol, order.position_side, order.client_order_id
        );

        let resp: OrderResponse = self
            .send_signed(Method::POST, "/fapi/v1/order", &order_params(&order))
            .await?;

        Ok(resp.into())
    }

    async fn set_leverage(&self, symbol: &str, leverage: u32) -> Result<u32, ExchangeError> {
        let params = [("symbol", symbol.to_string()), ("leverage", leverage.to_string())];
        let resp: LeverageResponse = self
            .send_signed(Method::POST, "/fapi/v1/leverage", &params)
            .await?;
        Ok(resp.leverage)
    }

    async fn fetch_balance(&self) -> Result<Vec<AssetBalance>, ExchangeError> {
        let rows: Vec<FuturesBalance> = self
            .send_signed(Method::GET, "/fapi/v2/balance", &[])
            .await?;
        Ok(rows.into_iter().map(AssetBalance::from).collect())
    }

    async fn fetch_open_positions(&self, symbol: &str) -> Result<Vec<OpenPosition>, ExchangeError> {
        let rows: Vec<PositionRisk> = self
            .send_signed(Method::GET, "/fapi/v2/positionRisk", &[("symbol", symbol.to_string())])
            .await?;
        Ok(rows
            .into_iter()
            .filter(|p| p.amount() != 0.0)
            .map(OpenPosition::from)
            .collect())
    }

    async fn is_hedge_mode(&self) -> Result<bool, ExchangeError> {
        let resp: PositionModeResponse = self
            .send_signed(Method::GET, "/fapi/v1/positionSide/dual", &[])
            .await?;
        Ok(resp.dual_side_position)
    }
}

fn order_params(order: &MarketOrder) -> Vec<(&'static str, String)> {
    vec![
        ("symbol", order.symbol.to_uppercase()),
        ("side", order.side.as_str().to_string()),
        ("positionSide", order.position_side.as_str().to_string()),
        ("type", "MARKET".to_string()),
        ("quantity", order.quantity.normalize().to_string()),
        ("newClientOrderId", order.client_order_id.clone()),
    ]
}

fn sign(secret_key: &str, payload: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret_key.as_bytes()).expect("HMAC can take key of any size");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Parameters in the given order, then `recvWindow` and `timestamp`, then the
/// signature over everything before it.
fn signed_query(
    secret_key: &str,
    params: &[(&str, String)],
    recv_window_ms: u64,
    timestamp_ms: i64,
) -> String {
    let mut query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>();
    query.push(format!("recvWindow={}", recv_window_ms));
    query.push(format!("timestamp={}", timestamp_ms));

    let query = query.join("&");
    let signature = sign(secret_key, &query);
    format!("{}&signature={}", query, signature)
}
