use async_trait::async_trait;
use common::models::{AssetBalance, MarketOrder, OpenPosition, OrderAck};

use crate::error::ExchangeError;

/// Order placement and account queries against a futures venue.
#[async_trait]
pub trait FuturesExchange: Send + Sync {
    async fn place_market_order(&self, order: MarketOrder) -> Result<OrderAck, ExchangeError>;

    /// Returns the leverage the exchange actually applied.
    async fn set_leverage(&self, symbol: &str, leverage: u32) -> Result<u32, ExchangeError>;

    async fn fetch_balance(&self) -> Result<Vec<AssetBalance>, ExchangeError>;

    /// Only positions with a non-zero amount.
    async fn fetch_open_positions(&self, symbol: &str) -> Result<Vec<OpenPosition>, ExchangeError>;

    /// Whether the account holds long and short positions independently.
    async fn is_hedge_mode(&self) -> Result<bool, ExchangeError>;
}
