use rust_decimal::Decimal;

pub mod config;
pub mod logger;
pub mod models;

/// Market identifier carried by inbound signals for the only instrument we trade.
pub const SIGNAL_MARKET_ID: &str = "BTC-USDT-SWAP";

/// Binance USDⓈ-M futures symbol orders are sent to.
pub const EXCHANGE_SYMBOL: &str = "BTCUSDT";

/// Smallest order size increment (`LOT_SIZE.stepSize`) for `EXCHANGE_SYMBOL`.
pub const EXCHANGE_LOT_STEP: Decimal = Decimal::from_parts(1, 0, 0, false, 3);
