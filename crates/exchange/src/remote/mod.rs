pub mod account_response;
pub mod binance_client;
pub mod order_response;

pub use account_response::{FuturesBalance, PositionModeResponse, PositionRisk};
pub use binance_client::BinanceFuturesClient;
pub use order_response::{LeverageResponse, OrderResponse};
