use std::sync::Arc;
use std::time::Duration;

use common::EXCHANGE_LOT_STEP;
use common::models::{MarketOrder, OrderResult, round_to_lot};
use exchange::FuturesExchange;
use signal::TradeSignal;
use tokio::time;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Sends validated signals to the exchange as market orders.
pub struct TradeExecutor {
    exchange: Arc<dyn FuturesExchange>,
    symbol: String,
    order_timeout: Duration,
}

impl TradeExecutor {
    pub fn new(
        exchange: Arc<dyn FuturesExchange>,
        symbol: impl Into<String>,
        order_timeout: Duration,
    ) -> Self {
        Self {
            exchange,
            symbol: symbol.into(),
            order_timeout,
        }
    }

    /// Startup checks. Nothing here stops the service: trading can go ahead
    /// at the account's current leverage.
    pub async fn prepare(&self, leverage: u32) {
        info!("Starting Execution Service (Binance Futures Connected)");

        match self.exchange.set_leverage(&self.symbol, leverage).await {
            Ok(applied) => info!("Leverage for {} set to {}x", self.symbol, applied),
            Err(e) => error!("Failed to set leverage {}x for {}: {}", leverage, self.symbol, e),
        }

        match self.exchange.is_hedge_mode().await {
            Ok(true) => info!("Account is in hedge mode"),
            Ok(false) => warn!(
                "Account is in one-way mode; orders tagged with a position side will be rejected"
            ),
            Err(e) => error!("Failed to read position mode: {}", e),
        }

        match self.exchange.fetch_balance().await {
            Ok(balances) => {
                for b in balances.iter().filter(|b| b.balance > 0.0) {
                    info!("Balance: {} Total={} Available={}", b.asset, b.balance, b.available);
                }
            }
            Err(e) => error!("Failed to fetch balance: {}", e),
        }

        match self.exchange.fetch_open_positions(&self.symbol).await {
            Ok(positions) if positions.is_empty() => info!("No open {} positions", self.symbol),
            Ok(positions) => {
                for p in positions {
                    info!(
                        "Position: {} {} Amount={} Entry={} uPnL={} ({}x)",
                        p.symbol, p.position_side, p.amount, p.entry_price, p.unrealized_pnl, p.leverage
                    );
                }
            }
            Err(e) => error!("Failed to fetch positions: {}", e),
        }
    }

    /// Places exactly one market order for the signal. Failures come back as
    /// [`OrderResult::Failed`] and are never retried. A size that rounds down
    /// to zero lots fails without reaching the exchange.
    pub async fn execute(&self, signal: &TradeSignal) -> OrderResult {
        let action = signal.action();
        let Some(quantity) = round_to_lot(signal.quantity(), EXCHANGE_LOT_STEP) else {
            let reason = format!(
                "quantity {} is below the {} lot step of {}",
                signal.quantity(),
                self.symbol,
                EXCHANGE_LOT_STEP
            );
            error!("ORDER FAILED ({}): {}", action, reason);
            return OrderResult::Failed { reason };
        };
        let order = MarketOrder {
            symbol: self.symbol.clone(),
            side: action.order_side(),
            position_side: action.position_side(),
            quantity,
            client_order_id: Uuid::new_v4().simple().to_string(),
        };

        info!(
            "EXECUTING {}: {} {} {} ({})",
            action, order.side, order.quantity, order.symbol, order.position_side
        );

        match time::timeout(self.order_timeout, self.exchange.place_market_order(order)).await {
            Ok(Ok(ack)) => {
                info!("ORDER PLACED: ID={}, Status={}", ack.order_id, ack.status);
                OrderResult::Placed {
                    order_id: ack.order_id,
                }
            }
            Ok(Err(e)) => {
                error!("ORDER FAILED ({}): {}", action, e);
                OrderResult::Failed {
                    reason: e.to_string(),
                }
            }
            Err(_) => {
                let reason = format!("order timed out after {:?}", self.order_timeout);
                error!("ORDER FAILED ({}): {}", action, reason);
                OrderResult::Failed { reason }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use common::models::{AssetBalance, OpenPosition, OrderAck, OrderSide, PositionSide, QuantityMapping};
    use exchange::ExchangeError;
    use mockall::mock;
    use rust_decimal_macros::dec;
    use signal::{QuantityMapper, SignalParser};
    use std::collections::HashMap;

    mock! {
        pub Exchange {}

        #[async_trait]
        impl FuturesExchange for Exchange {
            async fn place_market_order(&self, order: MarketOrder) -> Result<OrderAck, ExchangeError>;
            async fn set_leverage(&self, symbol: &str, leverage: u32) -> Result<u32, ExchangeError>;
            async fn fetch_balance(&self) -> Result<Vec<AssetBalance>, ExchangeError>;
            async fn fetch_open_positions(&self, symbol: &str) -> Result<Vec<OpenPosition>, ExchangeError>;
            async fn is_hedge_mode(&self) -> Result<bool, ExchangeError>;
        }
    }

    pub(crate) fn parse(message: &str) -> TradeSignal {
        SignalParser::new(QuantityMapper::new(QuantityMapping::new(HashMap::from([
            (1, 0.001),
            (2, 0.002),
        ]))))
        .parse(message)
        .unwrap()
    }

    fn ack(id: &str) -> OrderAck {
        OrderAck {
            order_id: id.to_string(),
            client_order_id: "cid".to_string(),
            status: "NEW".to_string(),
        }
    }

    fn executor(mock: MockExchange) -> TradeExecutor {
        TradeExecutor::new(Arc::new(mock), "BTCUSDT", Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_open_long_buys_long() {
        let mut mock = MockExchange::new();
        mock.expect_place_market_order()
            .withf(|order| {
                order.symbol == "BTCUSDT"
                    && order.side == OrderSide::Buy
                    && order.position_side == PositionSide::Long
                    && order.quantity == dec!(0.001)
                    && order.client_order_id.len() == 32
            })
            .times(1)
            .returning(|_| Ok(ack("8886774")));

        let result = executor(mock)
            .execute(&parse("[开多] 数量:1 市场:BTC-USDT-SWAP"))
            .await;

        assert_eq!(
            result,
            OrderResult::Placed {
                order_id: "8886774".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_dispatch_table() {
        let cases = [
            ("开空", OrderSide::Sell, PositionSide::Short),
            ("平多", OrderSide::Sell, PositionSide::Long),
            ("平空", OrderSide::Buy, PositionSide::Short),
        ];

        for (token, side, position_side) in cases {
            let mut mock = MockExchange::new();
            mock.expect_place_market_order()
                .withf(move |order| order.side == side && order.position_side == position_side)
                .times(1)
                .returning(|_| Ok(ack("1")));

            let signal = parse(&format!("[{}] 数量:2 市场:BTC-USDT-SWAP", token));
            assert!(executor(mock).execute(&signal).await.is_placed(), "{}", token);
        }
    }

    #[tokio::test]
    async fn test_order_size_is_whole_lots() {
        let cases = [("9", dec!(0.009)), ("13", dec!(0.013)), ("2.5", dec!(0.002))];

        for (level, expected) in cases {
            let mut mock = MockExchange::new();
            mock.expect_place_market_order()
                .withf(move |order| order.quantity == expected)
                .times(1)
                .returning(|_| Ok(ack("1")));

            let signal = parse(&format!("[开多] 数量:{} 市场:BTC-USDT-SWAP", level));
            assert!(executor(mock).execute(&signal).await.is_placed(), "level {}", level);
        }
    }

    #[tokio::test]
    async fn test_size_below_lot_step_is_not_sent() {
        let mut mock = MockExchange::new();
        mock.expect_place_market_order().never();

        let result = executor(mock)
            .execute(&parse("[开空] 数量:0.5 市场:BTC-USDT-SWAP"))
            .await;

        assert!(matches!(result, OrderResult::Failed { ref reason } if reason.contains("lot step")));
    }

    #[tokio::test]
    async fn test_exchange_error_is_captured() {
        let mut mock = MockExchange::new();
        mock.expect_place_market_order()
            .times(1)
            .returning(|_| Err(ExchangeError::InsufficientMargin("Margin is insufficient.".to_string())));

        let result = executor(mock)
            .execute(&parse("[平空] 数量:1 市场:BTC-USDT-SWAP"))
            .await;

        assert_eq!(
            result,
            OrderResult::Failed {
                reason: "Insufficient margin: Margin is insufficient.".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_each_order_gets_its_own_client_id() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let seen_in_mock = seen.clone();

        let mut mock = MockExchange::new();
        mock.expect_place_market_order().times(2).returning(move |order| {
            seen_in_mock.lock().unwrap().push(order.client_order_id);
            Ok(ack("1"))
        });

        let executor = executor(mock);
        let signal = parse("[开多] 数量:1 市场:BTC-USDT-SWAP");
        executor.execute(&signal).await;
        executor.execute(&signal).await;

        let seen = seen.lock().unwrap();
        assert_ne!(seen[0], seen[1]);
    }

    struct HangingExchange;

    #[async_trait]
    impl FuturesExchange for HangingExchange {
        async fn place_market_order(&self, _order: MarketOrder) -> Result<OrderAck, ExchangeError> {
            std::future::pending().await
        }
        async fn set_leverage(&self, _symbol: &str, leverage: u32) -> Result<u32, ExchangeError> {
            Ok(leverage)
        }
        async fn fetch_balance(&self) -> Result<Vec<AssetBalance>, ExchangeError> {
            Ok(Vec::new())
        }
        async fn fetch_open_positions(&self, _symbol: &str) -> Result<Vec<OpenPosition>, ExchangeError> {
            Ok(Vec::new())
        }
        async fn is_hedge_mode(&self) -> Result<bool, ExchangeError> {
            Ok(true)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_order_times_out() {
        let executor = TradeExecutor::new(Arc::new(HangingExchange), "BTCUSDT", Duration::from_secs(10));
        let started = time::Instant::now();

        let result = executor
            .execute(&parse("[开空] 数量:1 市场:BTC-USDT-SWAP"))
            .await;

        assert!(matches!(result, OrderResult::Failed { ref reason } if reason.contains("timed out")));
        assert!(started.elapsed() >= Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_prepare_survives_failures() {
        let mut mock = MockExchange::new();
        mock.expect_set_leverage()
            .times(1)
            .returning(|_, _| Err(ExchangeError::Api { code: -4028, message: "Leverage 150 is not valid".to_string() }));
        mock.expect_is_hedge_mode().times(1).returning(|| Ok(false));
        mock.expect_fetch_balance().times(1).returning(|| {
            Ok(vec![AssetBalance {
                asset: "USDT".to_string(),
                balance: 120.0,
                available: 100.0,
            }])
        });
        mock.expect_fetch_open_positions()
            .times(1)
            .returning(|_| Err(ExchangeError::Api { code: -1000, message: "unknown".to_string() }));
        mock.expect_place_market_order().never();

        executor(mock).prepare(150).await;
    }
}
