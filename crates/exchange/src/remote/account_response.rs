use common::models::{AssetBalance, OpenPosition};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct FuturesBalance {
    pub asset: String,
    pub balance: String,
    #[serde(rename = "availableBalance")]
    pub available_balance: String,
}

impl From<FuturesBalance> for AssetBalance {
    fn from(b: FuturesBalance) -> Self {
        Self {
            balance: b.balance.parse().unwrap_or(0.0),
            available: b.available_balance.parse().unwrap_or(0.0),
            asset: b.asset,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PositionRisk {
    pub symbol: String,
    #[serde(rename = "positionAmt")]
    pub position_amt: String,
    #[serde(rename = "entryPrice")]
    pub entry_price: String,
    #[serde(rename = "unRealizedProfit")]
    pub unrealized_profit: String,
    #[serde(default)]
    pub leverage: String,
    #[serde(rename = "positionSide")]
    pub position_side: String,
}

impl PositionRisk {
    pub fn amount(&self) -> f64 {
        self.position_amt.parse().unwrap_or(0.0)
    }
}

impl From<PositionRisk> for OpenPosition {
    fn from(p: PositionRisk) -> Self {
        Self {
            amount: p.amount(),
            entry_price: p.entry_price.parse().unwrap_or(0.0),
            unrealized_pnl: p.unrealized_profit.parse().unwrap_or(0.0),
            leverage: p.leverage.parse().unwrap_or(0),
            symbol: p.symbol,
            position_side: p.position_side,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PositionModeResponse {
    #[serde(rename = "dualSidePosition")]
    pub dual_side_position: bool,
}
