use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of a hedge-mode account an order applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionSide {
    Long,
    Short,
}

impl PositionSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Long => "LONG",
            Self::Short => "SHORT",
        }
    }
}

impl fmt::Display for PositionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketOrder {
    pub symbol: String,
    pub side: OrderSide,
    pub position_side: PositionSide,
    /// Already a whole number of lot steps, see [`round_to_lot`].
    pub quantity: Decimal,
    /// Sent as `newClientOrderId` so log lines can be matched with the exchange.
    pub client_order_id: String,
}

/// Decimal places kept from the `f64` before flooring. Enough to drop binary
/// noise such as `9.0 * 0.001 == 0.009000000000000001`.
const FLOAT_NOISE_DP: u32 = 9;

/// Rounds a size down to a whole number of `step`s. `None` when nothing
/// tradable is left or the input is not a finite number.
pub fn round_to_lot(quantity: f64, step: Decimal) -> Option<Decimal> {
    let quantity = Decimal::from_f64_retain(quantity)?.round_dp(FLOAT_NOISE_DP);
    let rounded = quantity.checked_div(step)?.floor().checked_mul(step)?.normalize();
    (rounded > Decimal::ZERO).then_some(rounded)
}

/// Acknowledgement returned by the exchange for an accepted order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderAck {
    pub order_id: String,
    pub client_order_id: String,
    pub status: String,
}

/// Outcome of one execution attempt. Only ever logged.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderResult {
    Placed { order_id: String },
    Failed { reason: String },
}

impl OrderResult {
    pub fn is_placed(&self) -> bool {
        matches!(self, Self::Placed { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssetBalance {
    pub asset: String,
    pub balance: f64,
    pub available: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenPosition {
    pub symbol: String,
    pub position_side: String,
    pub amount: f64,
    pub entry_price: f64,
    pub unrealized_pnl: f64,
    pub leverage: u32,
}
