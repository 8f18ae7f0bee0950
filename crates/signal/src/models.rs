use std::fmt;

use common::models::{OrderSide, PositionSide};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalAction {
    OpenLong,
    OpenShort,
    CloseLong,
    CloseShort,
}

impl SignalAction {
    pub const ALL: [SignalAction; 4] = [
        Self::OpenLong,
        Self::OpenShort,
        Self::CloseLong,
        Self::CloseShort,
    ];

    /// Looks up the action token used inside the `[...]` brackets of a message.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "开多" => Some(Self::OpenLong),
            "开空" => Some(Self::OpenShort),
            "平多" => Some(Self::CloseLong),
            "平空" => Some(Self::CloseShort),
            _ => None,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            Self::OpenLong => "开多",
            Self::OpenShort => "开空",
            Self::CloseLong => "平多",
            Self::CloseShort => "平空",
        }
    }

    pub fn order_side(&self) -> OrderSide {
        match self {
            Self::OpenLong | Self::CloseShort => OrderSide::Buy,
            Self::OpenShort | Self::CloseLong => OrderSide::Sell,
        }
    }

    pub fn position_side(&self) -> PositionSide {
        match self {
            Self::OpenLong | Self::CloseLong => PositionSide::Long,
            Self::OpenShort | Self::CloseShort => PositionSide::Short,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenLong => "open_long",
            Self::OpenShort => "open_short",
            Self::CloseLong => "close_long",
            Self::CloseShort => "close_short",
        }
    }
}

impl fmt::Display for SignalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A trade intent extracted from one channel message.
///
/// Only [`SignalParser`](crate::SignalParser) builds these, so every instance
/// went through the grammar and the quantity mapping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeSignal {
    action: SignalAction,
    quantity: f64,
    original_quantity: f64,
    raw_message: String,
}

impl TradeSignal {
    pub(crate) fn new(
        action: SignalAction,
        quantity: f64,
        original_quantity: f64,
        raw_message: impl Into<String>,
    ) -> Self {
        Self {
            action,
            quantity,
            original_quantity,
            raw_message: raw_message.into(),
        }
    }

    pub fn action(&self) -> SignalAction {
        self.action
    }

    /// Size to trade, after the level mapping.
    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    /// The number as it appeared in the message.
    pub fn original_quantity(&self) -> f64 {
        self.original_quantity
    }

    pub fn raw_message(&self) -> &str {
        &self.raw_message
    }
}

impl fmt::Display for TradeSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TradeSignal(action={}, quantity={}, original={})",
            self.action, self.quantity, self.original_quantity
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_round_trip() {
        for action in SignalAction::ALL {
            assert_eq!(SignalAction::from_token(action.token()), Some(action));
        }
        assert_eq!(SignalAction::from_token("加仓"), None);
        assert_eq!(SignalAction::from_token(" 开多"), None);
    }

    #[test]
    fn test_dispatch_table() {
        let table = [
            (SignalAction::OpenLong, OrderSide::Buy, PositionSide::Long),
            (SignalAction::OpenShort, OrderSide::Sell, PositionSide::Short),
            (SignalAction::CloseLong, OrderSide::Sell, PositionSide::Long),
            (SignalAction::CloseShort, OrderSide::Buy, PositionSide::Short),
        ];

        for (action, side, position_side) in table {
            assert_eq!(action.order_side(), side, "{}", action);
            assert_eq!(action.position_side(), position_side, "{}", action);
        }
    }
}
