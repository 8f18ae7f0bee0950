use std::sync::LazyLock;

use common::SIGNAL_MARKET_ID;
use regex::Regex;
use tracing::{debug, info};

use crate::error::ParseError;
use crate::models::{SignalAction, TradeSignal};
use crate::quantity::QuantityMapper;

// [<action>] 数量:<number> 市场:BTC-USDT-SWAP, found anywhere in the message.
static SIGNAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\[([^\]]+)\]\s*数量:([0-9.]+)\s*市场:{}",
        regex::escape(SIGNAL_MARKET_ID)
    ))
    .expect("signal pattern is a valid regex")
});

/// Extracts [`TradeSignal`]s from raw channel text. Holds no state besides the
/// immutable quantity mapping, so parsing the same text twice gives equal
/// signals.
#[derive(Debug, Clone, Default)]
pub struct SignalParser {
    mapper: QuantityMapper,
}

impl SignalParser {
    pub fn new(mapper: QuantityMapper) -> Self {
        Self { mapper }
    }

    pub fn parse(&self, raw: &str) -> Result<TradeSignal, ParseError> {
        let message = raw.trim();

        // Cheap filter before the regex: the channel is shared with other markets.
        if !message.contains(SIGNAL_MARKET_ID) {
            debug!("Ignoring message for another instrument: {}", message);
            return Err(ParseError::OtherInstrument);
        }

        let captures = SIGNAL_PATTERN
            .captures(message)
            .ok_or(ParseError::FormatMismatch)?;

        let action_token = captures[1].trim();
        let quantity_text = captures[2].trim();

        let action = SignalAction::from_token(action_token)
            .ok_or_else(|| ParseError::UnknownAction(action_token.to_string()))?;

        let original_quantity = quantity_text
            .parse::<f64>()
            .ok()
            .filter(|q| q.is_finite() && *q >= 0.0)
            .ok_or_else(|| ParseError::InvalidQuantity(quantity_text.to_string()))?;

        let quantity = self.mapper.resolve(original_quantity);
        if quantity <= 0.0 || !quantity.is_finite() {
            return Err(ParseError::NonPositiveQuantity(quantity));
        }

        let signal = TradeSignal::new(action, quantity, original_quantity, message);
        info!("Parsed {}", signal);
        Ok(signal)
    }
}
