use thiserror::Error;

/// Why a raw channel message did not produce a signal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Message is for another instrument")]
    OtherInstrument,
    #[error("Message does not match the signal format")]
    FormatMismatch,
    #[error("Unknown action token: {0}")]
    UnknownAction(String),
    #[error("Cannot parse quantity: {0}")]
    InvalidQuantity(String),
    #[error("Resolved trade quantity is not positive: {0}")]
    NonPositiveQuantity(f64),
}

impl ParseError {
    /// Other-instrument traffic is expected on a shared channel.
    pub fn is_expected(&self) -> bool {
        matches!(self, Self::OtherInstrument)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("No signal to validate")]
    Missing,
    #[error("Quantity {quantity} outside (0, {max}]")]
    QuantityOutOfBounds { quantity: f64, max: f64 },
}
