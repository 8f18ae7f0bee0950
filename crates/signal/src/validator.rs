use tracing::warn;

use crate::error::ValidationError;
use crate::models::TradeSignal;

/// Largest order size ever sent, in BTC.
pub const MAX_ORDER_QUANTITY: f64 = 1.0;

/// Checks that a parsed signal is safe to send. The action needs no check:
/// every [`SignalAction`](crate::SignalAction) variant has an order mapping.
pub fn validate(signal: &TradeSignal) -> Result<(), ValidationError> {
    let quantity = signal.quantity();
    // Written so that NaN fails as well.
    if !(quantity > 0.0 && quantity <= MAX_ORDER_QUANTITY) {
        warn!(
            "Rejecting {}: quantity {} outside (0, {}]",
            signal.action(),
            quantity,
            MAX_ORDER_QUANTITY
        );
        return Err(ValidationError::QuantityOutOfBounds {
            quantity,
            max: MAX_ORDER_QUANTITY,
        });
    }
    Ok(())
}

pub fn is_valid(signal: Option<&TradeSignal>) -> bool {
    match signal {
        Some(signal) => validate(signal).is_ok(),
        None => {
            warn!("{}", ValidationError::Missing);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SignalAction;

    fn signal(quantity: f64) -> TradeSignal {
        TradeSignal::new(SignalAction::OpenShort, quantity, 1.0, "test")
    }

    #[test]
    fn test_within_bounds() {
        assert!(validate(&signal(0.001)).is_ok());
        assert!(validate(&signal(MAX_ORDER_QUANTITY)).is_ok());
        assert!(is_valid(Some(&signal(0.5))));
    }

    #[test]
    fn test_out_of_bounds() {
        for quantity in [0.0, -0.001, 1.0001, 25.0, f64::NAN, f64::INFINITY] {
            assert!(!is_valid(Some(&signal(quantity))), "{} should be rejected", quantity);
        }
        assert!(matches!(
            validate(&signal(2.0)),
            Err(ValidationError::QuantityOutOfBounds { max, .. }) if max == MAX_ORDER_QUANTITY
        ));
    }

    #[test]
    fn test_absent_signal() {
        assert!(!is_valid(None));
    }

    #[test]
    fn test_every_action_is_accepted() {
        for action in SignalAction::ALL {
            let signal = TradeSignal::new(action, 0.01, 1.0, "test");
            assert!(validate(&signal).is_ok(), "{}", action);
        }
    }
}
