pub mod error;
pub mod models;
pub mod parser;
pub mod quantity;
pub mod validator;

pub use error::{ParseError, ValidationError};
pub use models::{SignalAction, TradeSignal};
pub use parser::SignalParser;
pub use quantity::QuantityMapper;
pub use validator::{MAX_ORDER_QUANTITY, is_valid, validate};
