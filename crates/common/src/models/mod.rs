pub mod order;
pub mod quantity;

pub use order::{
    AssetBalance, MarketOrder, OpenPosition, OrderAck, OrderResult, OrderSide, PositionSide,
    round_to_lot,
};
pub use quantity::QuantityMapping;
