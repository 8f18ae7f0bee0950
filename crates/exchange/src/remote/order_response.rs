use common::models::OrderAck;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct OrderResponse {
    #[serde(rename = "orderId")]
    pub order_id: u64,
    #[serde(rename = "clientOrderId")]
    pub client_order_id: String,
    pub symbol: String,
    pub status: String,
    pub side: String,
    #[serde(rename = "positionSide")]
    pub position_side: String,
    #[serde(rename = "origQty")]
    pub orig_qty: String,
    #[serde(rename = "executedQty", default)]
    pub executed_qty: String,
    #[serde(rename = "avgPrice", default)]
    pub avg_price: String,
}

impl From<OrderResponse> for OrderAck {
    fn from(resp: OrderResponse) -> Self {
        Self {
            order_id: resp.order_id.to_string(),
            client_order_id: resp.client_order_id,
            status: resp.status,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LeverageResponse {
    pub leverage: u32,
    pub symbol: String,
}
