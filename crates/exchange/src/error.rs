use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Binance API error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("Insufficient margin: {0}")]
    InsufficientMargin(String),

    /// Usually means the account is not in hedge mode.
    #[error("Position side rejected: {0}")]
    PositionSideMismatch(String),

    #[error("Unexpected response (HTTP {status}): {body}")]
    UnexpectedResponse { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ExchangeError {
    /// Binance error bodies look like `{"code": -2019, "msg": "..."}`.
    pub fn from_response(status: u16, body: &str) -> Self {
        #[derive(serde::Deserialize)]
        struct ApiError {
            code: i64,
            msg: String,
        }

        match serde_json::from_str::<ApiError>(body) {
            Ok(err) => Self::classify(err.code, err.msg),
            Err(_) => Self::UnexpectedResponse {
                status,
                body: body.to_string(),
            },
        }
    }

    fn classify(code: i64, message: String) -> Self {
        match code {
            -2019 => Self::InsufficientMargin(message),
            -4061 => Self::PositionSideMismatch(message),
            _ => Self::Api { code, message },
        }
    }
}
