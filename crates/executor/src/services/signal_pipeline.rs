use common::models::OrderResult;
use signal::{ParseError, SignalParser, ValidationError};

use crate::services::execution_service::TradeExecutor;

/// What happened to one channel message.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    Ignored(ParseError),
    Rejected(ValidationError),
    Executed(OrderResult),
}

/// parse -> validate -> execute for a single message. Decisions about what to
/// log and whether to keep going belong to the caller.
pub struct SignalPipeline {
    parser: SignalParser,
    executor: TradeExecutor,
}

impl SignalPipeline {
    pub fn new(parser: SignalParser, executor: TradeExecutor) -> Self {
        Self { parser, executor }
    }

    pub async fn handle(&self, raw: &str) -> PipelineOutcome {
        let signal = match self.parser.parse(raw) {
            Ok(signal) => signal,
            Err(e) => return PipelineOutcome::Ignored(e),
        };

        if let Err(e) = signal::validate(&signal) {
            return PipelineOutcome::Rejected(e);
        }

        PipelineOutcome::Executed(self.executor.execute(&signal).await)
    }
}
