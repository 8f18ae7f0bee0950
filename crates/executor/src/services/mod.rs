pub mod execution_service;
pub mod listener_service;
pub mod signal_pipeline;
