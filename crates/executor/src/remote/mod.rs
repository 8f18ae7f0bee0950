pub mod redis_source;

pub use redis_source::RedisSignalSource;
