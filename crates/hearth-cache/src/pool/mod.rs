//! Redis connection pooling

mod redis_pool;

pub use redis_pool::{CacheError, RedisPool, RedisPoolConfig, RedisResult, SharedRedisPool};
