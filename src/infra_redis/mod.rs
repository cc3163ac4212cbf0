mod kv_store_redis;

pub use kv_store_redis::*;
