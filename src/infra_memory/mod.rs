mod kv_store_memory;

pub use kv_store_memory::*;
