//! # redkv
//!
//! Pooled, namespaced key-value facade over Redis.
//!
//! This crate wraps a Redis driver with the few conveniences most
//! applications end up writing by hand: a lazily created shared
//! connection pool, transparent key namespacing, and value
//! (de)serialization on every read and write. Protocol framing,
//! multiplexing, and reconnection stay with the driver stack
//! (`redis` + `deadpool-redis`).
//!
//! ## Example
//!
//! ```rust,no_run
//! use redkv::{KvStore, RedisConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RedisConfig::new("127.0.0.1", 6379).with_db(0);
//!     let store = KvStore::new(config);
//!
//!     store.set("greeting", "hello").await?;
//!     let value: Option<String> = store.get("greeting").await?;
//!     assert_eq!(value.as_deref(), Some("hello"));
//!
//!     // Counters live on the same namespaced keyspace
//!     let hits = store.increment("hits").await?;
//!     println!("hits so far: {hits}");
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod store;

pub use codec::{JsonCodec, ValueCodec};
pub use config::RedisConfig;
pub use error::{KvError, KvResult};
pub use store::{KEY_PREFIX, KvStore};
