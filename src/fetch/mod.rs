//! Offline-capable fetch layer.
//!
//! Every remote call goes through a [`FetchInterceptor`], which:
//! - always tries the live network first,
//! - copies successful GET responses into a version-tagged cache generation,
//! - serves the last good response for a request when the network fails,
//! - synthesizes a plain-text 408 when nothing is cached.
//!
//! Generations are named after the configured cache version; activation
//! deletes every generation except the current one, which is the only
//! supported migration path for cached entries.

pub mod http;
mod interceptor;
mod store;
mod types;

pub use interceptor::FetchInterceptor;
pub use store::{CacheStore, MemoryStore, SqliteStore};
pub use types::{FetchRequest, FetchResponse};
