#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! # `doclify-sdk` - client for the Doclify content delivery API
//!
//! - **Query building** ([`Documents`]) - fluent filter / include / select /
//!   order builder compiled into deterministic query parameters
//! - **Request gateway** ([`RequestGateway`]) - URI and header encoding over an
//!   injected [`Transport`](doclify_http::Transport)
//! - **Response caching** ([`CachingGateway`], [`ResponseCache`]) - optional
//!   TTL cache keyed by a digest of endpoint and query
//! - **Structured text** ([`structured_text`]) - rich-text tree to HTML
//!
//! ## Example
//!
//! ```rust,ignore
//! use doclify_sdk::{Client, ClientConfig, InMemoryResponseCache, CacheConfig};
//! use std::sync::Arc;
//!
//! let mut client = Client::new(ClientConfig::new("my-repo", "api-key"))?;
//! client.add_cache(Arc::new(InMemoryResponseCache::default()), CacheConfig::default());
//!
//! let posts = client
//!     .documents()
//!     .collection("posts")
//!     .gte("data.published", "2024-01-01")
//!     .order_by_desc("sys.publishedAt")
//!     .fetch(10)
//!     .await?;
//!
//! let html = doclify_sdk::structured_text::as_html(posts[0].pointer("/data/body"));
//! ```

pub mod cache;
pub mod client;
pub mod codec;
pub mod config;
pub mod documents;
pub mod error;
pub mod gateway;
pub mod query;

#[cfg(test)]
mod test_support;

pub use doclify_structured_text as structured_text;

pub use cache::{InMemoryResponseCache, ResponseCache, request_key};
pub use client::{Client, ClientBuilder};
pub use codec::{RequestCodec, RequestOptions};
pub use config::{
    CacheConfig, ClientConfig, DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_CACHE_TTL, DEFAULT_USER_AGENT,
};
pub use documents::Documents;
pub use error::{CacheError, ConfigError, DoclifyError, RequestError};
pub use gateway::{CachingGateway, RequestGateway};
pub use query::{Operator, OrderKey, Predicate, QueryParams, QuerySpec, SortDirection};
