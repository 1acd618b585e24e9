//! Test doubles for the transport and cache boundaries.

use async_trait::async_trait;
use doclify_http::{HttpError, Transport, TransportRequest, TransportResponse};
use http::StatusCode;
use serde_json::Value;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::cache::{InMemoryResponseCache, ResponseCache};
use crate::codec::RequestCodec;
use crate::config::ClientConfig;
use crate::error::CacheError;

enum Reply {
    Response(TransportResponse),
    Timeout,
}

/// Transport that records every request and answers with a fixed reply.
pub struct MockTransport {
    reply: Reply,
    requests: Mutex<Vec<TransportRequest>>,
}

impl MockTransport {
    pub fn json(body: &Value) -> Self {
        Self::status(StatusCode::OK, &body.to_string())
    }

    pub fn status(status: StatusCode, body: &str) -> Self {
        Self {
            reply: Reply::Response(TransportResponse::new(status, body.to_owned())),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn timeout() -> Self {
        Self {
            reply: Reply::Timeout,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> TransportRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, HttpError> {
        self.requests.lock().unwrap().push(request);
        match &self.reply {
            Reply::Response(response) => Ok(response.clone()),
            Reply::Timeout => Err(HttpError::Timeout(Duration::from_secs(30))),
        }
    }
}

/// In-memory cache that counts backend calls.
#[derive(Default)]
pub struct CountingCache {
    inner: InMemoryResponseCache,
    gets: AtomicUsize,
    sets: AtomicUsize,
    last_ttl: Mutex<Option<Duration>>,
}

impl CountingCache {
    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    pub fn last_ttl(&self) -> Option<Duration> {
        *self.last_ttl.lock().unwrap()
    }
}

#[async_trait]
impl ResponseCache for CountingCache {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &Value, ttl: Duration) -> Result<(), CacheError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        *self.last_ttl.lock().unwrap() = Some(ttl);
        self.inner.set(key, value, ttl).await
    }
}

/// Cache whose backend is always unavailable.
pub struct BrokenCache;

#[async_trait]
impl ResponseCache for BrokenCache {
    async fn get(&self, _key: &str) -> Result<Option<Value>, CacheError> {
        Err(CacheError::backend("cache unavailable"))
    }

    async fn set(&self, _key: &str, _value: &Value, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::backend("cache unavailable"))
    }
}

pub fn test_config() -> ClientConfig {
    ClientConfig::new("acme", "secret")
}

pub fn test_codec() -> RequestCodec {
    RequestCodec::new(&test_config().validate().unwrap())
}
