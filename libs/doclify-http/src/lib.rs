#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! HTTP transport for the Doclify SDK
//!
//! This crate owns the only code path that touches the network. It provides:
//! - The [`Transport`] trait, the seam the SDK gateways are written against
//! - [`HttpTransport`], a hyper-based implementation with:
//!   - TLS via rustls against the bundled webpki roots (HTTPS only by default)
//!   - Connection pooling
//!   - A per-request timeout
//!   - Transparent gzip response decompression
//!   - Redirect following
//!   - A response body size limit
//!
//! Non-2xx statuses are **not** errors at this layer: [`Transport::send`] returns
//! `Ok(TransportResponse)` for every status and `Err` only for transport, timeout,
//! TLS and validation failures. Classifying 4xx/5xx is the caller's job.
//!
//! # Example
//!
//! ```ignore
//! use doclify_http::{HttpTransport, Transport, TransportRequest};
//! use std::time::Duration;
//!
//! let transport = HttpTransport::builder()
//!     .timeout(Duration::from_secs(10))
//!     .build()?;
//!
//! let response = transport
//!     .send(TransportRequest::get("https://demo.cdn.doclify.io/api/v2/documents/single"))
//!     .await?;
//! println!("{}", response.status);
//! ```

mod builder;
mod client;
mod config;
mod connector;
mod error;
mod transport;

pub use builder::HttpTransportBuilder;
pub use client::HttpTransport;
pub use config::{DEFAULT_MAX_BODY_SIZE, HttpTransportConfig, TransportSecurity};
pub use error::{HttpError, InvalidUriKind};
pub use transport::{Transport, TransportRequest, TransportResponse};
