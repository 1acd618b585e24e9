//! Connector and error mapping for the hyper client.

use std::sync::Arc;
use std::time::Duration;

use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;
use tower::timeout::error::Elapsed;

use crate::config::TransportSecurity;
use crate::error::HttpError;

/// TCP connector wrapped in rustls, verifying against the bundled webpki roots.
///
/// aws-lc-rs is pinned as the crypto provider so the process-wide default
/// (or its absence) never changes how the SDK negotiates TLS.
pub(crate) fn https_connector(
    security: TransportSecurity,
    connect_timeout: Duration,
) -> Result<HttpsConnector<HttpConnector>, HttpError> {
    let mut tcp = HttpConnector::new();
    tcp.enforce_http(false);
    tcp.set_nodelay(true);
    tcp.set_connect_timeout(Some(connect_timeout));

    let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());
    let tls = HttpsConnectorBuilder::new()
        .with_provider_and_webpki_roots(provider)
        .map_err(|e| HttpError::Tls(Box::new(e)))?;

    let schemes = match security {
        TransportSecurity::TlsOnly => tls.https_only(),
        TransportSecurity::AllowInsecureHttp => tls.https_or_http(),
    };

    Ok(schemes.enable_all_versions().wrap_connector(tcp))
}

/// Classifies a failure from the middleware stack.
///
/// The timeout layer boxes everything below it, so the concrete type is
/// recovered by downcasting.
pub(crate) fn map_service_error(err: tower::BoxError, timeout: Duration) -> HttpError {
    if err.is::<Elapsed>() {
        return HttpError::Timeout(timeout);
    }

    match err.downcast::<hyper_util::client::legacy::Error>() {
        Ok(err) if err.is_connect() => HttpError::Connect(err),
        Ok(err) => HttpError::Transport(err),
        Err(other) => HttpError::Transport(other),
    }
}
