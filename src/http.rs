//! HTTP client helper with native-tls support.
//!
//! The agent is built with `http_status_as_error(false)` so callers can map
//! 401 and other failure statuses to their own error variants.

use std::time::Duration;

use ureq::Agent;
use ureq::tls::{RootCerts, TlsConfig, TlsProvider};

/// Create an HTTP agent using the system TLS library and root certificates,
/// with `timeout` applied to each whole request.
pub fn agent(timeout: Duration) -> Agent {
    let tls_config = TlsConfig::builder()
        .provider(TlsProvider::NativeTls)
        .root_certs(RootCerts::PlatformVerifier)
        .build();

    Agent::config_builder()
        .tls_config(tls_config)
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}
