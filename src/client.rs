//! Blocking HTTP client with builder pattern.
//!
//! [`Client`] is the default [`Transport`]: it follows redirects itself and
//! asks a [`CheckRedirect`] policy before every hop.
//!
//! # Example
//!
//! ```rust,no_run
//! use netsession::{Client, HttpRequest};
//! use std::time::Duration;
//!
//! let client = Client::builder()
//!     .timeout(Duration::from_secs(10))
//!     .build()?;
//!
//! let resp = client.send(HttpRequest::new("GET", "https://example.com")?)?;
//! println!("{}", resp.status());
//! # Ok::<(), netsession::NetError>(())
//! ```

use crate::base::neterror::NetError;
use crate::http::networklayer::HttpNetworkLayer;
use crate::http::request::HttpRequest;
use crate::http::response::HttpResponse;
use crate::socket::proxy::ProxySettings;
use crate::socket::tls::TlsConfig;
use crate::urlrequest::job::URLRequestHttpJob;
use crate::urlrequest::redirect::{CheckRedirect, DefaultRedirectPolicy};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Sends exactly one request and returns exactly one response.
///
/// Redirect statuses are returned as ordinary responses.
pub trait RoundTrip: Send + Sync {
    fn round_trip(&self, request: &HttpRequest) -> Result<HttpResponse, NetError>;
}

/// Executes a request to completion, following redirects under the given
/// policy.
///
/// Implementations must call `check_redirect` before following each
/// redirect and must return its error unchanged when it refuses.
pub trait Transport: Send + Sync {
    fn execute(
        &self,
        request: HttpRequest,
        check_redirect: &dyn CheckRedirect,
    ) -> Result<HttpResponse, NetError>;
}

/// HTTP client.
///
/// Use [`Client::builder()`] to configure and create a client. Cloning is
/// cheap and clones share the underlying runtime.
#[derive(Clone)]
pub struct Client {
    round_tripper: Arc<dyn RoundTrip>,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}

impl Client {
    /// Create a new client with default settings: direct connections, no
    /// timeout, default TLS.
    pub fn new() -> Self {
        Self {
            round_tripper: Arc::new(HttpNetworkLayer::new(TlsConfig::default(), None, None)),
        }
    }

    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Send a request, following at most ten redirects.
    pub fn send(&self, request: HttpRequest) -> Result<HttpResponse, NetError> {
        self.execute(request, &DefaultRedirectPolicy)
    }
}

impl Transport for Client {
    fn execute(
        &self,
        request: HttpRequest,
        check_redirect: &dyn CheckRedirect,
    ) -> Result<HttpResponse, NetError> {
        URLRequestHttpJob::new(self.round_tripper.as_ref(), check_redirect).start(request)
    }
}

/// Builder for creating a [`Client`].
#[derive(Default)]
pub struct ClientBuilder {
    proxy: Option<ProxySettings>,
    tls_config: Option<TlsConfig>,
    timeout: Option<Duration>,
    round_tripper: Option<Arc<dyn RoundTrip>>,
}

impl ClientBuilder {
    /// Route every request through an HTTP proxy.
    pub fn proxy(mut self, proxy: ProxySettings) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Set TLS options.
    pub fn tls_config(mut self, config: TlsConfig) -> Self {
        self.tls_config = Some(config);
        self
    }

    /// Set a per-hop timeout covering connect, send and body read.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Replace the network layer. Proxy, TLS and timeout settings are
    /// ignored when this is set.
    pub fn round_tripper(mut self, round_tripper: impl RoundTrip + 'static) -> Self {
        self.round_tripper = Some(Arc::new(round_tripper));
        self
    }

    /// Build the client.
    ///
    /// Fails with [`NetError::DisallowedUrlScheme`] if the proxy is not an
    /// `http://` proxy.
    pub fn build(self) -> Result<Client, NetError> {
        let round_tripper = match self.round_tripper {
            Some(rt) => rt,
            None => {
                if let Some(proxy) = &self.proxy {
                    proxy.validate()?;
                }
                Arc::new(HttpNetworkLayer::new(
                    self.tls_config.unwrap_or_default(),
                    self.proxy,
                    self.timeout,
                ))
            }
        };
        Ok(Client { round_tripper })
    }
}
