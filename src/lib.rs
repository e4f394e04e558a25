//! # netsession
//!
//! A blocking HTTP session layer with a persistent cookie jar and Basic
//! credentials, built on a Chromium-style networking stack.
//!
//! ## Features
//!
//! - **Cookie persistence**: every `Set-Cookie` a session sees, including
//!   those on intermediate redirect hops, is replayed on later requests
//! - **Basic auth**: independent origin (`Authorization`) and proxy
//!   (`Proxy-Authorization`) credentials, RFC 7617
//! - **Bounded redirects**: at most 10 hops, with a pluggable policy
//! - **Transport**: HTTP/1.1 over hyper, BoringSSL TLS, HTTP proxies
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use netsession::Session;
//!
//! let session = Session::new();
//! session.set_basic_auth("user", "passwd");
//! let resp = session.get("https://httpbin.org/basic-auth/user/passwd")?;
//! println!("Status: {}", resp.status());
//! # Ok::<(), netsession::NetError>(())
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error definitions
//! - [`cookies`] - Name-keyed cookie jar
//! - [`http`] - Requests, responses, Basic credentials, HTTP/1.1 hops
//! - [`socket`] - Connection setup, proxy and TLS
//! - [`urlrequest`] - Redirect following and redirect policies
//! - [`client`] - Default transport
//! - [`session`] - The session façade
//!
//! The public API blocks the calling thread. Calling it from inside a tokio
//! runtime fails with [`NetError::BlockingInAsyncContext`]; use
//! `tokio::task::spawn_blocking` there.

pub mod base;
pub mod client;
pub mod cookies;
pub mod http;
pub mod session;
pub mod socket;
pub mod urlrequest;

pub use base::neterror::NetError;
pub use client::{Client, ClientBuilder, RoundTrip, Transport};
pub use cookie::Cookie;
pub use cookies::CookieJar;
pub use http::{BasicCredential, HttpRequest, HttpResponse, RequestBody};
pub use session::{Session, SessionBuilder};
pub use socket::proxy::ProxySettings;
pub use socket::tls::TlsConfig;
pub use urlrequest::{CheckRedirect, CookieHarvestingPolicy, DefaultRedirectPolicy, MAX_REDIRECTS};
