//! Socket and connection setup mirroring Chromium's `net/socket/`:
//! - [`connectjob`]: DNS → TCP → (proxy tunnel) → TLS connection flow
//! - [`proxy`]: HTTP proxy settings
//! - [`tls`]: TLS configuration with BoringSSL

pub mod client;
pub mod connectjob;
pub mod proxy;
pub mod tls;
