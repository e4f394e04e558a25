//! Base types and error handling.
//!
//! Provides foundational types mirroring Chromium's `net/base/`:
//! - [`NetError`](neterror::NetError): error codes shared by the session,
//!   the redirect follower and the transport

pub mod neterror;
