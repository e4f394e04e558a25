//! Session cookie storage.
//!
//! | Chromium (C++) | netsession (Rust) | Responsibility |
//! |----------------|-------------------|----------------|
//! | `net::CookieMonster` | [`CookieJar`](jar::CookieJar) | Cookie jar |
//! | `net::CanonicalCookie` | [`cookie::Cookie`] | Single cookie record |
//!
//! Unlike `CookieMonster`, the jar here keys cookies by name only: the last
//! `Set-Cookie` seen for a name wins, whichever host sent it, and nothing
//! ever expires. Records keep their domain/path/expiry attributes untouched
//! for callers that want to inspect them.
//!
//! ```rust
//! use netsession::cookies::jar::CookieJar;
//! use netsession::Cookie;
//!
//! let jar = CookieJar::new();
//! jar.put(Cookie::new("name", "1"));
//! jar.put(Cookie::new("name", "2"));
//! assert_eq!(jar.get("name").unwrap().value(), "2");
//! ```

pub mod jar;

pub use jar::CookieJar;
