//! HTTP Basic Authentication (RFC 7617).
//!
//! Produces and parses the single opaque header value used for both
//! `Authorization` and `Proxy-Authorization`:
//! `Basic base64(username ":" password)`.
//!
//! The header value is computed once when the credential is created and
//! reused for every request carrying it.

use base64::{engine::general_purpose, Engine as _};
use std::fmt;
use zeroize::Zeroizing;

/// Scheme prefix, including the separating space.
const BASIC_PREFIX: &str = "Basic ";

/// Encode a username/password pair as a Basic header value.
pub fn encode(username: &str, password: &str) -> String {
    let creds = Zeroizing::new(format!("{}:{}", username, password));
    let encoded = general_purpose::STANDARD.encode(creds.as_bytes());
    format!("{}{}", BASIC_PREFIX, encoded)
}

/// A username/password pair with its pre-computed Basic header value.
#[derive(Clone)]
pub struct BasicCredential {
    username: String,
    password: Zeroizing<String>,
    header: String,
}

impl BasicCredential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        let username = username.into();
        let password = Zeroizing::new(password.into());
        let header = encode(&username, &password);
        Self {
            username,
            password,
            header,
        }
    }

    /// Parse a Basic header value back into its credential.
    ///
    /// Returns `None` when the value is shorter than the `Basic ` prefix,
    /// carries another scheme, is not standard Base64, does not decode to
    /// UTF-8, or has no `:` separator. The split happens at the first `:`,
    /// so passwords may contain colons but usernames may not.
    pub fn parse(header: &str) -> Option<Self> {
        if header.len() < BASIC_PREFIX.len() {
            return None;
        }
        let scheme = header.get(..BASIC_PREFIX.len())?;
        if !scheme.eq_ignore_ascii_case(BASIC_PREFIX) {
            return None;
        }

        let decoded = Zeroizing::new(
            general_purpose::STANDARD
                .decode(&header[BASIC_PREFIX.len()..])
                .ok()?,
        );
        let decoded = std::str::from_utf8(&decoded).ok()?;
        let (username, password) = decoded.split_once(':')?;

        Some(Self::new(username, password))
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// The `Basic ...` header value.
    pub fn header_value(&self) -> &str {
        &self.header
    }
}

impl PartialEq for BasicCredential {
    fn eq(&self, other: &Self) -> bool {
        self.username == other.username && self.password.as_str() == other.password.as_str()
    }
}

impl Eq for BasicCredential {}

impl fmt::Debug for BasicCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCredential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
