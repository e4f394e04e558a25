//! HTTP Response with body access.

use crate::base::neterror::NetError;
use bytes::Bytes;
use cookie::Cookie;
use http::header::{HeaderName, HeaderValue, LOCATION, SET_COOKIE};
use http::{HeaderMap, StatusCode, Version};
use url::Url;

/// HTTP Response with its body already read into memory.
///
/// Non-2xx statuses are ordinary responses; nothing in this crate turns a
/// status code into an error.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    url: Url,
    status: StatusCode,
    version: Version,
    headers: HeaderMap,
    body: Bytes,
}

impl HttpResponse {
    /// Create an empty-bodied response for `url`.
    pub fn new(url: Url, status: StatusCode) -> Self {
        Self {
            url,
            status,
            version: Version::HTTP_11,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Create from the head of a hyper response and its collected body.
    pub fn from_parts(url: Url, parts: http::response::Parts, body: Bytes) -> Self {
        Self {
            url,
            status: parts.status,
            version: parts.version,
            headers: parts.headers,
            body,
        }
    }

    /// Append a header. Invalid names or values are rejected.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, NetError> {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| NetError::InvalidHeader)?;
        let value = HeaderValue::from_str(value).map_err(|_| NetError::InvalidHeader)?;
        self.headers.append(name, value);
        Ok(self)
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// URL of the request that produced this response.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Get the status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Get the HTTP version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Get a reference to the headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The raw `Location` header, if any.
    pub fn location(&self) -> Option<&str> {
        self.headers.get(LOCATION).and_then(|v| v.to_str().ok())
    }

    /// Cookies set by this response, one per parseable `Set-Cookie` header,
    /// in header order.
    pub fn cookies(&self) -> Vec<Cookie<'static>> {
        self.headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|val| {
                let Ok(line) = val.to_str() else {
                    tracing::warn!(url = %self.url, "ignoring non-ASCII Set-Cookie");
                    return None;
                };
                match Cookie::parse(line.to_owned()) {
                    Ok(c) => Some(c),
                    Err(e) => {
                        tracing::warn!(error = %e, url = %self.url, "ignoring malformed Set-Cookie");
                        None
                    }
                }
            })
            .collect()
    }

    /// Borrow the body bytes.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Consume the response, returning the body bytes.
    pub fn bytes(self) -> Bytes {
        self.body
    }

    /// Body as UTF-8 text.
    pub fn text(&self) -> Result<String, NetError> {
        String::from_utf8(self.body.to_vec()).map_err(|_| NetError::InvalidUtf8)
    }

    /// Body as JSON, deserializing to type T.
    #[cfg(feature = "json")]
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, NetError> {
        serde_json::from_slice(&self.body).map_err(|_| NetError::JsonParseError)
    }
}
