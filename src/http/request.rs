//! Outbound HTTP request.

use crate::base::neterror::NetError;
use crate::http::response::HttpResponse;
use bytes::Bytes;
use cookie::Cookie;
use http::header::{HeaderName, HeaderValue, COOKIE};
use http::{HeaderMap, Method};
use std::sync::Arc;
use url::Url;

/// Request payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestBody {
    /// No body (GET, HEAD, and requests rewritten to GET on redirect).
    #[default]
    Empty,
    Bytes(Bytes),
}

impl RequestBody {
    pub fn is_empty(&self) -> bool {
        match self {
            RequestBody::Empty => true,
            RequestBody::Bytes(b) => b.is_empty(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RequestBody::Empty => 0,
            RequestBody::Bytes(b) => b.len(),
        }
    }

    /// The payload bytes; empty for [`RequestBody::Empty`].
    pub fn to_bytes(&self) -> Bytes {
        match self {
            RequestBody::Empty => Bytes::new(),
            RequestBody::Bytes(b) => b.clone(),
        }
    }
}

impl From<()> for RequestBody {
    fn from(_: ()) -> Self {
        RequestBody::Empty
    }
}

impl From<Bytes> for RequestBody {
    fn from(b: Bytes) -> Self {
        RequestBody::Bytes(b)
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(v: Vec<u8>) -> Self {
        RequestBody::Bytes(Bytes::from(v))
    }
}

impl From<String> for RequestBody {
    fn from(s: String) -> Self {
        RequestBody::Bytes(Bytes::from(s))
    }
}

impl From<&str> for RequestBody {
    fn from(s: &str) -> Self {
        RequestBody::Bytes(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<&[u8]> for RequestBody {
    fn from(s: &[u8]) -> Self {
        RequestBody::Bytes(Bytes::copy_from_slice(s))
    }
}

impl<T: Into<RequestBody>> From<Option<T>> for RequestBody {
    fn from(body: Option<T>) -> Self {
        body.map(Into::into).unwrap_or_default()
    }
}

/// An HTTP request as handed to a transport.
///
/// Requests created while following a redirect remember the 3xx response
/// that produced them; see [`HttpRequest::redirect_response`].
#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: RequestBody,
    redirect_response: Option<Arc<HttpResponse>>,
}

impl HttpRequest {
    /// Build a request from a method name and URL string.
    ///
    /// Fails with [`NetError::InvalidMethod`] when `method` is not a valid
    /// HTTP token, [`NetError::InvalidUrl`] when `url` does not parse or has
    /// no host, and [`NetError::DisallowedUrlScheme`] for anything other than
    /// `http` and `https`.
    pub fn new(method: &str, url: &str) -> Result<Self, NetError> {
        let method = Method::from_bytes(method.as_bytes()).map_err(|_| NetError::InvalidMethod)?;
        let url = Url::parse(url).map_err(|_| NetError::InvalidUrl)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(NetError::DisallowedUrlScheme);
        }
        if url.host_str().is_none() {
            return Err(NetError::InvalidUrl);
        }
        Ok(Self::from_parts(method, url))
    }

    pub fn from_parts(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
            redirect_response: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = body.into();
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    /// First value of the named header, if it is present and visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Set a header, replacing any existing values under that name.
    pub fn set_header(&mut self, name: &str, value: &str) -> Result<(), NetError> {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| NetError::InvalidHeader)?;
        let value = HeaderValue::from_str(value).map_err(|_| NetError::InvalidHeader)?;
        self.headers.insert(name, value);
        Ok(())
    }

    /// Append `name=value` of `cookie` to the `Cookie` header.
    ///
    /// Only the name and value are sent; attributes never go on the wire in
    /// a request. Cookies whose value cannot be carried in a header are
    /// skipped.
    pub fn add_cookie(&mut self, cookie: &Cookie<'_>) {
        let pair = format!("{}={}", cookie.name(), cookie.value());
        let combined = match self.header(COOKIE.as_str()) {
            Some(existing) if !existing.is_empty() => format!("{}; {}", existing, pair),
            _ => pair,
        };
        match HeaderValue::from_str(&combined) {
            Ok(value) => {
                self.headers.insert(COOKIE, value);
            }
            Err(_) => {
                tracing::warn!(name = %cookie.name(), "cookie not representable in a header, skipped");
            }
        }
    }

    /// The redirect response that caused this request to be issued, or
    /// `None` for the first request of a chain.
    pub fn redirect_response(&self) -> Option<&HttpResponse> {
        self.redirect_response.as_deref()
    }

    pub(crate) fn set_redirect_response(&mut self, response: Arc<HttpResponse>) {
        self.redirect_response = Some(response);
    }
}
