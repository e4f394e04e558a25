use crate::base::neterror::NetError;
use crate::http::request::HttpRequest;
use crate::socket::connectjob::Connection;
use bytes::Bytes;
use http::header::{HeaderValue, HOST, PROXY_AUTHORIZATION};
use http::{Request, Response, Uri, Version};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::client::conn::http1;
use hyper_util::rt::TokioIo;
use url::Url;

/// One HTTP/1.1 exchange over a freshly connected socket.
pub struct HttpStream {
    sender: http1::SendRequest<Full<Bytes>>,
    absolute_form: bool,
}

impl HttpStream {
    /// Perform the HTTP/1.1 handshake on a fresh connection and spawn its
    /// driver onto the current runtime.
    pub async fn handshake(conn: Connection) -> Result<Self, NetError> {
        let io = TokioIo::new(conn.socket);
        let (sender, driver) = http1::handshake(io)
            .await
            .map_err(|_| NetError::ConnectionFailed)?;

        tokio::spawn(async move {
            if let Err(e) = driver.await {
                tracing::debug!(error = %e, "connection closed with error");
            }
        });

        Ok(Self {
            sender,
            absolute_form: conn.absolute_form,
        })
    }

    pub async fn send_request(
        &mut self,
        request: &HttpRequest,
        proxy_auth: Option<HeaderValue>,
    ) -> Result<Response<Incoming>, NetError> {
        let req = build_request(request, self.absolute_form, proxy_auth)?;
        self.sender.send_request(req).await.map_err(|e| {
            tracing::debug!(error = %e, url = %request.url(), "request failed");
            if e.is_incomplete_message() {
                NetError::EmptyResponse
            } else if e.is_parse() {
                NetError::InvalidHttpResponse
            } else {
                NetError::ConnectionClosed
            }
        })
    }
}

/// Convert to a hyper request: origin-form target (or absolute-form for a
/// forward proxy) with a `Host` header.
///
/// `Proxy-Authorization` is replaced by `proxy_auth`, or removed when it is
/// `None`.
pub(crate) fn build_request(
    request: &HttpRequest,
    absolute_form: bool,
    proxy_auth: Option<HeaderValue>,
) -> Result<Request<Full<Bytes>>, NetError> {
    let url = request.url();
    let target = if absolute_form {
        let mut without_fragment = url.clone();
        without_fragment.set_fragment(None);
        without_fragment.to_string()
    } else {
        origin_form(url)
    };
    let uri: Uri = target.parse().map_err(|_| NetError::InvalidUrl)?;

    let mut headers = request.headers().clone();
    headers.remove(PROXY_AUTHORIZATION);
    if let Some(value) = proxy_auth {
        headers.insert(PROXY_AUTHORIZATION, value);
    }
    if !headers.contains_key(HOST) {
        let host = HeaderValue::from_str(&host_header(url)).map_err(|_| NetError::InvalidUrl)?;
        headers.insert(HOST, host);
    }

    let mut req = Request::builder()
        .method(request.method().clone())
        .uri(uri)
        .version(Version::HTTP_11)
        .body(Full::new(request.body().to_bytes()))
        .map_err(|_| NetError::InvalidHeader)?;
    *req.headers_mut() = headers;
    Ok(req)
}

fn origin_form(url: &Url) -> String {
    match url.query() {
        Some(q) => format!("{}?{}", url.path(), q),
        None => url.path().to_string(),
    }
}

/// `host[:port]`, the port omitted when it is the scheme default.
fn host_header(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}
