//! Stateful HTTP session.
//!
//! A [`Session`] keeps a cookie jar and two Basic credential slots (origin
//! and proxy) across requests. Every request it builds carries all stored
//! cookies and whichever credentials are set; every response it receives,
//! including the intermediate hops of a redirect chain, feeds its
//! `Set-Cookie` headers back into the jar.
//!
//! # Example
//!
//! ```rust,no_run
//! use netsession::Session;
//!
//! let session = Session::builder()
//!     .basic_auth("user", "passwd")
//!     .build();
//!
//! let resp = session.get("https://httpbin.org/basic-auth/user/passwd")?;
//! assert!(resp.status().is_success());
//!
//! session.get("https://httpbin.org/cookies/set?name=value")?;
//! for cookie in session.cookies() {
//!     println!("{}={}", cookie.name(), cookie.value());
//! }
//! # Ok::<(), netsession::NetError>(())
//! ```

use crate::base::neterror::NetError;
use crate::client::{Client, Transport};
use crate::cookies::jar::CookieJar;
use crate::http::basicauth::BasicCredential;
use crate::http::request::{HttpRequest, RequestBody};
use crate::http::response::HttpResponse;
use crate::urlrequest::redirect::{CheckRedirect, CookieHarvestingPolicy};
use cookie::Cookie;
use http::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE, PROXY_AUTHORIZATION};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// HTTP session with a persistent cookie jar and Basic credentials.
///
/// `Session` is `Send + Sync`; share it behind an `Arc` to use it from
/// several threads.
pub struct Session {
    transport: Arc<dyn Transport>,
    check_redirect: Arc<dyn CheckRedirect>,
    jar: CookieJar,
    basic_auth: RwLock<Option<BasicCredential>>,
    proxy_auth: RwLock<Option<BasicCredential>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Session over a default [`Client`], with no credentials.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> SessionBuilder {
        SessionBuilder::default()
    }

    /// Set the credential sent as `Authorization` on requests built from
    /// now on.
    pub fn set_basic_auth(&self, username: &str, password: &str) {
        let cred = BasicCredential::new(username, password);
        *self.basic_auth.write().unwrap_or_else(PoisonError::into_inner) = Some(cred);
    }

    /// Set the credential sent as `Proxy-Authorization` on requests built
    /// from now on.
    pub fn set_proxy_auth(&self, username: &str, password: &str) {
        let cred = BasicCredential::new(username, password);
        *self.proxy_auth.write().unwrap_or_else(PoisonError::into_inner) = Some(cred);
    }

    /// Build a request carrying every stored cookie and the configured
    /// credentials.
    ///
    /// Fails with [`NetError::InvalidMethod`], [`NetError::InvalidUrl`] or
    /// [`NetError::DisallowedUrlScheme`] when the method or URL is malformed.
    pub fn new_request(
        &self,
        method: &str,
        url: &str,
        body: impl Into<RequestBody>,
    ) -> Result<HttpRequest, NetError> {
        let mut req = HttpRequest::new(method, url)?.with_body(body);

        for cookie in self.jar.all() {
            req.add_cookie(&cookie);
        }
        if let Some(cred) = self.basic_auth.read().unwrap_or_else(PoisonError::into_inner).as_ref() {
            req.headers_mut().insert(AUTHORIZATION, header_value(cred)?);
        }
        if let Some(cred) = self.proxy_auth.read().unwrap_or_else(PoisonError::into_inner).as_ref() {
            req.headers_mut().insert(PROXY_AUTHORIZATION, header_value(cred)?);
        }
        Ok(req)
    }

    /// Send `request` exactly as built, then store the response's cookies.
    ///
    /// No cookies or credentials are added. Redirects are followed under the
    /// session's redirect policy.
    pub fn do_request(&self, request: HttpRequest) -> Result<HttpResponse, NetError> {
        tracing::debug!(method = %request.method(), url = %request.url(), "session request");
        let resp = self.transport.execute(request, self.check_redirect.as_ref())?;
        self.jar.extend(resp.cookies());
        Ok(resp)
    }

    pub fn get(&self, url: &str) -> Result<HttpResponse, NetError> {
        let req = self.new_request("GET", url, ())?;
        self.do_request(req)
    }

    pub fn head(&self, url: &str) -> Result<HttpResponse, NetError> {
        let req = self.new_request("HEAD", url, ())?;
        self.do_request(req)
    }

    pub fn post(
        &self,
        url: &str,
        content_type: &str,
        body: impl Into<RequestBody>,
    ) -> Result<HttpResponse, NetError> {
        let mut req = self.new_request("POST", url, body)?;
        req.set_header(CONTENT_TYPE.as_str(), content_type)?;
        self.do_request(req)
    }

    /// POST `form` URL-encoded. Pairs are sorted by key; values of a
    /// repeated key keep their order.
    pub fn post_form<I, K, V>(&self, url: &str, form: I) -> Result<HttpResponse, NetError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.post(url, FORM_CONTENT_TYPE, encode_form(form))
    }

    /// Snapshot of the stored cookies, in no particular order.
    pub fn cookies(&self) -> Vec<Cookie<'static>> {
        self.jar.all()
    }

    /// The jar itself, shared with the session.
    pub fn cookie_jar(&self) -> &CookieJar {
        &self.jar
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("cookies", &self.jar.len())
            .field(
                "basic_auth",
                &self.basic_auth.read().unwrap_or_else(PoisonError::into_inner).is_some(),
            )
            .field(
                "proxy_auth",
                &self.proxy_auth.read().unwrap_or_else(PoisonError::into_inner).is_some(),
            )
            .finish_non_exhaustive()
    }
}

fn header_value(cred: &BasicCredential) -> Result<HeaderValue, NetError> {
    let mut value =
        HeaderValue::from_str(cred.header_value()).map_err(|_| NetError::InvalidHeader)?;
    value.set_sensitive(true);
    Ok(value)
}

fn encode_form<I, K, V>(form: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut pairs: Vec<(K, V)> = form.into_iter().collect();
    pairs.sort_by(|a, b| a.0.as_ref().cmp(b.0.as_ref()));
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter().map(|(k, v)| (k.as_ref(), v.as_ref())))
        .finish()
}

/// Builder for creating a [`Session`].
#[derive(Default)]
pub struct SessionBuilder {
    transport: Option<Arc<dyn Transport>>,
    check_redirect: Option<Arc<dyn CheckRedirect>>,
    jar: Option<CookieJar>,
    basic_auth: Option<BasicCredential>,
    proxy_auth: Option<BasicCredential>,
}

impl SessionBuilder {
    /// Send requests through `transport` instead of a default [`Client`].
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn basic_auth(mut self, username: &str, password: &str) -> Self {
        self.basic_auth = Some(BasicCredential::new(username, password));
        self
    }

    pub fn proxy_auth(mut self, username: &str, password: &str) -> Self {
        self.proxy_auth = Some(BasicCredential::new(username, password));
        self
    }

    /// Replace the redirect policy.
    ///
    /// The default policy stops after ten redirects and stores the cookies
    /// of every redirect response. A replacement does neither unless it
    /// does so itself; see [`SessionBuilder::cookie_jar`].
    pub fn check_redirect(mut self, policy: impl CheckRedirect + 'static) -> Self {
        self.check_redirect = Some(Arc::new(policy));
        self
    }

    /// Start from an existing jar, for example one shared with a custom
    /// redirect policy.
    pub fn cookie_jar(mut self, jar: CookieJar) -> Self {
        self.jar = Some(jar);
        self
    }

    pub fn build(self) -> Session {
        let jar = self.jar.unwrap_or_default();
        let check_redirect = self
            .check_redirect
            .unwrap_or_else(|| Arc::new(CookieHarvestingPolicy::new(jar.clone())));
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(Client::new()));
        Session {
            transport,
            check_redirect,
            jar,
            basic_auth: RwLock::new(self.basic_auth),
            proxy_auth: RwLock::new(self.proxy_auth),
        }
    }
}
