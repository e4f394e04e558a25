//! Redirect policies.
//!
//! A transport consults a [`CheckRedirect`] before following each redirect,
//! passing the request it is about to send and every request already sent
//! in the chain, oldest first. Each of those requests except the first
//! carries the 3xx response that produced it.

use crate::base::neterror::NetError;
use crate::cookies::jar::CookieJar;
use crate::http::request::HttpRequest;
use std::iter;

/// Maximum number of redirects followed before the chain is abandoned.
pub const MAX_REDIRECTS: usize = 10;

/// Decides whether a redirect may be followed.
///
/// Returning an error aborts the whole request; the transport returns that
/// error to its caller and discards the redirect response.
pub trait CheckRedirect: Send + Sync {
    fn check_redirect(&self, pending: &HttpRequest, via: &[HttpRequest]) -> Result<(), NetError>;
}

impl<F> CheckRedirect for F
where
    F: Fn(&HttpRequest, &[HttpRequest]) -> Result<(), NetError> + Send + Sync,
{
    fn check_redirect(&self, pending: &HttpRequest, via: &[HttpRequest]) -> Result<(), NetError> {
        self(pending, via)
    }
}

/// Fail once `via` holds [`MAX_REDIRECTS`] or more requests.
pub fn limit_redirects(via: &[HttpRequest]) -> Result<(), NetError> {
    if via.len() >= MAX_REDIRECTS {
        return Err(NetError::TooManyRedirects);
    }
    Ok(())
}

/// Follows up to [`MAX_REDIRECTS`] redirects and nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRedirectPolicy;

impl CheckRedirect for DefaultRedirectPolicy {
    fn check_redirect(&self, _pending: &HttpRequest, via: &[HttpRequest]) -> Result<(), NetError> {
        limit_redirects(via)
    }
}

/// Session redirect policy: bounded like [`DefaultRedirectPolicy`], and
/// stores the cookies of every redirect response in the chain.
///
/// Transports only surface the final response of a chain to their caller,
/// so intermediate `Set-Cookie` headers are lost unless they are captured
/// here.
#[derive(Debug, Clone)]
pub struct CookieHarvestingPolicy {
    jar: CookieJar,
}

impl CookieHarvestingPolicy {
    pub fn new(jar: CookieJar) -> Self {
        Self { jar }
    }

    pub fn jar(&self) -> &CookieJar {
        &self.jar
    }
}

impl CheckRedirect for CookieHarvestingPolicy {
    fn check_redirect(&self, pending: &HttpRequest, via: &[HttpRequest]) -> Result<(), NetError> {
        limit_redirects(via)?;

        for response in via
            .iter()
            .chain(iter::once(pending))
            .filter_map(HttpRequest::redirect_response)
        {
            let cookies = response.cookies();
            if !cookies.is_empty() {
                tracing::debug!(
                    url = %response.url(),
                    count = cookies.len(),
                    "harvested cookies from redirect"
                );
            }
            self.jar.extend(cookies);
        }
        Ok(())
    }
}
