use crate::base::neterror::NetError;
use crate::client::RoundTrip;
use crate::http::request::HttpRequest;
use crate::http::response::HttpResponse;
use crate::urlrequest::redirect::CheckRedirect;
use http::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, COOKIE, WWW_AUTHENTICATE};
use http::{Method, StatusCode};
use std::sync::Arc;
use url::Url;

/// Drives one request through its redirect chain.
///
/// Every hop goes through the round tripper; before each redirect is
/// followed the redirect policy sees the pending request and all requests
/// sent so far. The job itself imposes no hop limit.
pub struct URLRequestHttpJob<'a> {
    round_tripper: &'a dyn RoundTrip,
    check_redirect: &'a dyn CheckRedirect,
}

impl<'a> URLRequestHttpJob<'a> {
    pub fn new(round_tripper: &'a dyn RoundTrip, check_redirect: &'a dyn CheckRedirect) -> Self {
        Self {
            round_tripper,
            check_redirect,
        }
    }

    pub fn start(&self, request: HttpRequest) -> Result<HttpResponse, NetError> {
        let mut via: Vec<HttpRequest> = Vec::new();
        let mut current = request;

        loop {
            let response = self.round_tripper.round_trip(&current)?;

            let Some(behavior) = RedirectBehavior::for_status(response.status()) else {
                return Ok(response);
            };
            // A 3xx without Location is a final response.
            let Some(location) = response.location() else {
                return Ok(response);
            };
            let next_url = current.url().join(location).map_err(|_| NetError::InvalidRedirect)?;
            if !matches!(next_url.scheme(), "http" | "https") {
                return Err(NetError::UnsafeRedirect);
            }

            tracing::debug!(
                status = response.status().as_u16(),
                from = %current.url(),
                to = %next_url,
                hop = via.len() + 1,
                "following redirect"
            );

            let initial = via.first().unwrap_or(&current);
            let next = behavior.next_request(&current, initial.url(), next_url, Arc::new(response));

            via.push(current);
            self.check_redirect.check_redirect(&next, &via)?;
            current = next;
        }
    }
}

/// How a redirect status rewrites the follow-up request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RedirectBehavior {
    /// 301, 302, 303: switch to GET (HEAD stays HEAD) and drop the body.
    RewriteToGet,
    /// 307, 308: resend the same method and body.
    Preserve,
}

impl RedirectBehavior {
    fn for_status(status: StatusCode) -> Option<Self> {
        match status {
            StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND | StatusCode::SEE_OTHER => {
                Some(Self::RewriteToGet)
            }
            StatusCode::TEMPORARY_REDIRECT | StatusCode::PERMANENT_REDIRECT => Some(Self::Preserve),
            _ => None,
        }
    }

    fn next_request(
        self,
        previous: &HttpRequest,
        initial_url: &Url,
        url: Url,
        cause: Arc<HttpResponse>,
    ) -> HttpRequest {
        let mut headers = previous.headers().clone();

        let (method, body) = match self {
            Self::Preserve => (previous.method().clone(), previous.body().clone()),
            Self::RewriteToGet => {
                headers.remove(CONTENT_TYPE);
                headers.remove(CONTENT_LENGTH);
                let method = if *previous.method() == Method::HEAD {
                    Method::HEAD
                } else {
                    Method::GET
                };
                (method, Default::default())
            }
        };

        if !is_same_or_subdomain(initial_url, &url) {
            for name in [AUTHORIZATION, WWW_AUTHENTICATE, COOKIE] {
                headers.remove(name);
            }
        }

        let mut next = HttpRequest::from_parts(method, url).with_body(body);
        *next.headers_mut() = headers;
        next.set_redirect_response(cause);
        next
    }
}

/// Credentials and cookies follow a redirect only to the same host or one
/// of its subdomains.
fn is_same_or_subdomain(initial: &Url, target: &Url) -> bool {
    let (Some(initial), Some(target)) = (initial.host_str(), target.host_str()) else {
        return false;
    };
    let initial = initial.to_ascii_lowercase();
    let target = target.to_ascii_lowercase();
    target == initial
        || target
            .strip_suffix(initial.as_str())
            .is_some_and(|prefix| prefix.ends_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::urlrequest::redirect::DefaultRedirectPolicy;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Round tripper answering from a path -> (status, headers) script and
    /// recording every request it sees.
    #[derive(Default)]
    struct ScriptedRoundTrip {
        routes: HashMap<String, (StatusCode, Vec<(&'static str, String)>)>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedRoundTrip {
        fn route(mut self, path: &str, status: StatusCode, headers: &[(&'static str, &str)]) -> Self {
            let headers = headers.iter().map(|(k, v)| (*k, v.to_string())).collect();
            self.routes.insert(path.to_string(), (status, headers));
            self
        }

        fn seen(&self) -> Vec<HttpRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl RoundTrip for ScriptedRoundTrip {
        fn round_trip(&self, request: &HttpRequest) -> Result<HttpResponse, NetError> {
            self.seen.lock().unwrap().push(request.clone());
            let (status, headers) = self
                .routes
                .get(request.url().path())
                .cloned()
                .unwrap_or((StatusCode::NOT_FOUND, Vec::new()));
            let mut resp = HttpResponse::new(request.url().clone(), status);
            for (name, value) in headers {
                resp = resp.with_header(name, &value)?;
            }
            Ok(resp)
        }
    }

    /// `/r/0` -> `/r/1` -> ... -> `/r/{hops}` which answers 200.
    fn redirect_chain(hops: usize) -> ScriptedRoundTrip {
        let mut script = ScriptedRoundTrip::default();
        for i in 0..hops {
            let next = format!("/r/{}", i + 1);
            script = script.route(&format!("/r/{}", i), StatusCode::FOUND, &[("Location", next.as_str())]);
        }
        script.route(&format!("/r/{}", hops), StatusCode::OK, &[])
    }

    fn get(url: &str) -> HttpRequest {
        HttpRequest::new("GET", url).unwrap()
    }

    #[test]
    fn test_no_redirect() {
        let rt = ScriptedRoundTrip::default().route("/ok", StatusCode::OK, &[]);
        let job = URLRequestHttpJob::new(&rt, &DefaultRedirectPolicy);

        let resp = job.start(get("http://example.com/ok")).unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(rt.seen().len(), 1);
    }

    #[test]
    fn test_nine_redirects_succeed() {
        let rt = redirect_chain(9);
        let job = URLRequestHttpJob::new(&rt, &DefaultRedirectPolicy);

        let resp = job.start(get("http://example.com/r/0")).unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.url().path(), "/r/9");
        assert_eq!(rt.seen().len(), 10);
    }

    #[test]
    fn test_ten_redirects_fail() {
        let rt = redirect_chain(10);
        let job = URLRequestHttpJob::new(&rt, &DefaultRedirectPolicy);

        let err = job.start(get("http://example.com/r/0")).unwrap_err();
        assert_eq!(err, NetError::TooManyRedirects);
        assert_eq!(err.to_string(), "stopped after 10 redirects");
        // The tenth redirect target is never requested.
        assert_eq!(rt.seen().len(), 10);
    }

    #[test]
    fn test_policy_sees_chain() {
        let rt = redirect_chain(3);
        let calls = Mutex::new(Vec::new());
        let policy = |pending: &HttpRequest, via: &[HttpRequest]| -> Result<(), NetError> {
            assert!(pending.redirect_response().is_some());
            assert!(via[0].redirect_response().is_none());
            calls
                .lock()
                .unwrap()
                .push((pending.url().path().to_string(), via.len()));
            Ok(())
        };
        let job = URLRequestHttpJob::new(&rt, &policy);
        job.start(get("http://example.com/r/0")).unwrap();

        assert_eq!(
            *calls.lock().unwrap(),
            vec![
                ("/r/1".to_string(), 1),
                ("/r/2".to_string(), 2),
                ("/r/3".to_string(), 3),
            ]
        );
    }

    #[test]
    fn test_policy_error_aborts() {
        let rt = redirect_chain(2);
        let deny = |_: &HttpRequest, _: &[HttpRequest]| -> Result<(), NetError> {
            Err(NetError::UnsafeRedirect)
        };
        let job = URLRequestHttpJob::new(&rt, &deny);

        assert_eq!(
            job.start(get("http://example.com/r/0")).unwrap_err(),
            NetError::UnsafeRedirect
        );
        assert_eq!(rt.seen().len(), 1);
    }

    #[test]
    fn test_redirect_without_location_is_final() {
        let rt = ScriptedRoundTrip::default().route("/moved", StatusCode::FOUND, &[]);
        let job = URLRequestHttpJob::new(&rt, &DefaultRedirectPolicy);

        let resp = job.start(get("http://example.com/moved")).unwrap();
        assert_eq!(resp.status(), StatusCode::FOUND);
    }

    #[test]
    fn test_not_modified_is_not_followed() {
        let rt = ScriptedRoundTrip::default().route(
            "/cached",
            StatusCode::NOT_MODIFIED,
            &[("Location", "/elsewhere")],
        );
        let job = URLRequestHttpJob::new(&rt, &DefaultRedirectPolicy);

        let resp = job.start(get("http://example.com/cached")).unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(rt.seen().len(), 1);
    }

    #[test]
    fn test_redirect_to_unsupported_scheme() {
        let rt = ScriptedRoundTrip::default().route(
            "/ftp",
            StatusCode::FOUND,
            &[("Location", "ftp://example.com/file")],
        );
        let job = URLRequestHttpJob::new(&rt, &DefaultRedirectPolicy);

        assert_eq!(
            job.start(get("http://example.com/ftp")).unwrap_err(),
            NetError::UnsafeRedirect
        );
    }

    #[test]
    fn test_post_rewritten_to_get_on_302() {
        let rt = ScriptedRoundTrip::default()
            .route("/submit", StatusCode::FOUND, &[("Location", "/done")])
            .route("/done", StatusCode::OK, &[]);
        let job = URLRequestHttpJob::new(&rt, &DefaultRedirectPolicy);

        let mut req = HttpRequest::new("POST", "http://example.com/submit")
            .unwrap()
            .with_body("a=1");
        req.set_header("Content-Type", "application/x-www-form-urlencoded")
            .unwrap();
        job.start(req).unwrap();

        let seen = rt.seen();
        assert_eq!(*seen[1].method(), Method::GET);
        assert!(seen[1].body().is_empty());
        assert!(seen[1].header("Content-Type").is_none());
    }

    #[test]
    fn test_post_preserved_on_307() {
        let rt = ScriptedRoundTrip::default()
            .route("/submit", StatusCode::TEMPORARY_REDIRECT, &[("Location", "/again")])
            .route("/again", StatusCode::OK, &[]);
        let job = URLRequestHttpJob::new(&rt, &DefaultRedirectPolicy);

        let req = HttpRequest::new("POST", "http://example.com/submit")
            .unwrap()
            .with_body("payload");
        job.start(req).unwrap();

        let seen = rt.seen();
        assert_eq!(*seen[1].method(), Method::POST);
        assert_eq!(seen[1].body().to_bytes(), "payload");
    }

    #[test]
    fn test_head_stays_head() {
        let rt = ScriptedRoundTrip::default()
            .route("/a", StatusCode::MOVED_PERMANENTLY, &[("Location", "/b")])
            .route("/b", StatusCode::OK, &[]);
        let job = URLRequestHttpJob::new(&rt, &DefaultRedirectPolicy);

        job.start(HttpRequest::new("HEAD", "http://example.com/a").unwrap())
            .unwrap();
        assert_eq!(*rt.seen()[1].method(), Method::HEAD);
    }

    #[test]
    fn test_credentials_kept_same_host() {
        let rt = ScriptedRoundTrip::default()
            .route("/a", StatusCode::FOUND, &[("Location", "http://api.example.com/b")])
            .route("/b", StatusCode::OK, &[]);
        let job = URLRequestHttpJob::new(&rt, &DefaultRedirectPolicy);

        let mut req = get("http://example.com/a");
        req.set_header("Authorization", "Basic dXNlcjpwYXNz").unwrap();
        req.set_header("Cookie", "name=value").unwrap();
        job.start(req).unwrap();

        let seen = rt.seen();
        assert_eq!(seen[1].header("Authorization"), Some("Basic dXNlcjpwYXNz"));
        assert_eq!(seen[1].header("Cookie"), Some("name=value"));
    }

    #[test]
    fn test_credentials_stripped_cross_origin() {
        let rt = ScriptedRoundTrip::default()
            .route("/a", StatusCode::FOUND, &[("Location", "http://other.test/b")])
            .route("/b", StatusCode::OK, &[]);
        let job = URLRequestHttpJob::new(&rt, &DefaultRedirectPolicy);

        let mut req = get("http://example.com/a");
        req.set_header("Authorization", "Basic dXNlcjpwYXNz").unwrap();
        req.set_header("Proxy-Authorization", "Basic cHJveHk6cGFzcw==")
            .unwrap();
        req.set_header("Cookie", "name=value").unwrap();
        job.start(req).unwrap();

        let seen = rt.seen();
        assert!(seen[1].header("Authorization").is_none());
        assert!(seen[1].header("Cookie").is_none());
        assert_eq!(
            seen[1].header("Proxy-Authorization"),
            Some("Basic cHJveHk6cGFzcw==")
        );
    }

    #[test]
    fn test_is_same_or_subdomain() {
        let base = Url::parse("http://example.com").unwrap();
        let check = |u: &str| is_same_or_subdomain(&base, &Url::parse(u).unwrap());
        assert!(check("http://example.com/x"));
        assert!(check("https://EXAMPLE.com/x"));
        assert!(check("http://a.example.com"));
        assert!(!check("http://badexample.com"));
        assert!(!check("http://example.org"));
    }

    #[test]
    fn test_transport_error_propagates() {
        struct Failing;
        impl RoundTrip for Failing {
            fn round_trip(&self, _: &HttpRequest) -> Result<HttpResponse, NetError> {
                Err(NetError::ConnectionRefused)
            }
        }
        let job = URLRequestHttpJob::new(&Failing, &DefaultRedirectPolicy);
        assert_eq!(
            job.start(get("http://example.com")).unwrap_err(),
            NetError::ConnectionRefused
        );
    }
}
