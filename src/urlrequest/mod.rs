//! Redirect following and redirect policies.
//!
//! - [`job`]: drives a request through its redirect chain
//! - [`redirect`]: the [`CheckRedirect`](redirect::CheckRedirect) policy hook

pub mod job;
pub mod redirect;

pub use job::URLRequestHttpJob;
pub use redirect::{CheckRedirect, CookieHarvestingPolicy, DefaultRedirectPolicy, MAX_REDIRECTS};
