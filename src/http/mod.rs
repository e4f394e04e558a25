//! HTTP request/response types, Basic credentials and the HTTP/1.1 hop
//! executor.

pub mod basicauth;
pub mod networklayer;
pub mod request;
pub mod response;
pub mod streamfactory;

// Re-exports for convenience
pub use basicauth::BasicCredential;
pub use networklayer::HttpNetworkLayer;
pub use request::{HttpRequest, RequestBody};
pub use response::HttpResponse;
