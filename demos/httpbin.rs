//! Basic auth and cookie round trip against httpbin.org.
//!
//! ```text
//! RUST_LOG=netsession=debug cargo run --example httpbin
//! ```

use netsession::Session;
use serde::Deserialize;
use std::collections::HashMap;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
struct CookiesResponse {
    cookies: HashMap<String, String>,
}

fn basic_auth() -> Result<(), Box<dyn std::error::Error>> {
    let (username, password) = ("basic-auth", "password");
    let session = Session::builder().basic_auth(username, password).build();

    let resp = session.get(&format!(
        "http://httpbin.org/basic-auth/{}/{}",
        username, password
    ))?;
    println!("authenticated: {}", resp.status().is_success());
    println!("{}", resp.text()?);
    Ok(())
}

fn cookies() -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::new();

    // The cookie arrives on a 302 and is picked up by the redirect policy.
    session.get("http://httpbin.org/cookies/set/name/value")?;
    for cookie in session.cookies() {
        println!("stored: {}={}", cookie.name(), cookie.value());
    }

    let resp = session.get("http://httpbin.org/cookies")?;
    let echoed: CookiesResponse = resp.json()?;
    println!("{:#?}", echoed);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    basic_auth()?;
    cookies()?;
    Ok(())
}
