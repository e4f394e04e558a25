use crate::base::neterror::NetError;
use crate::socket::client::SocketType;
use crate::socket::proxy::ProxySettings;
use crate::socket::tls::TlsConfig;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use url::Url;

/// Upper bound on the size of a proxy's CONNECT response head.
const MAX_TUNNEL_RESPONSE: usize = 8 * 1024;

/// A connected socket plus how requests must be written on it.
#[derive(Debug)]
pub struct Connection {
    pub socket: SocketType,
    /// Requests go to a forward proxy in absolute-form (`GET http://host/path`).
    pub absolute_form: bool,
}

/// Opens the socket for one hop: DNS, TCP (to the origin or the proxy),
/// an optional `CONNECT` tunnel, then TLS for https targets.
pub struct ConnectJob<'a> {
    tls: &'a TlsConfig,
    proxy: Option<&'a ProxySettings>,
}

impl<'a> ConnectJob<'a> {
    pub fn new(tls: &'a TlsConfig, proxy: Option<&'a ProxySettings>) -> Self {
        Self { tls, proxy }
    }

    /// Connect to `url`'s origin, directly or through the proxy.
    ///
    /// `proxy_auth` is sent on the CONNECT request when tunneling; when it is
    /// `None` the proxy's own credentials are used, if any.
    pub async fn connect(&self, url: &Url, proxy_auth: Option<&str>) -> Result<Connection, NetError> {
        let target_host = url.host_str().ok_or(NetError::InvalidUrl)?;
        let target_port = url.port_or_known_default().ok_or(NetError::InvalidUrl)?;
        let is_https = url.scheme() == "https";

        let Some(proxy) = self.proxy else {
            let stream = tcp_connect(target_host, target_port).await?;
            let socket = if is_https {
                self.tls_handshake(target_host, stream).await?
            } else {
                SocketType::Tcp(stream)
            };
            return Ok(Connection {
                socket,
                absolute_form: false,
            });
        };

        let (proxy_host, proxy_port) = proxy.host_port().ok_or(NetError::InvalidUrl)?;
        let mut stream = tcp_connect(proxy_host, proxy_port).await.map_err(|e| {
            tracing::debug!(proxy = %proxy.url, error = %e, "proxy connect failed");
            NetError::ProxyConnectionFailed
        })?;

        if !is_https {
            return Ok(Connection {
                socket: SocketType::Tcp(stream),
                absolute_form: true,
            });
        }

        let auth = proxy_auth.map(str::to_owned).or_else(|| proxy.auth_header());
        establish_tunnel(&mut stream, target_host, target_port, auth.as_deref()).await?;
        let socket = self.tls_handshake(target_host, stream).await?;
        Ok(Connection {
            socket,
            absolute_form: false,
        })
    }

    async fn tls_handshake(&self, host: &str, stream: TcpStream) -> Result<SocketType, NetError> {
        let connector = self.tls.connector()?;
        let mut config = connector.configure().map_err(|_| NetError::SslProtocolError)?;

        let domain = host.trim_start_matches('[').trim_end_matches(']');
        if !TlsConfig::should_set_sni(host) {
            config.set_use_server_name_indication(false);
            config.set_verify_hostname(false);
        }
        if !self.tls.verify_peer {
            config.set_verify_hostname(false);
        }

        let tls_stream = tokio_boring::connect(config, domain, stream).await.map_err(|e| {
            tracing::debug!(host, error = ?e, "TLS handshake failed");
            NetError::SslProtocolError
        })?;
        Ok(SocketType::Ssl(tls_stream))
    }
}

async fn tcp_connect(host: &str, port: u16) -> Result<TcpStream, NetError> {
    let host = host.trim_start_matches('[').trim_end_matches(']');
    let addrs = tokio::net::lookup_host((host, port))
        .await
        .map_err(|_| NetError::NameNotResolved)?;

    let mut last_err = NetError::NameNotResolved;
    for addr in addrs {
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                tracing::debug!(%addr, "connected");
                return Ok(stream);
            }
            Err(e) => last_err = NetError::from(e),
        }
    }
    Err(last_err)
}

/// Send `CONNECT host:port` and wait for a 2xx answer.
async fn establish_tunnel(
    stream: &mut TcpStream,
    host: &str,
    port: u16,
    proxy_auth: Option<&str>,
) -> Result<(), NetError> {
    let target = format!("{}:{}", host, port);
    let mut connect_req = format!("CONNECT {} HTTP/1.1\r\nHost: {}\r\n", target, target);
    if let Some(auth) = proxy_auth {
        connect_req.push_str(&format!("Proxy-Authorization: {}\r\n", auth));
    }
    connect_req.push_str("\r\n");

    stream
        .write_all(connect_req.as_bytes())
        .await
        .map_err(|_| NetError::TunnelConnectionFailed)?;

    // Byte at a time so nothing past the response head is consumed.
    let mut head = Vec::with_capacity(256);
    while !head.ends_with(b"\r\n\r\n") {
        if head.len() >= MAX_TUNNEL_RESPONSE {
            return Err(NetError::TunnelConnectionFailed);
        }
        let byte = stream.read_u8().await.map_err(|_| NetError::TunnelConnectionFailed)?;
        head.push(byte);
    }

    match tunnel_status(&head) {
        Some(status) if (200..300).contains(&status) => {
            tracing::debug!(%target, status, "tunnel established");
            Ok(())
        }
        status => {
            tracing::debug!(%target, ?status, "proxy refused tunnel");
            Err(NetError::TunnelConnectionFailed)
        }
    }
}

/// Status code from an `HTTP/1.x NNN reason` status line.
fn tunnel_status(head: &[u8]) -> Option<u16> {
    let line_end = head.iter().position(|&b| b == b'\r')?;
    let line = std::str::from_utf8(&head[..line_end]).ok()?;
    let mut parts = line.split(' ');
    if !parts.next()?.starts_with("HTTP/1.") {
        return None;
    }
    parts.next()?.parse().ok()
}
