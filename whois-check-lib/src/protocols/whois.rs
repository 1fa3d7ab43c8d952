//! Raw TCP WHOIS (RFC 3912).
//!
//! The query is the domain followed by CRLF. The response has no framing:
//! the server writes text and closes the connection.

use crate::error::WhoisError;
use crate::types::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, warn};

/// Upper bound on the bytes kept from a single response.
const MAX_RESPONSE_BYTES: usize = 1024 * 1024;

/// Size of each read from the socket.
const READ_CHUNK: usize = 4096;

/// Client for querying WHOIS servers over TCP.
#[derive(Debug, Clone)]
pub struct SocketWhoisClient {
    /// Timeout for establishing the connection
    connect_timeout: Duration,
    /// Longest silence tolerated between two reads
    read_timeout: Duration,
}

impl SocketWhoisClient {
    /// Create a new client with 10s connect and read timeouts.
    pub fn new() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Create a new client with custom timeouts.
    pub fn with_timeouts(connect_timeout: Duration, read_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            read_timeout,
        }
    }

    /// Query `host:port` for `domain` and return the full response text.
    ///
    /// The response is drained until the server closes the connection. If the
    /// server goes quiet for a whole read timeout, whatever has arrived so far
    /// is returned; slow servers are not treated as failures. The connection
    /// is closed when this returns, on every path.
    ///
    /// # Errors
    ///
    /// Returns `WhoisError::NetworkError` if the connection cannot be
    /// established, the query cannot be written, or reading fails or times
    /// out before any data arrived.
    pub async fn query(&self, host: &str, port: u16, domain: &str) -> Result<String, WhoisError> {
        let address = format!("{}:{}", host, port);
        debug!("Connecting to WHOIS server {}", address);

        let mut stream =
            match tokio::time::timeout(self.connect_timeout, TcpStream::connect((host, port)))
                .await
            {
                Ok(Ok(stream)) => stream,
                Ok(Err(e)) => return Err(WhoisError::network_io(&address, &e)),
                Err(_) => {
                    return Err(WhoisError::network(format!(
                        "Connection to {} timed out after {:?}",
                        address, self.connect_timeout
                    )))
                }
            };

        if let Err(e) = stream.set_nodelay(true) {
            debug!("Failed to set TCP_NODELAY on {}: {}", address, e);
        }

        let query = format!("{}\r\n", domain);
        match tokio::time::timeout(self.read_timeout, stream.write_all(query.as_bytes())).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(WhoisError::network_io(&address, &e)),
            Err(_) => {
                return Err(WhoisError::network(format!(
                    "Writing query to {} timed out",
                    address
                )))
            }
        }

        let data = self.drain(&mut stream, &address).await?;
        debug!("Received {} bytes from {}", data.len(), address);

        Ok(String::from_utf8_lossy(&data).into_owned())
    }

    /// Read until EOF, an idle timeout, or the size cap.
    async fn drain(&self, stream: &mut TcpStream, address: &str) -> Result<Vec<u8>, WhoisError> {
        let mut data = Vec::new();
        let mut buffer = [0u8; READ_CHUNK];

        loop {
            match tokio::time::timeout(self.read_timeout, stream.read(&mut buffer)).await {
                Ok(Ok(0)) => break,
                Ok(Ok(n)) => {
                    data.extend_from_slice(&buffer[..n]);
                    if data.len() >= MAX_RESPONSE_BYTES {
                        warn!(
                            "Response from {} exceeded {} bytes, truncating",
                            address, MAX_RESPONSE_BYTES
                        );
                        data.truncate(MAX_RESPONSE_BYTES);
                        break;
                    }
                }
                Ok(Err(e)) if data.is_empty() => {
                    return Err(WhoisError::network_io(address, &e));
                }
                Ok(Err(e)) => {
                    debug!("Read from {} failed after {} bytes: {}", address, data.len(), e);
                    break;
                }
                Err(_) if data.is_empty() => {
                    return Err(WhoisError::network(format!(
                        "read {}: no response within {:?}",
                        address, self.read_timeout
                    )));
                }
                Err(_) => {
                    debug!(
                        "No data from {} for {:?}, keeping {} bytes",
                        address,
                        self.read_timeout,
                        data.len()
                    );
                    break;
                }
            }
        }

        Ok(data)
    }
}

impl Default for SocketWhoisClient {
    fn default() -> Self {
        Self::new()
    }
}
