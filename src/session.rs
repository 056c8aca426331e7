//! UDP transport to a single Mailbox Gateway endpoint.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::UdpSocket;

use crate::error::Error;

/// Default Mailbox Gateway UDP port, per ETG.8200.
pub const GATEWAY_PORT: u16 = 34980;

/// The overall budget for a single request/response round trip.
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(3);

/// Datagrams this large comfortably hold any single, unsegmented mailbox frame this
/// client ever sends or expects back.
const MAX_DATAGRAM: usize = 1500;

/// A connection to one Mailbox Gateway endpoint.
///
/// At most one request may be outstanding at a time; concurrent calls to [`Session::send`]
/// on the same instance are undefined, matching the single-in-flight model of the
/// protocol's request/response pairing.
#[derive(Debug)]
pub struct Session {
    remote: SocketAddr,
}

impl Session {
    /// Create a session targeting `(host, port)`. The default gateway port is
    /// [`GATEWAY_PORT`].
    pub fn new(remote: SocketAddr) -> Self {
        Self { remote }
    }

    /// Send one datagram and wait for the first inbound reply, with a fixed 3 second
    /// overall timeout. Binds and closes an ephemeral socket per call: no file
    /// descriptor outlives this function.
    pub async fn send(&self, request: &[u8]) -> Result<Vec<u8>, Error> {
        let bind_addr: SocketAddr = if self.remote.is_ipv6() {
            "[::]:0".parse().expect("valid unspecified IPv6 address")
        } else {
            "0.0.0.0:0".parse().expect("valid unspecified IPv4 address")
        };

        let socket = UdpSocket::bind(bind_addr).await?;

        debug!("send {} bytes to {}", request.len(), self.remote);

        socket.send_to(request, self.remote).await.map_err(|e| {
            warn!("send to {} failed: {}", self.remote, e);
            Error::from(e)
        })?;

        let mut buf = vec![0u8; MAX_DATAGRAM];

        let recv = tokio::time::timeout(RESPONSE_TIMEOUT, socket.recv_from(&mut buf)).await;

        let (len, from) = match recv {
            Ok(Ok(pair)) => pair,
            Ok(Err(e)) => {
                warn!("recv from {} failed: {}", self.remote, e);
                return Err(Error::from(e));
            }
            Err(_elapsed) => {
                warn!("timed out waiting for a reply from {}", self.remote);
                return Err(Error::Timeout);
            }
        };

        buf.truncate(len);

        debug!("received {} bytes from {}", len, from);

        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trip_over_loopback() {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let server_addr = server.local_addr().unwrap();

        let echo = tokio::spawn(async move {
            let mut buf = [0u8; 64];
            let (len, from) = server.recv_from(&mut buf).await.unwrap();
            server.send_to(&buf[..len], from).await.unwrap();
        });

        let session = Session::new(server_addr);
        let reply = session.send(b"ping").await.unwrap();

        assert_eq!(reply, b"ping");

        echo.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_when_nothing_replies() {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let server_addr = server.local_addr().unwrap();

        let session = Session::new(server_addr);

        let result = session.send(b"ping").await;

        assert!(matches!(result, Err(Error::Timeout)));
    }
}
