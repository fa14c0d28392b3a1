//! TCP connector over embassy-net
//!
//! Each [`Connector::open`] resolves the host, connects, writes the request
//! and hands the socket to the core transport reader as a [`ByteStream`].

use core::net::Ipv4Addr;

use defmt::*;
use embassy_net::dns::DnsQueryType;
use embassy_net::tcp::{Error as TcpError, TcpSocket};
use embassy_net::{IpAddress, Stack};
use embassy_time::Duration;
use embedded_io_async::Write;
use wakeframe_core::traits::{ByteStream, ConnectError, Connector, StreamError};

/// Socket receive buffer; one image row must fit with room to spare
pub const RX_BUFFER_LEN: usize = 4096;

/// Socket transmit buffer; requests are a few hundred bytes
pub const TX_BUFFER_LEN: usize = 1024;

/// Inactivity timeout handed to the socket itself
const SOCKET_TIMEOUT: Duration = Duration::from_secs(10);

/// Opens one TCP connection per request to the configured server
pub struct TcpConnector<'d> {
    stack: Stack<'static>,
    host: &'d str,
    port: u16,
    rx: &'d mut [u8],
    tx: &'d mut [u8],
}

impl<'d> TcpConnector<'d> {
    pub fn new(
        stack: Stack<'static>,
        host: &'d str,
        port: u16,
        rx: &'d mut [u8],
        tx: &'d mut [u8],
    ) -> Self {
        Self {
            stack,
            host,
            port,
            rx,
            tx,
        }
    }

    async fn resolve(&self) -> Result<IpAddress, ConnectError> {
        if let Ok(address) = self.host.parse::<Ipv4Addr>() {
            return Ok(IpAddress::Ipv4(address));
        }

        let addresses = self
            .stack
            .dns_query(self.host, DnsQueryType::A)
            .await
            .map_err(|e| {
                warn!("DNS lookup for {} failed: {:?}", self.host, e);
                ConnectError::Dns
            })?;
        addresses.first().copied().ok_or(ConnectError::Dns)
    }
}

impl Connector for TcpConnector<'_> {
    type Stream<'a>
        = SocketStream<'a>
    where
        Self: 'a;

    fn host(&self) -> &str {
        self.host
    }

    async fn open(&mut self, request: &[u8]) -> Result<SocketStream<'_>, ConnectError> {
        if !self.stack.is_link_up() {
            return Err(ConnectError::NoLink);
        }
        let address = self.resolve().await?;

        let mut socket = TcpSocket::new(self.stack, &mut *self.rx, &mut *self.tx);
        socket.set_timeout(Some(SOCKET_TIMEOUT));

        if let Err(e) = socket.connect((address, self.port)).await {
            warn!("Connect to {}:{} failed: {:?}", self.host, self.port, e);
            return Err(ConnectError::Refused);
        }
        if let Err(e) = socket.write_all(request).await {
            warn!("Request write failed: {:?}", e);
            socket.abort();
            return Err(ConnectError::Write);
        }
        if socket.flush().await.is_err() {
            socket.abort();
            return Err(ConnectError::Write);
        }

        Ok(SocketStream { socket })
    }
}

/// An open socket with the request already sent
pub struct SocketStream<'a> {
    socket: TcpSocket<'a>,
}

impl ByteStream for SocketStream<'_> {
    fn available(&self) -> usize {
        self.socket.recv_queue()
    }

    fn is_open(&self) -> bool {
        self.socket.may_recv()
    }

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, StreamError> {
        self.socket.read(buf).await.map_err(|e| match e {
            TcpError::ConnectionReset => StreamError::Reset,
            #[allow(unreachable_patterns)]
            _ => StreamError::Io,
        })
    }

    fn abort(&mut self) {
        self.socket.abort();
    }
}
