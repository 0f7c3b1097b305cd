use std::{
    io::Write,
    net::{Shutdown, SocketAddr, TcpStream},
    time::Duration,
};

use tracing::trace;

use crate::{
    error::{ConnectError, LinkError},
    frame::Frame,
    link::Link,
    params::DEFAULT_CONNECT_TIMEOUT,
};

/// Connection options for [`Tcp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpOption {
    /// Timeout for establishing the TCP connection.
    pub connect_timeout: Duration,
}

impl Default for TcpOption {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

#[derive(Debug)]
struct TcpInner {
    stream: TcpStream,
    // Last read timeout applied to the socket; setting it is a syscall.
    read_timeout: Option<Duration>,
}

impl TcpInner {
    fn open(addr: &SocketAddr, option: &TcpOption) -> Result<Self, ConnectError> {
        let map = |source| ConnectError {
            addr: *addr,
            source,
        };
        let stream = TcpStream::connect_timeout(addr, option.connect_timeout).map_err(map)?;
        stream.set_nodelay(true).map_err(map)?;
        Ok(Self {
            stream,
            read_timeout: None,
        })
    }

    fn send_frame(&mut self, frame: &Frame) -> Result<(), LinkError> {
        let bytes = frame.encode();
        trace!(
            message_type = frame.message_type,
            len = bytes.len(),
            "tx frame"
        );
        self.stream.write_all(&bytes)?;
        Ok(())
    }

    fn recv_frame(&mut self, timeout: Duration) -> Result<Frame, LinkError> {
        if self.read_timeout != Some(timeout) {
            self.stream.set_read_timeout(Some(timeout))?;
            self.read_timeout = Some(timeout);
        }
        let frame = Frame::read_from(&mut self.stream)?;
        trace!(
            message_type = frame.message_type,
            len = frame.payload.len(),
            "rx frame"
        );
        Ok(frame)
    }
}

/// A [`Link`] over one TCP connection to a physical irNetBox.
///
/// There is no implicit reconnect: after any [`LinkError`] the caller must
/// [`close`](Link::close) and [`open`](Link::open) again, and renegotiate the
/// device model on the fresh connection.
#[derive(Debug)]
pub struct Tcp {
    addr: SocketAddr,
    option: TcpOption,
    inner: Option<TcpInner>,
}

impl Tcp {
    /// Creates a new [`Tcp`] targeting `addr`. The connection is opened by
    /// [`Link::open`].
    #[must_use]
    pub const fn new(addr: SocketAddr, option: TcpOption) -> Self {
        Self {
            addr,
            option,
            inner: None,
        }
    }

    /// The device address this link targets.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl Link for Tcp {
    fn open(&mut self) -> Result<(), LinkError> {
        self.inner = Some(TcpInner::open(&self.addr, &self.option)?);
        Ok(())
    }

    fn close(&mut self) -> Result<(), LinkError> {
        if let Some(inner) = self.inner.take() {
            let _ = inner.stream.shutdown(Shutdown::Both);
        }
        Ok(())
    }

    fn send_frame(&mut self, frame: &Frame) -> Result<(), LinkError> {
        match self.inner.as_mut() {
            Some(inner) => inner.send_frame(frame),
            None => Err(LinkError::Closed),
        }
    }

    fn recv_frame(&mut self, timeout: Duration) -> Result<Frame, LinkError> {
        match self.inner.as_mut() {
            Some(inner) => inner.recv_frame(timeout),
            None => Err(LinkError::Closed),
        }
    }

    fn is_open(&self) -> bool {
        self.inner.is_some()
    }
}

impl Drop for Tcp {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
