use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use super::session::{ProbeSession, SmtpSession};
use crate::error::ValidationError;
use crate::validate::ProbeOptions;

/// Opens a [`ProbeSession`] to a `host:port` target.
pub trait Connector {
    type Session: ProbeSession;

    fn connect(&self, address: &str) -> Result<Self::Session, ValidationError>;
}

/// Plain TCP connector. Every resolved socket address is tried in turn until
/// one accepts the connection.
#[derive(Debug, Clone, Default)]
pub struct TcpConnector {
    connect_timeout: Option<Duration>,
    command_timeout: Option<Duration>,
}

impl TcpConnector {
    pub fn new(connect_timeout: Option<Duration>, command_timeout: Option<Duration>) -> Self {
        Self {
            connect_timeout,
            command_timeout,
        }
    }

    pub fn from_options(options: &ProbeOptions) -> Self {
        Self::new(options.connect_timeout(), options.command_timeout())
    }

    fn open_stream(&self, addrs: &[SocketAddr]) -> io::Result<TcpStream> {
        let mut last_err = None;
        for addr in addrs {
            let attempt = match self.connect_timeout {
                Some(timeout) => TcpStream::connect_timeout(addr, timeout),
                None => TcpStream::connect(addr),
            };
            match attempt {
                Ok(stream) => {
                    stream.set_read_timeout(self.command_timeout)?;
                    stream.set_write_timeout(self.command_timeout)?;
                    return Ok(stream);
                }
                Err(err) => last_err = Some(err),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                "no socket address available",
            )
        }))
    }
}

impl Connector for TcpConnector {
    type Session = SmtpSession<TcpStream>;

    #[cfg_attr(feature = "with-tracing", tracing::instrument(level = "debug", skip(self)))]
    fn connect(&self, address: &str) -> Result<Self::Session, ValidationError> {
        let addrs: Vec<SocketAddr> = address
            .to_socket_addrs()
            .map_err(|err| ValidationError::connect(address, err))?
            .collect();
        let stream = self
            .open_stream(&addrs)
            .map_err(|err| ValidationError::connect(address, err))?;
        #[cfg(feature = "with-tracing")]
        tracing::debug!(peer = ?stream.peer_addr().ok(), "connected");
        SmtpSession::open(stream).map_err(|err| ValidationError::connect(address, err))
    }
}
