// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Network sinks for [`crate::Logger`].

use std::io::{self, Write};
use std::net::{TcpStream, ToSocketAddrs, UdpSocket};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("invalid sink address '{0}'")]
    InvalidAddress(String),

    #[error("resolve '{addr}': {source}")]
    Resolve {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("connect '{addr}': {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },
}

/// Connected UDP socket; every `write` is sent as one datagram.
#[derive(Debug)]
pub struct UdpSink {
    socket: UdpSocket,
}

impl Write for UdpSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.socket.send(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn connect_udp(addr: &str) -> Result<UdpSink, SinkError> {
    let remote = addr
        .to_socket_addrs()
        .map_err(|source| SinkError::Resolve {
            addr: addr.to_string(),
            source,
        })?
        .next()
        .ok_or_else(|| SinkError::InvalidAddress(addr.to_string()))?;
    let local = if remote.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
    let connect_err = |source| SinkError::Connect {
        addr: addr.to_string(),
        source,
    };
    let socket = UdpSocket::bind(local).map_err(connect_err)?;
    socket.connect(remote).map_err(connect_err)?;
    Ok(UdpSink { socket })
}

/// Open a sink from a `udp://host:port`, `tcp://host:port`, or bare
/// `host:port` (TCP) address.
pub fn connect_sink(url: &str) -> Result<Box<dyn Write + Send>, SinkError> {
    let url = url.trim();
    if let Some(addr) = url.strip_prefix("udp://") {
        return Ok(Box::new(connect_udp(addr)?));
    }
    let addr = url.strip_prefix("tcp://").unwrap_or(url);
    if addr.is_empty() || addr.contains("://") {
        return Err(SinkError::InvalidAddress(url.to_string()));
    }
    let stream = TcpStream::connect(addr).map_err(|source| SinkError::Connect {
        addr: addr.to_string(),
        source,
    })?;
    Ok(Box::new(stream))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::net::TcpListener;
    use std::time::Duration;

    #[test]
    fn test_udp_sink_delivers_datagram() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        let addr = receiver.local_addr().unwrap();

        let mut sink = connect_sink(&format!("udp://{}", addr)).unwrap();
        sink.write_all(b"hello world").unwrap();

        let mut buf = [0u8; 64];
        let n = receiver.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"hello world");
    }

    #[test]
    fn test_tcp_sink_with_and_without_scheme() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        for url in [format!("tcp://{}", addr), addr.to_string()] {
            let mut sink = connect_sink(&url).unwrap();
            let (mut conn, _) = listener.accept().unwrap();
            sink.write_all(b"line\n").unwrap();
            drop(sink);
            let mut received = String::new();
            conn.read_to_string(&mut received).unwrap();
            assert_eq!(received, "line\n");
        }
    }

    #[test]
    fn test_rejects_unknown_scheme() {
        assert!(matches!(
            connect_sink("http://127.0.0.1:80"),
            Err(SinkError::InvalidAddress(_))
        ));
        assert!(matches!(connect_sink(""), Err(SinkError::InvalidAddress(_))));
    }
}
