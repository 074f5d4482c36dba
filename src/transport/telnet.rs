//! OpenOCD telnet transport.

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::thread;
use std::time::Duration;

use log::{debug, info};

use super::{TargetConfig, Transport};
use crate::error::{BscanError, Result};

/// Size of each socket read.
const REPLY_BUFFER: usize = 4096;

/// OpenOCD's telnet prompt, which ends every reply.
const PROMPT: &[u8] = b"> ";

/// Plain TCP session with OpenOCD's telnet server.
pub struct TelnetTransport {
    stream: TcpStream,
    settle: Duration,
    buffer: Vec<u8>,
}

impl TelnetTransport {
    /// Connect to the controller described by `config` and discard its banner.
    pub fn connect(config: &TargetConfig) -> Result<Self> {
        let address = config.address();
        let connect_err = |source: io::Error| BscanError::Connection {
            address: address.clone(),
            source,
        };

        let socket_addr = address
            .to_socket_addrs()
            .map_err(connect_err)?
            .next()
            .ok_or_else(|| connect_err(io::Error::new(io::ErrorKind::NotFound, "address did not resolve")))?;

        let stream = TcpStream::connect_timeout(&socket_addr, config.timeout).map_err(connect_err)?;
        stream.set_read_timeout(Some(config.timeout)).map_err(connect_err)?;
        stream.set_write_timeout(Some(config.timeout)).map_err(connect_err)?;

        let mut transport = Self {
            stream,
            settle: config.settle,
            buffer: vec![0u8; REPLY_BUFFER],
        };

        match transport.read_reply() {
            Ok(banner) => debug!("banner: {}", banner.trim()),
            Err(e) if is_timeout(&e) => {}
            Err(e) => return Err(connect_err(e)),
        }

        info!("connected to OpenOCD at {}", address);
        Ok(transport)
    }

    /// Read until the `> ` prompt. A timeout or close after some data ends
    /// the reply early; with no data at all it is an error.
    fn read_reply(&mut self) -> io::Result<String> {
        let mut reply = Vec::new();
        loop {
            match self.stream.read(&mut self.buffer) {
                Ok(0) if reply.is_empty() => {
                    return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "connection closed by controller"));
                }
                Ok(0) => break,
                Ok(n) => {
                    reply.extend_from_slice(&self.buffer[..n]);
                    if reply.ends_with(PROMPT) {
                        break;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) if is_timeout(&e) && !reply.is_empty() => {
                    debug!("no prompt before timeout, using partial reply");
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(String::from_utf8_lossy(&reply).into_owned())
    }
}

impl Transport for TelnetTransport {
    fn send(&mut self, command: &str) -> Result<String> {
        self.stream
            .write_all(format!("{}\n", command).as_bytes())
            .map_err(|e| BscanError::transport(command, e.to_string()))?;
        thread::sleep(self.settle);

        let reply = self
            .read_reply()
            .map_err(|e| BscanError::transport(command, e.to_string()))?;
        debug!("{} -> {}", command, reply.trim());

        if reply.contains("invalid command name") || reply.contains("Error:") {
            return Err(BscanError::transport(command, reply.trim().to_string()));
        }
        Ok(reply)
    }
}

fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn test_send_over_loopback() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            socket.write_all(b"Open On-Chip Debugger\r\n> ").unwrap();
            let mut buf = [0u8; 256];
            let n = socket.read(&mut buf).unwrap();
            let line = String::from_utf8_lossy(&buf[..n]).to_string();
            socket.write_all(format!("{}\r\n> ", line.trim()).as_bytes()).unwrap();
            line
        });

        let config = TargetConfig::new("chip.tap").with_port(port);
        let mut transport = TelnetTransport::connect(&config).unwrap();
        let reply = transport.send("irscan chip.tap 0x26").unwrap();

        assert!(reply.contains("irscan chip.tap 0x26"));
        assert_eq!(server.join().unwrap(), "irscan chip.tap 0x26\n");
    }

    #[test]
    fn test_reply_split_across_writes() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            socket.write_all(b"Open On-Chip Debugger\r\n> ").unwrap();
            let mut buf = [0u8; 256];

            socket.read(&mut buf).unwrap();
            socket.write_all(b"drscan t 4 0x1\r\n").unwrap();
            socket.flush().unwrap();
            thread::sleep(Duration::from_millis(50));
            socket.write_all(b"Error: drscan failed\r\n> ").unwrap();

            socket.read(&mut buf).unwrap();
            socket.write_all(b"irscan t 0x26\r\n> ").unwrap();
        });

        let config = TargetConfig::new("t").with_port(port);
        let mut transport = TelnetTransport::connect(&config).unwrap();

        let err = transport.send("drscan t 4 0x1").unwrap_err();
        assert!(err.to_string().contains("drscan failed"));
        let reply = transport.send("irscan t 0x26").unwrap();
        assert!(!reply.contains("Error"));
        assert!(reply.contains("irscan t 0x26"));

        server.join().unwrap();
    }

    #[test]
    fn test_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = TargetConfig::new("chip.tap")
            .with_port(port)
            .with_timeout(Duration::from_millis(200));
        assert!(matches!(
            TelnetTransport::connect(&config),
            Err(BscanError::Connection { .. })
        ));
    }
}
