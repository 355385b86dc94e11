use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;

use crate::{DelayTimer, TimerState, Transport};

/// A [`Transport`] over a connected UDP socket.
///
/// Receive calls block. [`Transport::recv_timeout`] uses the socket read
/// timeout and reports an expired timeout as [`io::ErrorKind::TimedOut`] on
/// every platform.
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
    timer: DelayTimer,
}

impl UdpTransport {
    /// Connect `socket` to `remote` and wrap it.
    pub fn connect(socket: UdpSocket, remote: impl ToSocketAddrs) -> io::Result<Self> {
        socket.connect(remote)?;
        Ok(Self {
            socket,
            timer: DelayTimer::new(),
        })
    }

    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        self.socket.peer_addr()
    }

    pub fn socket(&self) -> &UdpSocket {
        &self.socket
    }

    pub fn into_inner(self) -> UdpSocket {
        self.socket
    }
}

impl Transport for UdpTransport {
    fn send(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.socket.send(buf)
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.socket.set_read_timeout(None)?;
        self.socket.recv(buf)
    }

    fn recv_timeout(&mut self, buf: &mut [u8], timeout_ms: u32) -> io::Result<usize> {
        let timeout = (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms.into()));
        self.socket.set_read_timeout(timeout)?;

        match self.socket.recv(buf) {
            // Unix reports an expired read timeout as WouldBlock.
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                Err(io::Error::new(io::ErrorKind::TimedOut, e))
            }
            r => r,
        }
    }

    fn set_timer(&mut self, intermediate_ms: u32, final_ms: u32) {
        trace!("Set timer: {}, {}", intermediate_ms, final_ms);
        self.timer.set(intermediate_ms, final_ms);
    }

    fn get_timer(&self) -> TimerState {
        self.timer.state()
    }
}
