use std::io;

/// State of a caller-provided retransmission timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// No timer is armed.
    Cancelled,
    /// Armed, no deadline passed yet.
    Running,
    /// The intermediate deadline passed.
    IntermediateExpired,
    /// The final deadline passed.
    FinalExpired,
}

impl TimerState {
    /// Conventional integer form: -1, 0, 1 or 2.
    pub fn as_raw(&self) -> i32 {
        match self {
            TimerState::Cancelled => -1,
            TimerState::Running => 0,
            TimerState::IntermediateExpired => 1,
            TimerState::FinalExpired => 2,
        }
    }

    pub fn from_raw(v: i32) -> Option<Self> {
        match v {
            -1 => Some(TimerState::Cancelled),
            0 => Some(TimerState::Running),
            1 => Some(TimerState::IntermediateExpired),
            2 => Some(TimerState::FinalExpired),
            _ => None,
        }
    }
}

/// The datagram and timer operations a session runs on.
///
/// A session owns its transport. To lend one instead, pass `&mut transport`;
/// the session then cannot outlive it.
pub trait Transport {
    /// Send one datagram, returning the number of bytes sent.
    fn send(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Receive one datagram into `buf`, returning its length.
    ///
    /// A datagram longer than `buf` is truncated.
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Like [`Transport::recv`] but give up after `timeout_ms`. Zero waits
    /// forever.
    ///
    /// The default ignores the timeout and calls `recv`.
    fn recv_timeout(&mut self, buf: &mut [u8], timeout_ms: u32) -> io::Result<usize> {
        let _ = timeout_ms;
        self.recv(buf)
    }

    /// Arm the timer with an intermediate and a final delay. A final delay
    /// of zero cancels the timer.
    fn set_timer(&mut self, intermediate_ms: u32, final_ms: u32);

    /// Current timer state.
    fn get_timer(&self) -> TimerState;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, buf: &[u8]) -> io::Result<usize> {
        (**self).send(buf)
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).recv(buf)
    }

    fn recv_timeout(&mut self, buf: &mut [u8], timeout_ms: u32) -> io::Result<usize> {
        (**self).recv_timeout(buf, timeout_ms)
    }

    fn set_timer(&mut self, intermediate_ms: u32, final_ms: u32) {
        (**self).set_timer(intermediate_ms, final_ms)
    }

    fn get_timer(&self) -> TimerState {
        (**self).get_timer()
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, buf: &[u8]) -> io::Result<usize> {
        (**self).send(buf)
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).recv(buf)
    }

    fn recv_timeout(&mut self, buf: &mut [u8], timeout_ms: u32) -> io::Result<usize> {
        (**self).recv_timeout(buf, timeout_ms)
    }

    fn set_timer(&mut self, intermediate_ms: u32, final_ms: u32) {
        (**self).set_timer(intermediate_ms, final_ms)
    }

    fn get_timer(&self) -> TimerState {
        (**self).get_timer()
    }
}
