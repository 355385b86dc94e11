//! Instrumented transport handed to the engine.
//!
//! Send and receive calls are traced to the log sink as hex dumps. Results
//! are returned exactly as the transport produced them; nothing is buffered
//! or retried here.

use std::fmt;
use std::io;

use crate::{Bindings, DebugRecord, EngineIo, TimerState, Transport};

pub(crate) struct Instrumented<'a, T> {
    transport: &'a mut T,
    bindings: &'a Bindings,
    engine: &'static str,
    session_id: u64,
}

impl<'a, T: Transport> Instrumented<'a, T> {
    pub fn new(
        transport: &'a mut T,
        bindings: &'a Bindings,
        engine: &'static str,
        session_id: u64,
    ) -> Self {
        Self {
            transport,
            bindings,
            engine,
            session_id,
        }
    }

    /// Trace a receive result and the bytes actually received.
    fn received(&self, what: fmt::Arguments<'_>, result: &io::Result<usize>, buf: &[u8]) {
        let logger = self.bindings.logger();
        logger.line_with(|| format!("{} = {}", what, Outcome(result)));

        if let Ok(n) = result {
            logger.line("Received buffer:");
            // Clamp, a transport may claim more than it was given room for.
            logger.hex(&buf[..(*n).min(buf.len())]);
        }
    }
}

impl<'a, T: Transport> EngineIo for Instrumented<'a, T> {
    fn send(&mut self, buf: &[u8]) -> io::Result<usize> {
        let logger = self.bindings.logger();
        logger.line("Sending buffer:");
        logger.hex(buf);

        let result = self.transport.send(buf);
        trace!("[{}] send {} bytes: {:?}", self.session_id, buf.len(), result);

        logger.line_with(|| format!("send result = {}", Outcome(&result)));
        result
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let result = self.transport.recv(buf);
        trace!("[{}] recv: {:?}", self.session_id, result);

        self.received(format_args!("recv result"), &result, buf);
        result
    }

    fn recv_timeout(&mut self, buf: &mut [u8], timeout_ms: u32) -> io::Result<usize> {
        let result = self.transport.recv_timeout(buf, timeout_ms);
        trace!(
            "[{}] recv_timeout({}): {:?}",
            self.session_id,
            timeout_ms,
            result
        );

        self.received(
            format_args!("recv_timeout({}) result", timeout_ms),
            &result,
            buf,
        );
        result
    }

    fn set_timer(&mut self, intermediate_ms: u32, final_ms: u32) {
        self.transport.set_timer(intermediate_ms, final_ms)
    }

    fn get_timer(&mut self) -> TimerState {
        self.transport.get_timer()
    }

    fn random(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.bindings.random().fill(dest)
    }

    fn debug(&mut self, record: &DebugRecord<'_>) {
        self.bindings.logger().line_with(|| {
            format!(
                "{}/{}:{:04} [{}] : {}",
                self.engine,
                record.file,
                record.line,
                self.session_id,
                record.message.trim_end()
            )
        });
    }
}

/// Displays a transport result the way it is traced.
struct Outcome<'a>(&'a io::Result<usize>);

impl fmt::Display for Outcome<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Ok(n) => write!(f, "{}", n),
            Err(e) => write!(f, "error ({:?}): {}", e.kind(), e),
        }
    }
}
