//! Engines, transports and sinks shared by the integration tests.

#![allow(unused)]

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use dtls_bridge::{AuthMode, Bindings, Code, DebugRecord, DelayTimer, Endpoint, Engine};
use dtls_bridge::{EngineConfig, EngineIo, HandshakeOutcome, LogSink, Preset, SeededRandom};
use dtls_bridge::{TimerState, Transport, TransportKind};
use zeroize::Zeroizing;

pub const WANT_READ: Code = Code(-0x6900);
pub const WANT_WRITE: Code = Code(-0x6880);
pub const TIMEOUT: Code = Code(-0x6800);
pub const BAD_INPUT_DATA: Code = Code(-0x7100);
pub const NO_RNG: Code = Code(-0x7400);
pub const FATAL_ALERT: Code = Code(-0x7780);
pub const BAD_CONFIG: Code = Code(-0x5e80);
pub const SEND_FAILED: Code = Code(-0x004e);
pub const RECV_FAILED: Code = Code(-0x004c);

fn describe(code: Code) -> String {
    let text = match code {
        Code(0) => "no error",
        WANT_READ => "SSL - Connection requires a read call",
        WANT_WRITE => "SSL - Connection requires a write call",
        TIMEOUT => "SSL - The operation timed out",
        BAD_INPUT_DATA => "SSL - Bad input parameters to function",
        NO_RNG => "SSL - No RNG was provided to the SSL module",
        FATAL_ALERT => "SSL - A fatal alert message was received from our peer",
        BAD_CONFIG => "SSL - Invalid value in SSL config",
        SEND_FAILED => "NET - Sending information through the socket failed",
        RECV_FAILED => "NET - Reading information from the socket failed",
        _ => return format!("UNKNOWN ERROR CODE ({:04X})", code.value().unsigned_abs()),
    };
    text.to_string()
}

/// Records construction and release of engines and configurations.
#[derive(Debug, Clone, Default)]
pub struct Tracker(Arc<Mutex<Vec<&'static str>>>);

impl Tracker {
    fn push(&self, event: &'static str) {
        self.0.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().clone()
    }

    /// Instances created but not yet dropped.
    pub fn live(&self) -> isize {
        self.events()
            .iter()
            .map(|e| if e.ends_with('+') { 1 } else { -1 })
            .sum()
    }
}

/// What the engine saw in the configuration at setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub defaults: Option<(Endpoint, TransportKind, Preset)>,
    pub auth_mode: Option<AuthMode>,
    pub psk_identity: Option<Vec<u8>>,
}

#[derive(Default)]
pub struct TestConfig {
    pub reject_defaults: bool,
    pub defaults: Option<(Endpoint, TransportKind, Preset)>,
    pub auth_mode: Option<AuthMode>,
    pub psk: Option<(Zeroizing<Vec<u8>>, Vec<u8>)>,
    tracker: Option<Tracker>,
}

impl TestConfig {
    pub fn tracked(tracker: &Tracker) -> Self {
        tracker.push("config+");
        let mut config = Self::default();
        config.tracker = Some(tracker.clone());
        config
    }

    pub fn rejecting_defaults() -> Self {
        let mut config = Self::default();
        config.reject_defaults = true;
        config
    }

    fn settings(&self) -> Settings {
        Settings {
            defaults: self.defaults,
            auth_mode: self.auth_mode,
            psk_identity: self.psk.as_ref().map(|(_, identity)| identity.clone()),
        }
    }
}

impl Drop for TestConfig {
    fn drop(&mut self) {
        if let Some(t) = &self.tracker {
            t.push("config-");
        }
    }
}

impl EngineConfig for TestConfig {
    fn defaults(
        &mut self,
        endpoint: Endpoint,
        transport: TransportKind,
        preset: Preset,
    ) -> Result<(), Code> {
        if self.reject_defaults {
            return Err(BAD_CONFIG);
        }
        self.defaults = Some((endpoint, transport, preset));
        Ok(())
    }

    fn set_auth_mode(&mut self, mode: AuthMode) {
        self.auth_mode = Some(mode);
    }

    fn set_psk(&mut self, psk: &[u8], identity: &[u8]) -> Result<(), Code> {
        if psk.is_empty() || psk.len() > 32 || identity.is_empty() {
            return Err(BAD_INPUT_DATA);
        }
        self.psk = Some((Zeroizing::new(psk.to_vec()), identity.to_vec()));
        Ok(())
    }
}

/// Plaintext stand-in for a DTLS engine.
///
/// The handshake sends one hello (with 32 random bytes) and completes on the
/// first datagram received. Records are passed through unchanged.
#[derive(Default)]
pub struct EchoEngine {
    pub hostname: Option<String>,
    pub settings: Option<Settings>,
    pub setup_calls: usize,
    pub steps: usize,
    pub hello_sent: bool,
    /// Receive with this timeout during the handshake instead of plain recv.
    pub recv_timeout_ms: Option<u32>,
    tracker: Option<Tracker>,
}

impl EchoEngine {
    pub fn tracked(tracker: &Tracker) -> Self {
        tracker.push("engine+");
        let mut engine = Self::default();
        engine.tracker = Some(tracker.clone());
        engine
    }

    pub fn with_recv_timeout(timeout_ms: u32) -> Self {
        let mut engine = Self::default();
        engine.recv_timeout_ms = Some(timeout_ms);
        engine
    }
}

impl Drop for EchoEngine {
    fn drop(&mut self) {
        if let Some(t) = &self.tracker {
            t.push("engine-");
        }
    }
}

impl Engine for EchoEngine {
    type Config = TestConfig;

    const NAME: &'static str = "echo";
    const WANT_READ: Code = WANT_READ;
    const WANT_WRITE: Code = WANT_WRITE;

    fn set_hostname(&mut self, hostname: &str) -> Result<(), Code> {
        if hostname.len() > 255 {
            return Err(BAD_INPUT_DATA);
        }
        self.hostname = Some(hostname.to_string());
        Ok(())
    }

    fn setup(&mut self, config: &TestConfig) -> Result<(), Code> {
        self.setup_calls += 1;
        if config.defaults.is_none() {
            return Err(BAD_CONFIG);
        }
        self.settings = Some(config.settings());
        Ok(())
    }

    fn handshake_step(&mut self, io: &mut dyn EngineIo) -> HandshakeOutcome {
        self.steps += 1;

        if !self.hello_sent {
            let mut random = [0; 32];
            if io.random(&mut random).is_err() {
                return HandshakeOutcome::Fatal(NO_RNG);
            }

            io.debug(&DebugRecord {
                level: 2,
                file: "echo.rs",
                line: 7,
                message: "=> write client hello",
            });

            let mut hello = b"HELLO".to_vec();
            hello.extend_from_slice(&random);

            match io.send(&hello) {
                Ok(_) => self.hello_sent = true,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    return HandshakeOutcome::WantWrite
                }
                Err(_) => return HandshakeOutcome::Fatal(SEND_FAILED),
            }

            io.set_timer(1000, 4000);
        }

        let mut buf = [0; 256];
        let received = match self.recv_timeout_ms {
            Some(ms) => io.recv_timeout(&mut buf, ms),
            None => io.recv(&mut buf),
        };

        match received {
            Ok(_) => {
                io.set_timer(0, 0);
                HandshakeOutcome::Success
            }
            Err(e)
                if e.kind() == io::ErrorKind::WouldBlock || e.kind() == io::ErrorKind::TimedOut =>
            {
                if io.get_timer() == TimerState::FinalExpired {
                    HandshakeOutcome::Fatal(TIMEOUT)
                } else {
                    HandshakeOutcome::WantRead
                }
            }
            Err(_) => HandshakeOutcome::Fatal(RECV_FAILED),
        }
    }

    fn read(&mut self, io: &mut dyn EngineIo, buf: &mut [u8]) -> Result<usize, Code> {
        match io.recv(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Err(WANT_READ),
            Err(_) => Err(RECV_FAILED),
        }
    }

    fn write(&mut self, io: &mut dyn EngineIo, buf: &[u8]) -> Result<usize, Code> {
        match io.send(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Err(WANT_WRITE),
            Err(_) => Err(SEND_FAILED),
        }
    }

    fn error_message(code: Code) -> String {
        describe(code)
    }
}

/// Engine replaying a fixed sequence of handshake outcomes.
pub struct ScriptedEngine {
    pub script: VecDeque<HandshakeOutcome>,
    /// Outcome once the script is exhausted.
    pub then: HandshakeOutcome,
    pub setup_result: Result<(), Code>,
    pub setup_calls: usize,
    pub steps: Arc<AtomicUsize>,
}

impl ScriptedEngine {
    pub fn new(script: impl IntoIterator<Item = HandshakeOutcome>, then: HandshakeOutcome) -> Self {
        Self {
            script: script.into_iter().collect(),
            then,
            setup_result: Ok(()),
            setup_calls: 0,
            steps: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn steps(&self) -> usize {
        self.steps.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new([], HandshakeOutcome::Success)
    }
}

impl Engine for ScriptedEngine {
    type Config = TestConfig;

    const NAME: &'static str = "scripted";
    const WANT_READ: Code = WANT_READ;
    const WANT_WRITE: Code = WANT_WRITE;

    fn set_hostname(&mut self, _hostname: &str) -> Result<(), Code> {
        Ok(())
    }

    fn setup(&mut self, _config: &TestConfig) -> Result<(), Code> {
        self.setup_calls += 1;
        self.setup_result
    }

    fn handshake_step(&mut self, _io: &mut dyn EngineIo) -> HandshakeOutcome {
        self.steps.fetch_add(1, Ordering::SeqCst);
        self.script.pop_front().unwrap_or(self.then)
    }

    fn read(&mut self, _io: &mut dyn EngineIo, _buf: &mut [u8]) -> Result<usize, Code> {
        Err(WANT_READ)
    }

    fn write(&mut self, _io: &mut dyn EngineIo, buf: &[u8]) -> Result<usize, Code> {
        Ok(buf.len())
    }

    fn error_message(code: Code) -> String {
        describe(code)
    }
}

/// In-memory transport with queued incoming datagrams.
#[derive(Debug, Default)]
pub struct StubTransport {
    pub incoming: VecDeque<Vec<u8>>,
    pub sent: Vec<Vec<u8>>,
    pub recv_calls: usize,
    pub recv_timeouts: Vec<u32>,
    /// Report at most this many bytes as sent.
    pub send_limit: Option<usize>,
    pub fail_send: Option<io::ErrorKind>,
    pub timer: DelayTimer,
    pub timer_sets: Vec<(u32, u32)>,
    /// Report this instead of the real timer state.
    pub timer_state: Option<TimerState>,
}

impl StubTransport {
    pub fn with_incoming(datagrams: impl IntoIterator<Item = Vec<u8>>) -> Self {
        Self {
            incoming: datagrams.into_iter().collect(),
            ..Default::default()
        }
    }

    fn pop(&mut self, buf: &mut [u8], empty: io::ErrorKind) -> io::Result<usize> {
        let datagram = self.incoming.pop_front().ok_or(empty)?;
        let n = datagram.len().min(buf.len());
        buf[..n].copy_from_slice(&datagram[..n]);
        Ok(n)
    }
}

impl Transport for StubTransport {
    fn send(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(kind) = self.fail_send {
            return Err(kind.into());
        }
        self.sent.push(buf.to_vec());
        Ok(self.send_limit.map_or(buf.len(), |l| l.min(buf.len())))
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.recv_calls += 1;
        self.pop(buf, io::ErrorKind::WouldBlock)
    }

    fn recv_timeout(&mut self, buf: &mut [u8], timeout_ms: u32) -> io::Result<usize> {
        self.recv_timeouts.push(timeout_ms);
        self.pop(buf, io::ErrorKind::TimedOut)
    }

    fn set_timer(&mut self, intermediate_ms: u32, final_ms: u32) {
        self.timer_sets.push((intermediate_ms, final_ms));
        self.timer.set(intermediate_ms, final_ms);
    }

    fn get_timer(&self) -> TimerState {
        self.timer_state.unwrap_or_else(|| self.timer.state())
    }
}

/// Sink collecting everything written to it.
#[derive(Debug, Clone, Default)]
pub struct Capture(Arc<Mutex<String>>);

impl Capture {
    pub fn text(&self) -> String {
        self.0.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

impl LogSink for Capture {
    fn write(&self, text: &str) {
        self.0.lock().unwrap().push_str(text);
    }
}

/// Bindings with a seeded random source, logging into `capture`.
pub fn bindings(capture: &Capture) -> Arc<Bindings> {
    Bindings::builder(SeededRandom::new(42))
        .log_sink(capture.clone())
        .build()
}

/// Bindings with a seeded random source and no log sink.
pub fn silent_bindings() -> Arc<Bindings> {
    Bindings::builder(SeededRandom::new(42)).build()
}
