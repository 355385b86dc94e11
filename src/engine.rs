//! The contract between a [`Session`](crate::Session) and a DTLS engine.
//!
//! An engine is split the usual way into a configuration ([`EngineConfig`])
//! and a context ([`Engine`]). The session creates both, applies client
//! datagram defaults to the configuration, and binds it into the context with
//! [`Engine::setup`] right before the first handshake step.
//!
//! Everything the engine needs from the outside world during a driven call
//! (datagram I/O, timers, randomness, debug output) arrives as the
//! [`EngineIo`] argument of that call. The engine must not hold on to it.

use std::io;

use crate::{Code, TimerState};

/// Which side of the handshake the engine plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Client,
    Server,
}

/// Transport the engine frames records for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Stream,
    Datagram,
}

/// Named set of engine defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Default,
    SuiteB,
}

/// Peer verification requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Do not verify the peer.
    None,
    /// Verify the peer, but carry on if verification fails.
    Optional,
    /// Abort the handshake if the peer cannot be verified.
    Required,
}

/// Result of a single handshake step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeOutcome {
    /// The handshake is complete.
    Success,
    /// The engine needs incoming data before it can continue.
    WantRead,
    /// The engine could not flush outgoing data.
    WantWrite,
    /// The handshake failed.
    Fatal(Code),
}

impl HandshakeOutcome {
    /// Whether the step should simply be tried again.
    pub fn is_transient(&self) -> bool {
        matches!(self, HandshakeOutcome::WantRead | HandshakeOutcome::WantWrite)
    }

    /// The code the engine uses for this outcome.
    pub fn code<E: Engine>(&self) -> Code {
        match self {
            HandshakeOutcome::Success => Code(0),
            HandshakeOutcome::WantRead => E::WANT_READ,
            HandshakeOutcome::WantWrite => E::WANT_WRITE,
            HandshakeOutcome::Fatal(code) => *code,
        }
    }
}

/// A debug message emitted by the engine.
#[derive(Debug, Clone, Copy)]
pub struct DebugRecord<'a> {
    pub level: u8,
    pub file: &'a str,
    pub line: u32,
    pub message: &'a str,
}

/// Services the session lends to the engine for one driven call.
pub trait EngineIo {
    /// Send one datagram.
    fn send(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Receive one datagram into `buf`.
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Receive one datagram, waiting at most `timeout_ms` (0 waits forever).
    fn recv_timeout(&mut self, buf: &mut [u8], timeout_ms: u32) -> io::Result<usize>;

    /// Arm the retransmission timer. `final_ms == 0` cancels it.
    fn set_timer(&mut self, intermediate_ms: u32, final_ms: u32);

    /// Current retransmission timer state.
    fn get_timer(&mut self) -> TimerState;

    /// Fill `dest` with random bytes.
    fn random(&mut self, dest: &mut [u8]) -> Result<(), rand::Error>;

    /// Engine debug output.
    fn debug(&mut self, record: &DebugRecord<'_>);
}

/// Engine configuration.
///
/// Created with [`Default`] (uninitialized), then given defaults for an
/// endpoint, transport and preset. The caller may further adjust it until it
/// is bound into an [`Engine`] with [`Engine::setup`].
pub trait EngineConfig: Default {
    /// Load the defaults for the given role, transport and preset.
    fn defaults(
        &mut self,
        endpoint: Endpoint,
        transport: TransportKind,
        preset: Preset,
    ) -> Result<(), Code>;

    /// Set the peer verification requirement.
    fn set_auth_mode(&mut self, mode: AuthMode);

    /// Configure a preshared key and the identity sent with it.
    fn set_psk(&mut self, psk: &[u8], identity: &[u8]) -> Result<(), Code>;
}

/// A DTLS engine context.
pub trait Engine {
    /// Configuration type bound into this engine by [`Engine::setup`].
    type Config: EngineConfig;

    /// Short name used as prefix for debug output.
    const NAME: &'static str;

    /// Code returned when an operation would block waiting for input.
    const WANT_READ: Code;

    /// Code returned when an operation would block waiting for output.
    const WANT_WRITE: Code;

    /// Set the server name used for SNI and certificate verification.
    fn set_hostname(&mut self, hostname: &str) -> Result<(), Code>;

    /// Bind the configuration into the context.
    ///
    /// The engine keeps whatever it needs from `config`, the session does not
    /// promise to present the same value again.
    fn setup(&mut self, config: &Self::Config) -> Result<(), Code>;

    /// Advance the handshake as far as possible without blocking in the engine.
    fn handshake_step(&mut self, io: &mut dyn EngineIo) -> HandshakeOutcome;

    /// Read decrypted application data.
    fn read(&mut self, io: &mut dyn EngineIo, buf: &mut [u8]) -> Result<usize, Code>;

    /// Encrypt and send application data.
    fn write(&mut self, io: &mut dyn EngineIo, buf: &[u8]) -> Result<usize, Code>;

    /// Describe a result code.
    fn error_message(code: Code) -> String;
}
