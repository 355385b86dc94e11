//! dtls-bridge drives a DTLS engine over caller-supplied transport, timer and
//! randomness primitives.
//!
//! The engine itself (wire protocol, cryptography, retransmission timing) is
//! not part of this crate. It is plugged in through the [`Engine`] and
//! [`EngineConfig`] traits. What this crate provides is the part between the
//! engine and the application:
//!
//! * [`Bindings`]: the random source and optional log sink, set up once and
//!   shared by every session.
//! * [`Transport`]: the send, receive, timed receive and timer operations a
//!   caller hands to a session.
//! * [`Session`]: owns the engine, its configuration and the transport. It
//!   drives the handshake to completion and passes application data through.
//! * An instrumented shim between engine and transport that hex dumps every
//!   datagram to the log sink without changing what the engine observes.
//!
//! # Example
//!
//! ```ignore
//! use std::net::UdpSocket;
//! use dtls_bridge::{AuthMode, Bindings, LogForward, OsRandom, Session, UdpTransport};
//!
//! let bindings = Bindings::builder(OsRandom).log_sink(LogForward).build();
//!
//! let socket = UdpSocket::bind("0.0.0.0:0")?;
//! let transport = UdpTransport::connect(socket, "192.0.2.1:5684")?;
//!
//! // SomeEngine is any type implementing dtls_bridge::Engine.
//! let mut session: Session<SomeEngine, _> = Session::new(bindings, transport);
//! session.set_auth_mode(AuthMode::None);
//! session.set_psk(b"secret", b"client_identity")?;
//! session.handshake()?;
//!
//! session.write(b"hello")?;
//! let mut buf = [0; 1500];
//! let n = session.read(&mut buf)?;
//! session.free();
//! ```
#![forbid(unsafe_code)]
#![warn(clippy::all)]

#[macro_use]
extern crate log;

mod bindings;
pub use bindings::{Bindings, BindingsBuilder};

mod cancel;
pub use cancel::Cancel;

mod engine;
pub use engine::{AuthMode, DebugRecord, Endpoint, Engine, EngineConfig, EngineIo};
pub use engine::{HandshakeOutcome, Preset, TransportKind};

mod error;
pub use error::{error_message, write_error_message, Code, EngineError};

pub mod hexdump;

mod random;
pub use random::{OsRandom, RandomSource, SeededRandom};

mod session;
pub use session::Session;

mod shim;

mod sink;
pub use sink::{LogForward, LogSink, Logger};

mod timer;
pub use timer::DelayTimer;

mod transport;
pub use transport::{TimerState, Transport};

mod udp;
pub use udp::UdpTransport;
