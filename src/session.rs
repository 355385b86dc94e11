use std::fmt;
use std::sync::Arc;

use crate::shim::Instrumented;
use crate::{AuthMode, Bindings, Cancel, Code, Endpoint, Engine, EngineConfig, EngineError};
use crate::{HandshakeOutcome, Preset, Transport, TransportKind};

/// A client DTLS session over a caller-supplied [`Transport`].
///
/// The lifecycle is: [`Session::new`], any configuration calls,
/// [`Session::handshake`], any number of [`Session::read`] and
/// [`Session::write`], and finally [`Session::free`] (or drop).
///
/// All calls block for as long as the transport blocks.
pub struct Session<E: Engine, T: Transport> {
    // Fields drop in declaration order: configuration before context.
    config: E::Config,
    engine: E,
    transport: T,
    bindings: Arc<Bindings>,
    id: u64,
    /// Outcome of applying configuration defaults, reported by the handshake.
    defaults: Result<(), Code>,
    is_setup: bool,
}

impl<E, T> Session<E, T>
where
    E: Engine + Default,
    T: Transport,
{
    /// Create a client datagram session with a fresh engine.
    pub fn new(bindings: Arc<Bindings>, transport: T) -> Self {
        Self::with_engine(bindings, transport, E::default(), E::Config::default())
    }
}

impl<E: Engine, T: Transport> Session<E, T> {
    /// Create a client datagram session from an engine and configuration.
    ///
    /// The configuration gets client, datagram and default preset settings.
    /// Should that fail, the error is reported by [`Session::handshake`].
    pub fn with_engine(
        bindings: Arc<Bindings>,
        transport: T,
        engine: E,
        mut config: E::Config,
    ) -> Self {
        let id = bindings.next_session_id();
        bindings.logger().line_with(|| format!("Create [{}]", id));

        let defaults = config.defaults(Endpoint::Client, TransportKind::Datagram, Preset::Default);
        if let Err(code) = defaults {
            debug!("[{}] Configuration defaults failed: {}", id, code);
        }

        Session {
            config,
            engine,
            transport,
            bindings,
            id,
            defaults,
            is_setup: false,
        }
    }

    /// Identifies this session in log output.
    #[inline(always)]
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Attach this session's engine description to `code`.
    pub fn error(&self, code: Code) -> EngineError {
        EngineError::new::<E>(code)
    }

    /// Set the server name used for SNI and certificate verification.
    pub fn set_hostname(&mut self, hostname: &str) -> Result<(), Code> {
        self.engine.set_hostname(hostname)
    }

    /// Set the peer verification requirement.
    pub fn set_auth_mode(&mut self, mode: AuthMode) {
        self.config.set_auth_mode(mode);
    }

    /// Configure a preshared key and the identity sent with it.
    pub fn set_psk(&mut self, psk: &[u8], identity: &[u8]) -> Result<(), Code> {
        self.config.set_psk(psk, identity)
    }

    /// Run the handshake to completion.
    ///
    /// Want-read and want-write outcomes are retried immediately and without
    /// limit, so a transport that never delivers blocks here forever unless
    /// its timer makes the engine give up. Any other failure is returned as
    /// the engine reported it.
    pub fn handshake(&mut self) -> Result<(), Code> {
        self.drive_handshake(None)
    }

    /// Run the handshake until it completes, fails, or `cancel` is set.
    ///
    /// The flag is checked after every want-read or want-write step. A
    /// cancelled handshake returns [`Engine::WANT_READ`] or
    /// [`Engine::WANT_WRITE`] and can be resumed by calling this again.
    pub fn handshake_until(&mut self, cancel: &Cancel) -> Result<(), Code> {
        self.drive_handshake(Some(cancel))
    }

    fn drive_handshake(&mut self, cancel: Option<&Cancel>) -> Result<(), Code> {
        let logger = self.bindings.logger();
        logger.line("Handshake");

        self.defaults?;

        if !self.is_setup {
            if let Err(code) = self.engine.setup(&self.config) {
                debug!("[{}] Engine setup failed: {}", self.id, code);
                return Err(code);
            }
            self.is_setup = true;
        }

        let mut io = Instrumented::new(&mut self.transport, &self.bindings, E::NAME, self.id);
        let mut steps = 0_u64;

        let result = loop {
            let outcome = self.engine.handshake_step(&mut io);
            steps += 1;

            match outcome {
                HandshakeOutcome::Success => break Ok(()),
                HandshakeOutcome::Fatal(code) => break Err(code),
                HandshakeOutcome::WantRead | HandshakeOutcome::WantWrite => {
                    if cancel.map_or(false, |c| c.is_cancelled()) {
                        debug!("[{}] Handshake cancelled", self.id);
                        break Err(outcome.code::<E>());
                    }
                }
            }
        };

        debug!("[{}] Handshake done after {} steps: {:?}", self.id, steps, result);
        logger.line_with(|| format!("result={}", result.err().map_or(0, |c| c.value())));

        result
    }

    /// Encrypt and send application data.
    ///
    /// Engine codes, including want-write, are returned unchanged.
    pub fn write(&mut self, buf: &[u8]) -> Result<usize, Code> {
        let mut io = Instrumented::new(&mut self.transport, &self.bindings, E::NAME, self.id);
        self.engine.write(&mut io, buf)
    }

    /// Receive and decrypt application data.
    ///
    /// Engine codes, including want-read, are returned unchanged.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, Code> {
        let mut io = Instrumented::new(&mut self.transport, &self.bindings, E::NAME, self.id);
        self.engine.read(&mut io, buf)
    }

    /// Release the session.
    ///
    /// Equivalent to dropping it.
    pub fn free(self) {}
}

impl<E: Engine, T: Transport> Drop for Session<E, T> {
    fn drop(&mut self) {
        self.bindings
            .logger()
            .line_with(|| format!("Free [{}]", self.id));
    }
}

impl<E: Engine, T: Transport> fmt::Debug for Session<E, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("engine", &E::NAME)
            .field("id", &self.id)
            .field("defaults", &self.defaults)
            .field("is_setup", &self.is_setup)
            .finish()
    }
}
