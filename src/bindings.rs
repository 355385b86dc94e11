use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::{LogSink, Logger, RandomSource};

/// Random source and log sink shared by every session.
///
/// Build this once, before the first session, and hand the same `Arc` to each
/// [`Session`](crate::Session). It is read-only afterwards.
pub struct Bindings {
    random: Arc<dyn RandomSource>,
    logger: Logger,
    last_session_id: AtomicU64,
}

impl Bindings {
    /// Bind `random` and an optional `sink`.
    ///
    /// Writes `Initialized.` to the sink.
    pub fn initialize(
        random: Arc<dyn RandomSource>,
        sink: Option<Arc<dyn LogSink>>,
    ) -> Arc<Bindings> {
        BindingsBuilder { random, sink }.build()
    }

    /// Start building bindings around a random source.
    pub fn builder(random: impl RandomSource + 'static) -> BindingsBuilder {
        BindingsBuilder {
            random: Arc::new(random),
            sink: None,
        }
    }

    #[inline(always)]
    pub fn random(&self) -> &dyn RandomSource {
        &*self.random
    }

    #[inline(always)]
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub(crate) fn next_session_id(&self) -> u64 {
        self.last_session_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl std::fmt::Debug for Bindings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bindings")
            .field("logger", &self.logger)
            .field("last_session_id", &self.last_session_id)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Bindings`].
pub struct BindingsBuilder {
    random: Arc<dyn RandomSource>,
    sink: Option<Arc<dyn LogSink>>,
}

impl BindingsBuilder {
    /// Set the log sink.
    ///
    /// Without one, all logging is a no-op.
    pub fn log_sink(mut self, sink: impl LogSink + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Finish the bindings. Writes `Initialized.` to the sink.
    pub fn build(self) -> Arc<Bindings> {
        let bindings = Bindings {
            random: self.random,
            logger: Logger::new(self.sink),
            last_session_id: AtomicU64::new(0),
        };

        debug!("Bindings initialized, log sink: {}", bindings.logger.is_enabled());
        bindings.logger.line("Initialized.");

        Arc::new(bindings)
    }
}
