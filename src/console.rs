use crate::error::{Error, Result};
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::sync::{Arc, Mutex, PoisonError};

/// Something that wraps every log record on its way to the terminal.
pub trait Interceptor: Send + Sync {
    /// Must call `forward` exactly once. Nothing else may write to the terminal
    /// until it returns.
    fn around_log(&self, forward: &mut dyn FnMut());
}

/// The single slot through which a status block hooks into a [Console].
///
/// Clones share the slot. At most one interceptor is installed at a time.
#[derive(Clone, Default)]
pub struct ConsoleHook {
    slot: Arc<Mutex<Option<Arc<dyn Interceptor>>>>,
}

impl ConsoleHook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails with [Error::ConsoleBusy] rather than replacing an installed interceptor.
    pub fn install(&self, interceptor: Arc<dyn Interceptor>) -> Result<()> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return Err(Error::ConsoleBusy);
        }
        *slot = Some(interceptor);
        Ok(())
    }

    pub fn uninstall(&self) {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    pub fn is_installed(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn around_log(&self, forward: &mut dyn FnMut()) {
        // Release the slot before running the interceptor so it may uninstall itself.
        let interceptor = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match interceptor {
            Some(interceptor) => interceptor.around_log(forward),
            None => forward(),
        }
    }
}

/// A [Log] that hands each record to the wrapped logger through the installed
/// interceptor.
pub struct Console {
    inner: Box<dyn Log>,
    hook: ConsoleHook,
}

impl Console {
    pub fn new(inner: Box<dyn Log>) -> Self {
        Self {
            inner,
            hook: ConsoleHook::new(),
        }
    }

    pub fn hook(&self) -> ConsoleHook {
        self.hook.clone()
    }

    /// Registers this console as the process-wide logger.
    pub fn install(self, level: LevelFilter) -> std::result::Result<ConsoleHook, SetLoggerError> {
        let hook = self.hook();
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(hook)
    }
}

impl Log for Console {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if !self.inner.enabled(record.metadata()) {
            return;
        }
        self.hook.around_log(&mut || {
            self.inner.log(record);
            self.inner.flush();
        });
    }

    fn flush(&self) {
        self.inner.flush();
    }
}
