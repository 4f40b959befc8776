use crate::console::{ConsoleHook, Interceptor};
use crate::error::{Error, Result};
use crate::state::{Change, Layout, LineKey, Store};
use crate::terminal::{Renderer, StdoutTerminal, Terminal};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// State shared between the caller's handle and the console hook.
struct Session<K, T> {
    layout: Layout,
    store: Store<K>,
    renderer: Renderer<T>,
    active: bool,
}

impl<K: LineKey, T: Terminal> Session<K, T> {
    fn start(&mut self) -> Result<()> {
        self.store = Store::new(self.layout);
        self.renderer.detach();
        if !self.store.is_empty() {
            self.renderer.redraw_all(self.store.lines())?;
        }
        self.active = true;
        Ok(())
    }

    fn update(&mut self, key: K, content: String) -> Result<()> {
        if !self.active {
            return Err(Error::NotStarted);
        }
        match self.store.update(key, content)? {
            Change::Unchanged => {}
            Change::Patch {
                screen_line,
                column,
            } => {
                let line = &self.store.lines()[screen_line];
                self.renderer.patch(line, column)?;
            }
            Change::Redraw => {
                self.renderer.redraw_all(self.store.lines())?;
                self.store.mark_clean();
            }
        }
        Ok(())
    }

    fn stop(&mut self) -> std::io::Result<()> {
        self.active = false;
        self.store = Store::new(self.layout);
        self.renderer.park()
    }

    fn clear_for_log(&mut self) -> std::io::Result<()> {
        if !self.active || self.store.is_dirty() {
            return Ok(());
        }
        self.store.mark_dirty();
        self.renderer.clear_block(self.store.len())
    }
}

impl<K, T> Interceptor for Mutex<Session<K, T>>
where
    K: LineKey + Send,
    T: Terminal,
{
    fn around_log(&self, forward: &mut dyn FnMut()) {
        // Held until the record is written, so no update lands between clear and text.
        let mut session = self.lock().unwrap_or_else(PoisonError::into_inner);
        // Nowhere to report this without recursing into the logger.
        let _ = session.clear_for_log();
        forward();
    }
}

/// A block of status lines pinned to the bottom of the terminal.
///
/// Log records passing through the [Console](crate::Console) whose hook the block
/// was started with scroll above it; the block is redrawn on the next update.
pub struct StatusBlock<K: LineKey, T: Terminal = StdoutTerminal> {
    session: Arc<Mutex<Session<K, T>>>,
    hook: Option<ConsoleHook>,
}

impl<K: LineKey> StatusBlock<K, StdoutTerminal> {
    /// A block on standard output.
    pub fn stdout(layout: Layout) -> Self {
        Self::new(StdoutTerminal::new(), layout)
    }
}

impl<K: LineKey, T: Terminal> StatusBlock<K, T> {
    pub fn new(terminal: T, layout: Layout) -> Self {
        Self {
            session: Arc::new(Mutex::new(Session {
                layout,
                store: Store::new(layout),
                renderer: Renderer::new(terminal),
                active: false,
            })),
            hook: None,
        }
    }

    /// `count` lines addressed by index.
    pub fn fixed(terminal: T, count: usize) -> Self {
        Self::new(terminal, Layout::Fixed(count))
    }

    /// Lines created on first update, stacked in insertion order.
    pub fn dynamic(terminal: T) -> Self {
        Self::new(terminal, Layout::Dynamic)
    }

    fn session(&self) -> MutexGuard<'_, Session<K, T>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sets the text of the line named by `key`, rendering only what changed.
    pub fn update(&mut self, key: K, content: impl Into<String>) -> Result<()> {
        self.session().update(key, content.into())
    }

    /// Stops intercepting and parks the cursor on the bottom row. The block's
    /// text stays on screen. Does nothing if the block is not started.
    pub fn stop(&mut self) {
        let Some(hook) = self.hook.take() else {
            return;
        };
        hook.uninstall();
        let parked = self.session().stop();
        match parked {
            Ok(()) => log::debug!("status block stopped"),
            Err(err) => log::warn!("failed to park cursor below status block: {err}"),
        }
    }

    pub fn is_active(&self) -> bool {
        self.session().active
    }

    /// Whether the next update redraws the whole block.
    pub fn is_dirty(&self) -> bool {
        self.session().store.is_dirty()
    }

    pub fn screen_line(&self, key: &K) -> Option<usize> {
        self.session().store.screen_line(key)
    }

    pub fn line_count(&self) -> usize {
        self.session().store.len()
    }
}

impl<K, T> StatusBlock<K, T>
where
    K: LineKey + Send + 'static,
    T: Terminal + 'static,
{
    /// Draws the blank block and starts intercepting records logged through `hook`.
    pub fn start(&mut self, hook: &ConsoleHook) -> Result<()> {
        if self.hook.is_some() {
            return Err(Error::AlreadyStarted);
        }
        // A record logged while another block owns the hook would disturb that block.
        if hook.is_installed() {
            return Err(Error::ConsoleBusy);
        }
        let layout = self.session().layout;
        log::debug!("starting status block with {layout:?}");

        hook.install(self.session.clone())?;
        if let Err(err) = self.session().start() {
            hook.uninstall();
            return Err(err);
        }
        self.hook = Some(hook.clone());
        Ok(())
    }
}

impl<K: LineKey, T: Terminal> Drop for StatusBlock<K, T> {
    fn drop(&mut self) {
        self.stop();
    }
}
