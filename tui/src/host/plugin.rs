use std::cell::RefCell;
use std::ops::Range;
use std::rc::Rc;
use std::rc::Weak;

use crossterm::event::KeyEvent;
use hanseg_protocol::DecorationRange;
use hanseg_protocol::Selection;
use hanseg_protocol::Transaction;

use super::Document;
use super::WordFallback;

/// Snapshot of host state passed explicitly into every plugin callback.
pub struct EditorContext<'a> {
    pub doc: &'a dyn Document,
    pub selection: &'a Selection,
    pub fallback: &'a dyn WordFallback,
}

/// Capabilities a plugin can contribute to the host.
///
/// Every callback is synchronous and side-effect free: it reads the snapshot it is given and
/// returns the transaction it wants dispatched, if any.
pub trait EditorPlugin {
    /// Claim a key press. Returning `Some` stops the host from running its own binding.
    fn on_key(&self, _cx: &EditorContext<'_>, _key: &KeyEvent) -> Option<Transaction> {
        None
    }

    /// Claim a double-click at document `offset`. Returning `Some` suppresses the host's default.
    fn on_double_click(&self, _cx: &EditorContext<'_>, _offset: usize) -> Option<Transaction> {
        None
    }

    /// Decorations for the given visible ranges.
    fn decorations(&self, _doc: &dyn Document, _visible: &[Range<usize>]) -> Vec<DecorationRange> {
        Vec::new()
    }
}

/// Dispatch order among registered plugins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    /// Consulted before every `Default` plugin and before the host's own bindings.
    Highest,
    Default,
}

struct Entry {
    id: u64,
    precedence: Precedence,
    plugin: Rc<dyn EditorPlugin>,
}

#[derive(Default)]
struct RegistryInner {
    next_id: u64,
    entries: Vec<Entry>,
}

/// Plugins registered with a host.
#[derive(Clone, Default)]
pub struct Registry {
    inner: Rc<RefCell<RegistryInner>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `plugin`; it stays active until the returned [`Disposer`] is disposed.
    pub fn register(&self, plugin: Rc<dyn EditorPlugin>, precedence: Precedence) -> Disposer {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.entries.push(Entry {
            id,
            precedence,
            plugin,
        });
        // Stable: registration order is kept within one precedence level.
        inner.entries.sort_by_key(|entry| entry.precedence);
        tracing::debug!(id, ?precedence, "registered editor plugin");
        Disposer {
            id,
            registry: Rc::downgrade(&self.inner),
        }
    }

    /// Registered plugins in dispatch order.
    pub fn plugins(&self) -> Vec<Rc<dyn EditorPlugin>> {
        self.inner
            .borrow()
            .entries
            .iter()
            .map(|entry| Rc::clone(&entry.plugin))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("plugins", &self.len())
            .finish()
    }
}

/// Handle returned by [`Registry::register`]. Dropping it keeps the plugin registered.
#[derive(Debug)]
#[must_use = "keep the disposer to be able to unregister the plugin"]
pub struct Disposer {
    id: u64,
    registry: Weak<RefCell<RegistryInner>>,
}

impl Disposer {
    /// Unregister the plugin. A no-op once the registry itself is gone.
    pub fn dispose(self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        registry
            .borrow_mut()
            .entries
            .retain(|entry| entry.id != self.id);
        tracing::debug!(id = self.id, "disposed editor plugin");
    }
}
