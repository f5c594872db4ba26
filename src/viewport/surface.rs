use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

/// Out-of-band notification that the host reclaimed a surface's context.
#[derive(Debug, Default)]
pub struct ContextLostEvent {
    default_prevented: Cell<bool>,
}

impl ContextLostEvent {
    /// Suppress the host's default restore attempt.
    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    /// Whether a listener suppressed the default restore.
    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

/// Registration token for a context-lost listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type ContextLostListener = Rc<dyn Fn(&ContextLostEvent)>;

struct SurfaceInner {
    label: String,
    next_listener: u64,
    listeners: BTreeMap<u64, ContextLostListener>,
    lost: bool,
    restore_pending: bool,
}

/// GPU-backed drawing surface owned by a [`super::resilient::ResilientViewport`].
///
/// Only the context-loss channel is modelled. Clones share the same surface.
#[derive(Clone)]
pub struct Surface {
    inner: Rc<RefCell<SurfaceInner>>,
}

impl Surface {
    /// Fresh surface with a live context.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SurfaceInner {
                label: label.into(),
                next_listener: 0,
                listeners: BTreeMap::new(),
                lost: false,
                restore_pending: false,
            })),
        }
    }

    /// Name used in logs.
    pub fn label(&self) -> String {
        self.inner.borrow().label.clone()
    }

    /// Register a listener for context loss.
    pub fn add_context_lost_listener(
        &self,
        listener: impl Fn(&ContextLostEvent) + 'static,
    ) -> ListenerId {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_listener;
        inner.next_listener += 1;
        inner.listeners.insert(id, Rc::new(listener));
        ListenerId(id)
    }

    /// Unregister a listener. Returns whether it was present.
    pub fn remove_context_lost_listener(&self, id: ListenerId) -> bool {
        self.inner.borrow_mut().listeners.remove(&id.0).is_some()
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Whether the context has been lost.
    pub fn is_lost(&self) -> bool {
        self.inner.borrow().lost
    }

    /// Whether the host will try to restore the context after a loss.
    pub fn restore_pending(&self) -> bool {
        self.inner.borrow().restore_pending
    }

    /// Simulate the host reclaiming the context. Listeners run in registration
    /// order; a second loss on the same surface is ignored.
    pub fn lose_context(&self) -> bool {
        let listeners: Vec<ContextLostListener> = {
            let mut inner = self.inner.borrow_mut();
            if inner.lost {
                return false;
            }
            inner.lost = true;
            inner.listeners.values().cloned().collect()
        };
        tracing::debug!(surface = %self.label(), listeners = listeners.len(), "context lost");
        let event = ContextLostEvent::default();
        for listener in listeners {
            listener(&event);
        }
        self.inner.borrow_mut().restore_pending = !event.default_prevented();
        true
    }
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Surface")
            .field("label", &inner.label)
            .field("listeners", &inner.listeners.len())
            .field("lost", &inner.lost)
            .finish()
    }
}
