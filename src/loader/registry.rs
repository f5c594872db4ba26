use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::foundation::error::FolioError;

/// Identity of a code-split module. Loads are deduplicated on this key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct ModuleId(String);

impl ModuleId {
    /// Module id from its name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The module name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Coarse load status, for snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPhase {
    /// Never requested, or the last fetch was cancelled.
    Idle,
    /// Fetch started, not settled yet.
    InFlight,
    /// Module available.
    Resolved,
    /// Fetch rejected; cached.
    Failed,
}

/// What a waiter receives once a load settles.
pub enum LoadOutcome<M> {
    /// The resolved module.
    Ready(Rc<M>),
    /// The load was rejected.
    Failed {
        /// Module that failed.
        module: ModuleId,
        /// Rejection reason reported by the fetch.
        reason: String,
    },
}

impl<M> LoadOutcome<M> {
    /// The module-load fault for a failed outcome, `None` when ready.
    pub fn to_error(&self) -> Option<FolioError> {
        match self {
            Self::Ready(_) => None,
            Self::Failed { module, reason } => {
                Some(FolioError::module_load(module.as_str(), reason.as_str()))
            }
        }
    }
}

type Waiter<M> = Box<dyn FnOnce(&LoadOutcome<M>)>;

enum Entry<M> {
    InFlight(Vec<Waiter<M>>),
    Resolved(Rc<M>),
    Failed(String),
}

struct RegistryInner<M> {
    entries: HashMap<ModuleId, Entry<M>>,
    fetches: HashMap<ModuleId, u32>,
}

/// Asynchronously resolved modules, keyed by [`ModuleId`].
///
/// A module is fetched at most once per registry: later requests join the
/// in-flight load or receive the settled result. Failures are cached too, so a
/// failed module is not refetched by a remount.
pub struct ModuleRegistry<M> {
    inner: Rc<RefCell<RegistryInner<M>>>,
}

impl<M> Clone for ModuleRegistry<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<M: 'static> Default for ModuleRegistry<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: 'static> ModuleRegistry<M> {
    /// Empty registry.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(RegistryInner {
                entries: HashMap::new(),
                fetches: HashMap::new(),
            })),
        }
    }

    /// Ask for `id`. `fetch` runs only if nothing is known about the module
    /// yet; `waiter` runs once the load settles (immediately if it already has).
    pub fn request(
        &self,
        id: &ModuleId,
        fetch: impl FnOnce(Completer<M>),
        waiter: impl FnOnce(&LoadOutcome<M>) + 'static,
    ) {
        let mut inner = self.inner.borrow_mut();
        if !inner.entries.contains_key(id) {
            inner
                .entries
                .insert(id.clone(), Entry::InFlight(vec![Box::new(waiter)]));
            *inner.fetches.entry(id.clone()).or_insert(0) += 1;
            drop(inner);
            tracing::debug!(module = %id, "fetching deferred module");
            fetch(Completer {
                registry: Rc::downgrade(&self.inner),
                id: id.clone(),
                done: false,
            });
            return;
        }
        let settled = match inner.entries.get_mut(id) {
            Some(Entry::InFlight(waiters)) => {
                tracing::debug!(module = %id, "joined in-flight module load");
                waiters.push(Box::new(waiter));
                return;
            }
            Some(Entry::Resolved(module)) => LoadOutcome::Ready(Rc::clone(module)),
            Some(Entry::Failed(reason)) => LoadOutcome::Failed {
                module: id.clone(),
                reason: reason.clone(),
            },
            None => return,
        };
        drop(inner);
        waiter(&settled);
    }

    /// Load status of `id`.
    pub fn phase(&self, id: &ModuleId) -> LoadPhase {
        match self.inner.borrow().entries.get(id) {
            None => LoadPhase::Idle,
            Some(Entry::InFlight(_)) => LoadPhase::InFlight,
            Some(Entry::Resolved(_)) => LoadPhase::Resolved,
            Some(Entry::Failed(_)) => LoadPhase::Failed,
        }
    }

    /// The resolved module, if any.
    pub fn get(&self, id: &ModuleId) -> Option<Rc<M>> {
        match self.inner.borrow().entries.get(id) {
            Some(Entry::Resolved(module)) => Some(Rc::clone(module)),
            _ => None,
        }
    }

    /// How many times the fetch for `id` was started.
    pub fn fetch_count(&self, id: &ModuleId) -> u32 {
        self.inner
            .borrow()
            .fetches
            .get(id)
            .copied()
            .unwrap_or(0)
    }

    /// Modules currently being fetched.
    pub fn in_flight(&self) -> Vec<ModuleId> {
        let mut out: Vec<ModuleId> = self
            .inner
            .borrow()
            .entries
            .iter()
            .filter(|(_, e)| matches!(e, Entry::InFlight(_)))
            .map(|(id, _)| id.clone())
            .collect();
        out.sort();
        out
    }
}

/// Single-use completion handle passed to a module fetch.
///
/// Dropping it without completing rejects the load. Use [`Completer::cancel`]
/// to abandon a fetch during teardown instead.
pub struct Completer<M: 'static> {
    registry: Weak<RefCell<RegistryInner<M>>>,
    id: ModuleId,
    done: bool,
}

impl<M: 'static> Completer<M> {
    /// Module this fetch is for.
    pub fn module(&self) -> &ModuleId {
        &self.id
    }

    /// Settle the load with `module` and wake every waiter.
    pub fn resolve(mut self, module: M) {
        self.settle(Ok(module));
    }

    /// Settle the load as failed; the failure is cached.
    pub fn reject(mut self, reason: impl Into<String>) {
        self.settle(Err(reason.into()));
    }

    /// Abandon the fetch without settling it.
    ///
    /// Waiters are dropped uncalled and the module returns to
    /// [`LoadPhase::Idle`], so a later request fetches again.
    pub fn cancel(mut self) {
        self.done = true;
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let dropped = {
            let mut inner = registry.borrow_mut();
            match inner.entries.get(&self.id) {
                Some(Entry::InFlight(_)) => inner.entries.remove(&self.id),
                _ => None,
            }
        };
        if dropped.is_some() {
            tracing::debug!(module = %self.id, "module fetch cancelled");
        }
    }

    fn settle(&mut self, result: Result<M, String>) {
        if self.done {
            return;
        }
        self.done = true;
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let (waiters, outcome) = {
            let mut inner = registry.borrow_mut();
            let Some(entry) = inner.entries.get_mut(&self.id) else {
                return;
            };
            let Entry::InFlight(waiters) = entry else {
                return;
            };
            let waiters = std::mem::take(waiters);
            let outcome = match result {
                Ok(module) => {
                    let module = Rc::new(module);
                    *entry = Entry::Resolved(Rc::clone(&module));
                    LoadOutcome::Ready(module)
                }
                Err(reason) => {
                    tracing::warn!(module = %self.id, %reason, "deferred module failed to load");
                    *entry = Entry::Failed(reason.clone());
                    LoadOutcome::Failed {
                        module: self.id.clone(),
                        reason,
                    }
                }
            };
            (waiters, outcome)
        };
        for waiter in waiters {
            waiter(&outcome);
        }
    }
}

impl<M: 'static> Drop for Completer<M> {
    fn drop(&mut self) {
        if !self.done {
            self.settle(Err("loader dropped without completing".to_owned()));
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/loader/registry.rs"]
mod tests;
