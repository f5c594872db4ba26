use std::cell::Cell;
use std::rc::Rc;

/// Shared "owner is still mounted" flag.
///
/// Every scheduled continuation captures a clone and checks [`Liveness::is_alive`]
/// before touching component state. Cancellation is explicit: the owner calls
/// [`Liveness::kill`] on teardown.
#[derive(Clone, Debug)]
pub struct Liveness(Rc<Cell<bool>>);

impl Liveness {
    /// A live flag.
    pub fn new() -> Self {
        Self(Rc::new(Cell::new(true)))
    }

    /// Whether the owner is still mounted.
    pub fn is_alive(&self) -> bool {
        self.0.get()
    }

    /// Mark the owner as torn down. Returns whether this call changed the flag.
    pub fn kill(&self) -> bool {
        self.0.replace(false)
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}
