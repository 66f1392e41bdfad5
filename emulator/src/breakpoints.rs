use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BreakpointKind {
    Execution,
    Read,
    Write,
    Display,
}

// Asked on the hot path of both interpreters; implementations should be a
// cheap lookup.
pub trait BreakpointQuery: Send + Sync {
    fn test(&self, kind: BreakpointKind, addr: u16) -> bool;
}

pub struct NoBreakpoints;

impl BreakpointQuery for NoBreakpoints {
    fn test(&self, _kind: BreakpointKind, _addr: u16) -> bool {
        false
    }
}

// A plain set usable through a shared handle while the machine runs.
#[derive(Default)]
pub struct BreakpointSet {
    set: Mutex<HashSet<(BreakpointKind, u16)>>,
}

impl BreakpointSet {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add(&self, kind: BreakpointKind, addr: u16) {
        self.set.lock().unwrap().insert((kind, addr));
    }

    pub fn remove(&self, kind: BreakpointKind, addr: u16) {
        self.set.lock().unwrap().remove(&(kind, addr));
    }

    pub fn clear(&self) {
        self.set.lock().unwrap().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.set.lock().unwrap().is_empty()
    }
}

impl BreakpointQuery for BreakpointSet {
    fn test(&self, kind: BreakpointKind, addr: u16) -> bool {
        self.set.lock().unwrap().contains(&(kind, addr))
    }
}
