use std::fmt;

/// Sequence number tagging a remote call so its completion can be matched to the state
/// that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic per-controller source of [`RequestId`]s.
#[derive(Debug, Clone, Default)]
pub struct RequestSequence {
    next: u64,
}

impl RequestSequence {
    pub fn next_id(&mut self) -> RequestId {
        self.next += 1;
        RequestId(self.next)
    }
}
