use serde::{Deserialize, Serialize};

/// Small integer identifying an object within one session's registry.
///
/// Handles are assigned in insertion order, stay stable across ticks for the
/// same underlying object, and are scoped to (session, collection-kind) —
/// they are never globally unique.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Handle(pub u32);

impl Handle {
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifies one connected session on the server side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionKey(pub u64);

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "session-{}", self.0)
    }
}
