use std::collections::BTreeMap;
use std::sync::Arc;

use crate::types::Handle;

/// Matches a live, possibly-churning collection against a stable set of
/// handles across successive ticks.
///
/// Matching is by object identity (`Arc::ptr_eq`), never by value equality:
/// two structurally-equal but distinct objects never collapse to one handle.
/// Handles are allocated from a monotonic counter and never reused, so a
/// handle observed at tick T refers to the same underlying object at every
/// later tick it appears in.
pub struct HandleRegistry<W> {
    entries: BTreeMap<Handle, W>,
    next_handle: u32,
}

impl<W> Default for HandleRegistry<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> HandleRegistry<W> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_handle: 0,
        }
    }

    /// Reconciles the registry with the authoritative live collection for
    /// this tick.
    ///
    /// Objects already present keep their handle, newcomers are admitted
    /// under the next unused handle (in insertion order), and entries whose
    /// object is no longer present are dropped. `wrapped` projects an entry
    /// back to the object it wraps; `admit` builds a new entry for a
    /// newcomer.
    pub fn refresh<T: ?Sized>(
        &mut self,
        live: &[Arc<T>],
        wrapped: impl Fn(&W) -> &Arc<T>,
        mut admit: impl FnMut(Arc<T>) -> W,
    ) {
        let mut previous: Vec<(Handle, W)> = std::mem::take(&mut self.entries).into_iter().collect();
        for object in live {
            let matched = previous
                .iter()
                .position(|(_, entry)| Arc::ptr_eq(wrapped(entry), object));
            match matched {
                Some(index) => {
                    let (handle, entry) = previous.remove(index);
                    self.entries.insert(handle, entry);
                }
                None => {
                    let handle = Handle(self.next_handle);
                    self.next_handle += 1;
                    self.entries.insert(handle, admit(object.clone()));
                }
            }
        }
        // anything left in `previous` has departed and is dropped here
    }

    pub fn get(&self, handle: Handle) -> Option<&W> {
        self.entries.get(&handle)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut W> {
        self.entries.get_mut(&handle)
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.entries.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle, &W)> {
        self.entries.iter().map(|(handle, entry)| (*handle, entry))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle, &mut W)> {
        self.entries.iter_mut().map(|(handle, entry)| (*handle, entry))
    }
}
