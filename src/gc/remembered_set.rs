//! Write-barrier buffer: records old-generation object addresses whose
//! fields were overwritten since the last minor collection, so those
//! objects can be treated as extra roots.

use crate::error::GcError;
use crate::gc::header::Word;

/// A bounded, duplicate-tolerant set of object addresses.
///
/// Per the design rationale in the write-barrier contract, the barrier is
/// kept branch-free and inserts unconditionally; the collector tolerates
/// duplicates because re-forwarding an already-forwarded object is
/// idempotent.
#[derive(Debug)]
pub struct RememberedSet {
    entries: Vec<Word>,
    capacity: usize,
}

impl RememberedSet {
    /// Create an empty set with the given capacity.
    pub fn new(capacity: usize) -> Self {
        RememberedSet {
            entries: Vec::with_capacity(capacity.min(64)),
            capacity,
        }
    }

    /// Record that `object`'s fields may now contain a pointer to a younger
    /// generation.
    pub fn insert(&mut self, object: Word) -> Result<(), GcError> {
        if self.entries.len() >= self.capacity {
            return Err(GcError::BarrierOverflow);
        }
        self.entries.push(object);
        Ok(())
    }

    /// Number of outstanding entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True iff the set holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove and return all entries, leaving the set empty. Called once per
    /// minor collection after every entry has been consumed; a major
    /// collection must not call this (the set is only cleared on minor, per
    /// the remembered-set contract), since its entries may still name
    /// old-to-young references a later minor collection still needs.
    pub fn drain(&mut self) -> Vec<Word> {
        std::mem::take(&mut self.entries)
    }

    /// Iterate the outstanding entries without consuming them. Used by a
    /// major collection, which must forward remembered objects' fields
    /// without clearing the set.
    pub fn iter(&self) -> impl Iterator<Item = Word> + '_ {
        self.entries.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_tolerates_duplicates() {
        let mut set = RememberedSet::new(4);
        set.insert(0x100).unwrap();
        set.insert(0x100).unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn insert_beyond_capacity_overflows() {
        let mut set = RememberedSet::new(1);
        set.insert(0x100).unwrap();
        assert_eq!(set.insert(0x200).unwrap_err(), GcError::BarrierOverflow);
    }

    #[test]
    fn drain_empties_the_set_and_returns_entries() {
        let mut set = RememberedSet::new(4);
        set.insert(0x100).unwrap();
        set.insert(0x200).unwrap();
        let drained = set.drain();
        assert_eq!(drained, vec![0x100, 0x200]);
        assert!(set.is_empty());
    }

    #[test]
    fn iter_leaves_entries_in_place() {
        let mut set = RememberedSet::new(4);
        set.insert(0x100).unwrap();
        set.insert(0x200).unwrap();
        let seen: Vec<Word> = set.iter().collect();
        assert_eq!(seen, vec![0x100, 0x200]);
        assert_eq!(set.len(), 2);
    }
}
