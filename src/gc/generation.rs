//! Forwarding, chase, and the per-pass scanning primitives a collection is
//! built from.
//!
//! These are free functions, not methods on a generation type: a collection
//! pass always needs two *distinct* regions borrowed simultaneously (the
//! `from` being vacated and the `to` being filled), plus the root registry
//! and remembered set. Keeping them free functions taking disjoint
//! `&self.field` arguments lets `Collector::collect_minor`/`collect_major`
//! borrow those fields directly without fighting the borrow checker through
//! a layer of helper methods.

use crate::error::GcError;
use crate::gc::header::{self, HeapValue, Word};
use crate::gc::region::Region;
use crate::gc::roots::RootRegistry;

/// True iff `ptr`'s forwarding slot (its field 0) already points into `to`.
/// Reading field 0 of an object outside `from` is never attempted by
/// callers of this function.
fn already_forwarded(ptr: Word, to: &Region) -> Option<Word> {
    let field0 = unsafe { header::read_field(ptr, 0) };
    if to.contains(field0) { Some(field0) } else { None }
}

/// Return the address `p` should now denote, copying its reachable subgraph
/// from `from` into `to` if this is the first time it's been forwarded
/// during this pass.
///
/// A pointer not in `from` (an older-generation pointer, or an opaque
/// non-pointer word) is returned unchanged.
pub fn forward<H: HeapValue>(p: Word, from: &Region, to: &mut Region) -> Result<Word, GcError> {
    if !from.contains(p) {
        return Ok(p);
    }
    #[cfg(debug_assertions)]
    {
        let (_, field_count) = H::decode(unsafe { header::read_header(p) });
        debug_assert!(
            field_count >= 1,
            "object at {p:#x} has zero fields; the field[0]-overlay forwarding \
             representation overwrites field 0 as the forwarding slot, so every \
             object reachable by pointer must declare at least one field"
        );
    }
    if let Some(forwarded) = already_forwarded(p, to) {
        return Ok(forwarded);
    }
    chase::<H>(p, from, to)?;
    Ok(unsafe { header::read_field(p, 0) })
}

/// Iteratively copy `p` and a chain of its unforwarded descendants from
/// `from` into `to`, installing a forwarding address in each source
/// object's field 0 as it is copied.
///
/// Only one unforwarded child per object is followed eagerly (the last one
/// encountered while copying fields); the rest are discovered later when
/// the Cheney scan visits the freshly copied object in `to`. Correctness
/// does not depend on which child is chosen, only on every forwarding
/// address being installed before that object's children are followed,
/// which is what makes cycles safe.
fn chase<H: HeapValue>(mut p: Word, from: &Region, to: &mut Region) -> Result<(), GcError> {
    loop {
        let header_word = unsafe { header::read_header(p) };
        let (_, field_count) = H::decode(header_word);
        let size = header::object_size(field_count);
        let q = to.try_bump(size).ok_or(GcError::PromotionFailed)?;

        unsafe { header::write_header(q, header_word) };
        let mut next_unforwarded: Option<Word> = None;
        for i in 0..field_count {
            let value = unsafe { header::read_field(p, i) };
            unsafe { header::write_field(q, i, value) };
            if from.contains(value) && already_forwarded(value, to).is_none() {
                next_unforwarded = Some(value);
            }
        }

        unsafe { header::write_field(p, 0, q) };

        match next_unforwarded {
            Some(r) => p = r,
            None => return Ok(()),
        }
    }
}

/// Forward every registered root in place.
pub fn forward_roots<H: HeapValue>(
    roots: &RootRegistry,
    from: &Region,
    to: &mut Region,
) -> Result<(), GcError> {
    for &slot in roots.iter() {
        let value = unsafe { *slot };
        let new_value = forward::<H>(value, from, to)?;
        unsafe {
            *slot = new_value;
        }
    }
    Ok(())
}

/// Forward every field of the single object based at `obj` (used for
/// remembered-set entries, which name objects rather than slots).
pub fn forward_object_fields<H: HeapValue>(
    obj: Word,
    from: &Region,
    to: &mut Region,
) -> Result<(), GcError> {
    let header_word = unsafe { header::read_header(obj) };
    let (_, field_count) = H::decode(header_word);
    for i in 0..field_count {
        let value = unsafe { header::read_field(obj, i) };
        let new_value = forward::<H>(value, from, to)?;
        unsafe { header::write_field(obj, i, new_value) };
    }
    Ok(())
}

/// Walk every live object in `[region.base_addr(), region.next_addr())` as
/// it stood when the walk began, forwarding each of its fields.
///
/// Used to honor cross-generation references from a younger generation into
/// the generation currently being major-collected (step 3 of a collection
/// pass): the younger region itself is not being collected, so its own
/// `next` does not move during this walk.
pub fn walk_and_forward_fields<H: HeapValue>(
    region: &Region,
    from: &Region,
    to: &mut Region,
) -> Result<(), GcError> {
    let mut cursor = region.base_addr();
    let end = region.next_addr();
    while cursor < end {
        let header_word = unsafe { header::read_header(cursor) };
        let (_, field_count) = H::decode(header_word);
        forward_object_fields::<H>(cursor, from, to)?;
        cursor += header::object_size(field_count);
    }
    Ok(())
}

/// The Cheney scan: starting at `scan`, interpret newly copied objects in
/// `to` and forward their fields, advancing as `to.next_addr()` grows from
/// further copying. Terminates when `scan` catches up with `to`'s cursor,
/// i.e. no new object was produced by the last round of forwarding.
pub fn cheney_scan<H: HeapValue>(
    mut scan: Word,
    from: &Region,
    to: &mut Region,
) -> Result<(), GcError> {
    while scan < to.next_addr() {
        let header_word = unsafe { header::read_header(scan) };
        let (_, field_count) = H::decode(header_word);
        for i in 0..field_count {
            let value = unsafe { header::read_field(scan, i) };
            let new_value = forward::<H>(value, from, to)?;
            unsafe { header::write_field(scan, i, new_value) };
        }
        scan += header::object_size(field_count);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gc::header::TaggedObject;

    /// Allocate and initialize a `field_count`-field object directly in
    /// `region`, for building object graphs without going through a
    /// `Collector`.
    fn make_object(region: &mut Region, field_count: usize, fields: &[Word]) -> Word {
        assert_eq!(fields.len(), field_count);
        let addr = region
            .try_bump(header::object_size(field_count))
            .expect("room for test object");
        unsafe {
            header::write_header(addr, TaggedObject::encode(0, field_count));
            for (i, &value) in fields.iter().enumerate() {
                header::write_field(addr, i, value);
            }
        }
        addr
    }

    #[test]
    fn forward_of_non_heap_pointer_is_identity() {
        let from = Region::new(64, "from").unwrap();
        let mut to = Region::new(64, "to").unwrap();
        assert_eq!(forward::<TaggedObject>(0xdead, &from, &mut to).unwrap(), 0xdead);
    }

    #[test]
    fn forward_copies_an_object_and_is_idempotent() {
        let mut from = Region::new(64, "from").unwrap();
        let mut to = Region::new(64, "to").unwrap();
        let obj = make_object(&mut from, 1, &[0]);

        let first = forward::<TaggedObject>(obj, &from, &mut to).unwrap();
        let second = forward::<TaggedObject>(obj, &from, &mut to).unwrap();
        assert_eq!(first, second);
        assert!(to.contains(first));
    }

    #[test]
    fn chase_follows_a_linear_chain() {
        let mut from = Region::new(64, "from").unwrap();
        let mut to = Region::new(64, "to").unwrap();
        let c = make_object(&mut from, 1, &[0]);
        let b = make_object(&mut from, 1, &[c]);
        let a = make_object(&mut from, 1, &[b]);

        let a_new = forward::<TaggedObject>(a, &from, &mut to).unwrap();
        let b_new = unsafe { header::read_field(a_new, 0) };
        let c_new = unsafe { header::read_field(b_new, 0) };
        assert!(to.contains(b_new));
        assert!(to.contains(c_new));
        assert_eq!(unsafe { header::read_field(c_new, 0) }, 0);
    }

    #[test]
    fn chase_preserves_a_cycle() {
        let mut from = Region::new(64, "from").unwrap();
        let mut to = Region::new(64, "to").unwrap();
        let x = make_object(&mut from, 1, &[0]);
        let y = make_object(&mut from, 1, &[x]);
        unsafe { header::write_field(x, 0, y) };

        let x_new = forward::<TaggedObject>(x, &from, &mut to).unwrap();
        let y_new = unsafe { header::read_field(x_new, 0) };
        let x_new_again = unsafe { header::read_field(y_new, 0) };
        assert_eq!(x_new, x_new_again);
        assert_eq!(to.used(), header::object_size(1) * 2);
    }

    #[test]
    fn chase_copies_shared_substructure_once() {
        let mut from = Region::new(64, "from").unwrap();
        let mut to = Region::new(64, "to").unwrap();
        let s = make_object(&mut from, 1, &[0]);
        let a = make_object(&mut from, 1, &[s]);
        let b = make_object(&mut from, 1, &[s]);

        let a_new = forward::<TaggedObject>(a, &from, &mut to).unwrap();
        let b_new = forward::<TaggedObject>(b, &from, &mut to).unwrap();
        let s_from_a = unsafe { header::read_field(a_new, 0) };
        let s_from_b = unsafe { header::read_field(b_new, 0) };
        assert_eq!(s_from_a, s_from_b);
    }

    #[test]
    fn chase_reports_promotion_failure_without_panicking() {
        let mut from = Region::new(64, "from").unwrap();
        let mut to = Region::new(8, "to").unwrap();
        let a = make_object(&mut from, 2, &[0, 0]);
        assert_eq!(
            forward::<TaggedObject>(a, &from, &mut to).unwrap_err(),
            GcError::PromotionFailed
        );
    }
}
