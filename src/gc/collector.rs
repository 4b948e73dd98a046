//! The collector driver: allocation policy, barriers, root registration, and
//! the two stats/debug printers.

use std::marker::PhantomData;

use crate::config::CollectorConfig;
use crate::error::GcError;
use crate::gc::generation;
use crate::gc::header::{self, HeapValue, Word};
use crate::gc::region::Region;
use crate::gc::remembered_set::RememberedSet;
use crate::gc::roots::RootRegistry;
use crate::gc::stats::GcStats;

/// A precise, generational, moving garbage collector.
///
/// `H` is the embedder's header codec (see [`HeapValue`]); the collector is
/// otherwise fully generic over the objects it manages.
///
/// Owns its regions, root registry, remembered set, and statistics as plain
/// fields — no `Arc`, `Mutex`, or atomics. The collector is specified as
/// single-threaded and cooperative with the mutator (it only ever runs
/// inside a call to [`Collector::allocate`] or [`Collector::write_barrier`]),
/// so those primitives would add synchronization overhead for a component
/// that never contends with anything.
pub struct Collector<H: HeapValue> {
    young: Region,
    old_from: Region,
    old_to: Region,
    roots: RootRegistry,
    remembered: RememberedSet,
    stats: GcStats,
    config: CollectorConfig,
    _header: PhantomData<H>,
}

impl<H: HeapValue> Collector<H> {
    /// Build a collector from `config`, eagerly allocating all three
    /// backing regions.
    pub fn new(config: CollectorConfig) -> Result<Self, GcError> {
        let young = Region::new(config.young_region_size, "G0")?;
        let old_from = Region::new(config.old_region_size, "G1-from")?;
        let old_to = Region::new(config.old_region_size, "G1-to")?;
        Ok(Collector {
            young,
            old_from,
            old_to,
            roots: RootRegistry::new(config.root_stack_capacity),
            remembered: RememberedSet::new(config.remembered_set_capacity),
            stats: GcStats::default(),
            config,
            _header: PhantomData,
        })
    }

    /// Read-only view of the running counters.
    pub fn stats(&self) -> &GcStats {
        &self.stats
    }

    /// The collector's active configuration.
    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Bump-allocate an object with `field_count` fields, running a minor
    /// (and if necessary a major) collection on failure.
    ///
    /// Returns the payload base address; the header and fields are
    /// uninitialized and must be written by the caller via
    /// [`header::write_header`]/[`header::write_field`] before the object is
    /// published to any root or field.
    pub fn allocate(&mut self, field_count: usize) -> Result<Word, GcError> {
        let size = header::object_size(field_count);
        if let Some(ptr) = self.young.try_bump(size) {
            self.stats.record_alloc(size);
            return Ok(ptr);
        }

        self.collect_minor_with_promotion_guard()?;

        let ptr = self.young.try_bump(size).ok_or(GcError::OutOfMemory)?;
        self.stats.record_alloc(size);
        Ok(ptr)
    }

    /// Register `slot` as a new root.
    pub fn push_root(&mut self, slot: *mut Word) -> Result<(), GcError> {
        self.roots.push(slot)
    }

    /// Unregister the most recently registered root.
    pub fn pop_root(&mut self, slot: *mut Word) -> Result<(), GcError> {
        self.roots.pop(slot)
    }

    /// Log a `trace`-level line per live object currently in `region`, if
    /// `config.debug_log` is enabled. This is the per-object dump promised
    /// by the `debug_log` tunable; it is independent of the always-on
    /// `print_gc_state`/`print_gc_alloc_stats` surfaces.
    fn trace_dump_region(&self, region: &Region, from: Word, label: &str) {
        if !self.config.debug_log {
            return;
        }
        let mut cursor = from;
        while cursor < region.next_addr() {
            let header_word = unsafe { header::read_header(cursor) };
            let (tag, field_count) = H::decode(header_word);
            log::trace!("{label} object {cursor:#x}: tag={tag} fields={field_count}");
            cursor += header::object_size(field_count);
        }
    }

    /// Statistics-only read barrier.
    pub fn read_barrier(&mut self, _object: Word, _field_index: usize) {
        self.stats.record_read();
    }

    /// Statistics and remembered-set write barrier. Does **not** perform the
    /// store itself (the caller writes `contents` into the field); matches
    /// the original runtime, where the barrier call and the store are
    /// separate operations emitted by the compiler.
    pub fn write_barrier(
        &mut self,
        object: Word,
        _field_index: usize,
        _contents: Word,
    ) -> Result<(), GcError> {
        self.stats.record_write();
        match self.remembered.insert(object) {
            Ok(()) => Ok(()),
            Err(GcError::BarrierOverflow) => {
                log::warn!("remembered set full, forcing a minor collection to drain it");
                self.collect_minor_with_promotion_guard()?;
                self.remembered.insert(object)
            }
            Err(other) => Err(other),
        }
    }

    /// Run a minor collection, proactively running a major collection first
    /// if the young generation's worst-case promotion volume wouldn't fit in
    /// the old generation's remaining space.
    ///
    /// This sidesteps resuming a `chase` loop mid-copy after a nested major
    /// collection: rather than retry a half-finished minor pass (whose
    /// already-installed forwarding addresses may point into old-space that
    /// a major collection is about to discard), the headroom check makes a
    /// `PromotionFailed` outcome rare, and treats the rare remaining case as
    /// fatal instead of attempting a resume.
    fn collect_minor_with_promotion_guard(&mut self) -> Result<(), GcError> {
        if self.young.used() > self.old_from.remaining() {
            log::debug!("insufficient old-generation headroom for promotion, running a major collection first");
            self.collect_major()?;
        }
        self.collect_minor().map_err(|err| match err {
            GcError::PromotionFailed => GcError::MajorCollectionOverflow,
            other => other,
        })
    }

    /// A single minor collection: forward roots and remembered-set entries
    /// into the old generation's `from` region (promotion), Cheney-scan the
    /// newly promoted objects, then empty the young generation.
    fn collect_minor(&mut self) -> Result<(), GcError> {
        log::debug!(
            "minor collection start: young used={} old used={}",
            self.young.used(),
            self.old_from.used()
        );
        let scan_start = self.old_from.next_addr();

        generation::forward_roots::<H>(&self.roots, &self.young, &mut self.old_from)?;

        let remembered = self.remembered.drain();
        for object in remembered {
            generation::forward_object_fields::<H>(object, &self.young, &mut self.old_from)?;
        }

        generation::cheney_scan::<H>(scan_start, &self.young, &mut self.old_from)?;

        self.trace_dump_region(&self.old_from, scan_start, "G1 (promoted)");
        self.young.reset();
        self.stats.record_minor_collection();
        log::debug!("minor collection end: old used={}", self.old_from.used());
        Ok(())
    }

    /// A single major collection: the classic two-space flip of the old
    /// generation, also honoring any young-generation pointers into old
    /// space (a younger generation can hold references into the generation
    /// currently being collected, since those references are not cleared by
    /// a minor collection).
    ///
    /// Unlike a minor collection, this does **not** drain the remembered
    /// set: the set is only cleared on minor collection (the remembered-set
    /// contract), so a subsequent minor collection can still use its
    /// old-to-young entries as extra roots. Remembered objects still need
    /// their fields forwarded here, since the objects themselves may move
    /// during the flip.
    fn collect_major(&mut self) -> Result<(), GcError> {
        log::debug!("major collection start: old used={}", self.old_from.used());
        self.old_to.reset();
        let scan_start = self.old_to.next_addr();

        generation::forward_roots::<H>(&self.roots, &self.old_from, &mut self.old_to)?;
        generation::walk_and_forward_fields::<H>(&self.young, &self.old_from, &mut self.old_to)?;

        let remembered: Vec<Word> = self.remembered.iter().collect();
        for object in remembered {
            generation::forward_object_fields::<H>(object, &self.old_from, &mut self.old_to)?;
        }

        generation::cheney_scan::<H>(scan_start, &self.old_from, &mut self.old_to)?;

        self.trace_dump_region(&self.old_to, scan_start, "G1 (survivors)");
        std::mem::swap(&mut self.old_from, &mut self.old_to);
        self.old_to.reset();
        self.stats.record_major_collection();
        log::debug!("major collection end: old used={}", self.old_from.used());
        Ok(())
    }

    /// Print allocation and collection totals, then the full per-generation
    /// state. Plain stdout output, not routed through `log`: this is the
    /// specified data-dump surface, not a diagnostic.
    pub fn print_gc_alloc_stats(&self) {
        println!(
            "Total memory allocation: {} bytes ({} objects)",
            self.stats.total_allocated_bytes, self.stats.total_allocated_objects
        );
        println!("Total garbage collecting: {}", self.stats.total_gc_collect());
        println!(
            "Maximum residency:       {} bytes ({} objects)",
            self.stats.max_allocated_bytes, self.stats.max_allocated_objects
        );
        println!(
            "Total memory use:        {} reads and {} writes",
            self.stats.total_reads, self.stats.total_writes
        );
        println!("Max GC roots stack size: {} roots", self.roots.high_water_mark());
        self.print_gc_state();
    }

    /// Print the live object contents of a region under a `G_<label>:`
    /// heading, in the same format `print_gc_alloc_stats`/`print_gc_state`
    /// has always used for the young generation.
    fn print_region_objects(&self, region: &Region, label: &str) {
        println!("Objects from G_{label}:");
        let mut cursor = region.base_addr();
        while cursor < region.next_addr() {
            let header_word = unsafe { header::read_header(cursor) };
            let (tag, field_count) = H::decode(header_word);
            print!("\tAddress: {cursor:#x}; tag: {tag}; fields: ");
            for i in 0..field_count {
                let value = unsafe { header::read_field(cursor, i) };
                print!("{value:#x}");
                if i + 1 < field_count {
                    print!(", ");
                } else {
                    print!("; ");
                }
            }
            println!();
            cursor += header::object_size(field_count);
        }
    }

    /// Dump both generations' live objects, region boundaries, and the root
    /// registry's current contents.
    pub fn print_gc_state(&self) {
        self.print_region_objects(&self.young, "0");
        self.print_region_objects(&self.old_from, "1");

        println!(
            "G_0 boundaries from: {:#x} to: {:#x}",
            self.young.base_addr(),
            self.young.end_addr()
        );
        println!(
            "G_0 free memory part from: {:#x} to: {:#x}",
            self.young.next_addr(),
            self.young.end_addr()
        );
        println!(
            "G_1 boundaries from: {:#x} to: {:#x}",
            self.old_from.base_addr(),
            self.old_from.end_addr()
        );
        println!(
            "G_1 free memory part from: {:#x} to: {:#x}",
            self.old_from.next_addr(),
            self.old_from.end_addr()
        );

        println!("Roots ({} total):", self.roots.len());
        for (i, &slot) in self.roots.iter().enumerate() {
            let value = unsafe { *slot };
            println!("\t[{i}] slot {:#x}p -> {value:#x}", slot as usize);
        }
    }
}
