// Bounded lock-free MPSC ring buffer
//
// Slot-sequence protocol: every slot carries a generation counter. A slot is
// free for write position `pos` when its sequence equals `pos`, and holds a
// readable record when it equals `pos + 1`. Popping republishes the slot for
// the next generation at `pos + CAPACITY`.

use crate::record::Record;
use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicU32, Ordering};

/// Cache-aligned wrapper to prevent false sharing
#[repr(align(64))]
struct CacheAligned<T>(T);

/// One ring cell: generation counter plus record payload.
#[repr(align(64))]
struct Slot {
    sequence: AtomicU32,
    record: UnsafeCell<Record>,
}

/// Lock-free multiple-producer single-consumer ring buffer
///
/// Producers coordinate through a CAS loop on the shared write position;
/// the consumer keeps a private read position. `try_push` never blocks:
/// a full ring is reported to the caller, which owns drop accounting.
pub struct MpscRing<const CAPACITY: usize> {
    slots: Box<[Slot]>,
    write_pos: CacheAligned<AtomicU32>,
    read_pos: CacheAligned<UnsafeCell<u32>>,
}

// SAFETY: MpscRing is Sync because:
// - Producers only touch a slot after winning the CAS on write_pos, and
//   publish it with a release store on the slot sequence.
// - The consumer only reads a slot after an acquire load observes the
//   published sequence, which synchronizes with that release store.
// - read_pos is written by the single consumer only (backend contract).
unsafe impl<const CAPACITY: usize> Sync for MpscRing<CAPACITY> {}
unsafe impl<const CAPACITY: usize> Send for MpscRing<CAPACITY> {}

impl<const CAPACITY: usize> MpscRing<CAPACITY> {
    const CAPACITY_CHECK: () = assert!(
        CAPACITY.is_power_of_two() && CAPACITY > 0 && CAPACITY <= u32::MAX as usize / 2,
        "ring capacity must be a power of two"
    );
    const MASK: u32 = (CAPACITY - 1) as u32;

    pub fn new() -> Self {
        // Force the compile-time capacity check for this instantiation.
        let () = Self::CAPACITY_CHECK;

        let slots: Vec<Slot> = (0..CAPACITY)
            .map(|i| Slot {
                sequence: AtomicU32::new(i as u32),
                record: UnsafeCell::new(Record::default()),
            })
            .collect();

        Self {
            slots: slots.into_boxed_slice(),
            write_pos: CacheAligned(AtomicU32::new(0)),
            read_pos: CacheAligned(UnsafeCell::new(0)),
        }
    }

    /// Push a record, callable from any thread.
    ///
    /// Returns false iff the ring was full at the point this producer tried
    /// to reserve a slot. The caller is responsible for drop accounting.
    pub fn try_push(&self, record: &Record) -> bool {
        let mut pos = self.write_pos.0.load(Ordering::Relaxed);
        loop {
            let slot = &self.slots[(pos & Self::MASK) as usize];
            let seq = slot.sequence.load(Ordering::Acquire);
            let diff = seq.wrapping_sub(pos) as i32;

            if diff == 0 {
                // Slot free for this generation; try to claim it.
                match self.write_pos.0.compare_exchange_weak(
                    pos,
                    pos.wrapping_add(1),
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => {
                        // SAFETY: the CAS gave this producer exclusive
                        // ownership of the slot until the release store below.
                        unsafe {
                            *slot.record.get() = *record;
                        }
                        slot.sequence.store(pos.wrapping_add(1), Ordering::Release);
                        return true;
                    }
                    Err(actual) => {
                        pos = actual;
                    }
                }
            } else if diff < 0 {
                // Consumer has not freed this generation yet: ring is full.
                return false;
            } else {
                // Another producer claimed the slot first; chase the head.
                pos = self.write_pos.0.load(Ordering::Relaxed);
            }
        }
    }

    /// Pop the next record, if any.
    ///
    /// Must only be called from the single consumer thread; the read position
    /// is deliberately unsynchronized.
    pub fn try_pop(&self, out: &mut Record) -> bool {
        // SAFETY: single consumer (backend contract); no other thread reads
        // or writes read_pos.
        let read_pos = unsafe { *self.read_pos.0.get() };
        let slot = &self.slots[(read_pos & Self::MASK) as usize];
        let seq = slot.sequence.load(Ordering::Acquire);
        if seq != read_pos.wrapping_add(1) {
            return false;
        }
        // SAFETY: the acquire load above observed the producer's release
        // store, so the record copy is complete and the slot is ours until
        // the release store below hands it to the next generation.
        unsafe {
            *out = *slot.record.get();
        }
        slot.sequence
            .store(read_pos.wrapping_add(CAPACITY as u32), Ordering::Release);
        unsafe {
            *self.read_pos.0.get() = read_pos.wrapping_add(1);
        }
        true
    }

    /// Consumer-side emptiness probe.
    ///
    /// Same single-consumer contract as `try_pop`.
    pub fn empty(&self) -> bool {
        // SAFETY: single consumer (backend contract).
        let read_pos = unsafe { *self.read_pos.0.get() };
        let slot = &self.slots[(read_pos & Self::MASK) as usize];
        slot.sequence.load(Ordering::Acquire) != read_pos.wrapping_add(1)
    }

    pub const fn capacity(&self) -> usize {
        CAPACITY
    }
}

impl<const CAPACITY: usize> Default for MpscRing<CAPACITY> {
    fn default() -> Self {
        Self::new()
    }
}
