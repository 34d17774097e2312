//! Shared-memory ring buffer of IQ blocks (spec §3 "Ring slot", §5).
//!
//! Each slot is an `ArcSwap<IqBlock>`, generalizing the teacher's
//! `PeakMeter` single-value lock-free swap to a fixed-size array of
//! swapped slots. The Ingestor is the sole writer; readers only ever
//! `load()`. A write index, visible to readers via an `AtomicU64`, plus a
//! one-shot readiness signal (`Mutex`+`Condvar`) round out the
//! coordination described in spec §5.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};

use arc_swap::ArcSwap;

use crate::model::IqBlock;

struct Readiness {
    ready: Mutex<bool>,
    cond: Condvar,
}

impl Readiness {
    fn new() -> Self {
        Self { ready: Mutex::new(false), cond: Condvar::new() }
    }

    fn signal(&self) {
        let mut g = self.ready.lock().unwrap();
        *g = true;
        self.cond.notify_all();
    }

    fn wait(&self) {
        let mut g = self.ready.lock().unwrap();
        while !*g {
            g = self.cond.wait(g).unwrap();
        }
    }
}

/// Fixed-depth ring of IQ block slots, shared between one Ingestor writer
/// and any number of reader handles.
pub struct RingBuffer {
    slots: Vec<ArcSwap<IqBlock>>,
    depth: usize,
    write_index: AtomicU64,
    readiness: Readiness,
}

impl RingBuffer {
    pub fn new(depth: usize, channels: usize, samples_per_channel: usize) -> Arc<Self> {
        let slots = (0..depth)
            .map(|_| ArcSwap::from_pointee(IqBlock::new(channels, samples_per_channel)))
            .collect();
        Arc::new(Self {
            slots,
            depth,
            write_index: AtomicU64::new(0),
            readiness: Readiness::new(),
        })
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Writes `block` into the next slot and advances the write index.
    /// Only the Ingestor calls this. On a full ring this overwrites the
    /// oldest slot by construction (lossy by contract, spec §4.1).
    pub fn push(&self, block: IqBlock) {
        let idx = self.write_index.fetch_add(1, Ordering::AcqRel);
        let slot = (idx as usize) % self.depth;
        self.slots[slot].store(Arc::new(block));
        if idx == 0 {
            self.readiness.signal();
        }
    }

    /// Current monotonic write index (number of blocks written so far).
    pub fn write_index(&self) -> u64 {
        self.write_index.load(Ordering::Acquire)
    }

    /// Blocks until the first slot has been written.
    pub fn wait_ready(&self) {
        self.readiness.wait();
    }

    /// Read-only view of the most recently written slot, if any.
    pub fn latest(&self) -> Option<Arc<IqBlock>> {
        let idx = self.write_index();
        if idx == 0 {
            return None;
        }
        let slot = ((idx - 1) as usize) % self.depth;
        Some(self.slots[slot].load_full())
    }

    /// Read-only view of the slot for a specific write index, if it has
    /// not yet been overwritten (best-effort: no fencing against a
    /// concurrent overwrite of the same index modulo depth).
    pub fn get(&self, index: u64) -> Option<Arc<IqBlock>> {
        let latest = self.write_index();
        if index >= latest || latest - index > self.depth as u64 {
            return None;
        }
        let slot = (index as usize) % self.depth;
        Some(self.slots[slot].load_full())
    }
}
