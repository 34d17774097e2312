//! Ingestor (spec §4.1): produces IQ blocks from a file or UDP source and
//! writes them into the ring buffer, raising readiness after the first
//! write.

pub mod file;
mod udp;

pub use file::FileIngestor;
pub use udp::UdpIngestor;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::Result;
use crate::ring::RingBuffer;

/// Per-ingestor counters (malformed/dropped frames), read by the
/// coordinator's `Counters` aggregation.
#[derive(Default)]
pub struct IngestCounters {
    pub frames_in: AtomicU64,
    pub frames_dropped: AtomicU64,
}

/// A source of IQ blocks. Implementors run the blocking receive loop on
/// the calling thread until EOF (file) or `shutdown` is observed (udp).
pub trait Ingestor {
    /// Runs until the source is exhausted or `shutdown` is set, pushing
    /// each successfully parsed block into `ring`.
    fn run(&mut self, ring: Arc<RingBuffer>, shutdown: Arc<AtomicBool>, counters: Arc<IngestCounters>) -> Result<()>;
}

pub(crate) fn checked_load(shutdown: &Arc<AtomicBool>) -> bool {
    shutdown.load(Ordering::Relaxed)
}
