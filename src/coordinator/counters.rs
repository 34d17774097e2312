use std::sync::atomic::{AtomicU64, Ordering};

/// Per-stage observability counters (spec §7: "every stage exposes
/// counters... for observability").
#[derive(Default)]
pub struct Counters {
    pub frames_in: AtomicU64,
    pub frames_dropped: AtomicU64,
    pub detections_total: AtomicU64,
    pub tracks_born: AtomicU64,
    pub tracks_died: AtomicU64,
}

impl Counters {
    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            frames_in: self.frames_in.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            detections_total: self.detections_total.load(Ordering::Relaxed),
            tracks_born: self.tracks_born.load(Ordering::Relaxed),
            tracks_died: self.tracks_died.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CountersSnapshot {
    pub frames_in: u64,
    pub frames_dropped: u64,
    pub detections_total: u64,
    pub tracks_born: u64,
    pub tracks_died: u64,
}
