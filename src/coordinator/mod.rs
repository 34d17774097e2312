//! Ring-buffer wiring, per-channel worker fan-out, merge, and broadcast
//! (spec §2 "Coordinator", spec §5).
//!
//! Grounded on the teacher's `audio::engine::Engine` thread/channel
//! shape and `bin::cli`'s ctrlc + `Arc<AtomicBool>` shutdown wiring.

pub mod counters;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use arc_swap::ArcSwap;
use log::{debug, info, warn};

use crate::broadcast::{BroadcastMessage, BroadcastServer, DetectionMsg, TrackMsg};
use crate::caf::CafEngine;
use crate::cluster::dbscan;
use crate::config::{Config, Mode};
use crate::coordinator::counters::Counters;
use crate::detect::{cfar_detect, clean_mask, extract_detections};
use crate::error::Result;
use crate::ingest::{FileIngestor, IngestCounters, Ingestor, UdpIngestor};
use crate::model::IqBlock;
use crate::preprocess::{DcRemove, FirHighpass, Mti, Normalize, PhaseCalibration, PreprocessChain};
use crate::ring::RingBuffer;
use crate::tracker::Tracker;

/// Shared slot for one surveillance channel's latest CAF output, tagged
/// with the source write index so staleness can be logged (spec §5
/// "tolerates skew up to one frame").
type CafSlot = ArcSwap<Option<(u64, crate::model::RdMap)>>;

pub struct Coordinator {
    config: Config,
    shutdown: Arc<AtomicBool>,
    counters: Arc<Counters>,
}

impl Coordinator {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            shutdown: Arc::new(AtomicBool::new(false)),
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    pub fn counters(&self) -> Arc<Counters> {
        Arc::clone(&self.counters)
    }

    /// Spawns the Ingestor, one CAF worker per surveillance channel, and
    /// the downstream CFAR/morphology/cluster/tracker/broadcast pipeline
    /// thread. Blocks until all threads join (i.e. until shutdown).
    pub fn run(self) -> Result<()> {
        self.config.validate()?;
        info!("starting coordinator with config: {:?}", summarize(&self.config));

        let ring = RingBuffer::new(self.config.ring_depth.max(2), self.config.channels, self.config.block_size);
        let ingest_counters = Arc::new(IngestCounters::default());

        let ingest_handle = self.spawn_ingestor(Arc::clone(&ring), Arc::clone(&ingest_counters));

        let surveillance_channels = self.config.channels - 1;
        let caf_slots: Vec<Arc<CafSlot>> = (0..surveillance_channels)
            .map(|_| Arc::new(ArcSwap::from_pointee(None)))
            .collect();

        let mut caf_handles = Vec::new();
        for c in 1..self.config.channels {
            let handle = self.spawn_caf_worker(c, Arc::clone(&ring), Arc::clone(&caf_slots[c - 1]));
            caf_handles.push(handle);
        }

        let downstream_handle = self.spawn_downstream(caf_slots, Arc::clone(&ingest_counters));

        if let Some(h) = ingest_handle {
            let _ = h.join();
        }
        for h in caf_handles {
            let _ = h.join();
        }
        let _ = downstream_handle.join();
        Ok(())
    }

    fn spawn_ingestor(&self, ring: Arc<RingBuffer>, counters: Arc<IngestCounters>) -> Option<JoinHandle<()>> {
        let shutdown = Arc::clone(&self.shutdown);
        let channels = self.config.channels;
        let block_size = self.config.block_size;
        match self.config.mode {
            Mode::File => {
                let path = PathBuf::from(self.config.file.path.clone());
                let chunk_size = self.config.file.chunk_size;
                Some(thread::spawn(move || {
                    let mut ingestor =
                        FileIngestor::new(path, crate::ingest::file::Dtype::InterleavedF32, channels, block_size, chunk_size);
                    if let Err(e) = ingestor.run(ring, shutdown, counters) {
                        log::error!("file ingestor terminated: {e}");
                    }
                }))
            }
            Mode::Udp => {
                let host = self.config.udp.host.clone();
                let port = self.config.udp.port;
                Some(thread::spawn(move || {
                    let mut ingestor = UdpIngestor::new(host, port, channels, block_size);
                    if let Err(e) = ingestor.run(ring, shutdown, counters) {
                        log::error!("udp ingestor terminated: {e}");
                    }
                }))
            }
        }
    }

    fn spawn_caf_worker(&self, channel: usize, ring: Arc<RingBuffer>, slot: Arc<CafSlot>) -> JoinHandle<()> {
        let shutdown = Arc::clone(&self.shutdown);
        let caf_config = self.config.caf.clone();
        let fir_order = 101;
        let cutoff = 2.0 * 1000.0 / self.config.sample_rate; // conservative default cutoff
        let chain = PreprocessChain {
            normalize: Normalize,
            dc_remove: DcRemove,
            phase_calibration: PhaseCalibration,
            fir_highpass: FirHighpass::new(fir_order, cutoff),
            mti: Mti { delta: 1 },
            reference_channel: 0,
        };
        thread::spawn(move || {
            let engine = CafEngine::new(&caf_config);
            let mut last_index = 0u64;
            loop {
                if shutdown.load(Ordering::Relaxed) {
                    break;
                }
                ring.wait_ready();
                let current = ring.write_index();
                if current == last_index {
                    thread::sleep(Duration::from_millis(2));
                    continue;
                }
                last_index = current;
                let block = match ring.latest() {
                    Some(b) => b,
                    None => continue,
                };
                let mut local = IqBlock::from_channel_data(
                    2,
                    block.samples_per_channel,
                    [block.channel(0), block.channel(channel)].concat(),
                );
                chain.apply(&mut local);
                let rd = engine.compute_pair(local.channel(0), local.channel(1));
                slot.store(Arc::new(Some((current, rd))));
            }
        })
    }

    fn spawn_downstream(&self, caf_slots: Vec<Arc<CafSlot>>, _ingest_counters: Arc<IngestCounters>) -> JoinHandle<()> {
        let shutdown = Arc::clone(&self.shutdown);
        let counters = Arc::clone(&self.counters);
        let cfar_config = self.config.cfar.clone();
        let morph_config = self.config.morph.clone();
        let cluster_config = self.config.cluster.clone();
        let tracker_config = self.config.tracker.clone();
        let broadcast_addr = self.config.broadcast_addr.clone();

        thread::spawn(move || {
            let server = match BroadcastServer::bind(&broadcast_addr) {
                Ok(s) => s,
                Err(e) => {
                    warn!("broadcast server failed to bind {broadcast_addr}: {e}");
                    return;
                }
            };
            let mut tracker = Tracker::new(tracker_config);
            let mut last_merged: Option<u64> = None;

            while !shutdown.load(Ordering::Relaxed) {
                let maps: Vec<(u64, crate::model::RdMap)> = caf_slots
                    .iter()
                    .filter_map(|slot| (**slot.load()).clone())
                    .collect();
                if maps.is_empty() {
                    thread::sleep(Duration::from_millis(5));
                    continue;
                }
                let freshest = maps.iter().map(|(idx, _)| *idx).max().unwrap();
                if last_merged == Some(freshest) {
                    thread::sleep(Duration::from_millis(5));
                    continue;
                }
                last_merged = Some(freshest);

                let merged = average_maps(&maps);
                let cfar_result = cfar_detect(&merged, &cfar_config);
                let cleaned = clean_mask(&cfar_result.mask, &morph_config);
                let detections = extract_detections(&cleaned, &merged);
                counters.detections_total.fetch_add(detections.len() as u64, Ordering::Relaxed);

                let clusters = dbscan(&detections, &cluster_config);
                let real_clusters: Vec<_> = clusters.into_iter().filter(|c| c.label >= 0).collect();

                let tracks_before = tracker.tracks().len();
                let timestamp = now_seconds();
                tracker.step(&real_clusters, timestamp);
                let tracks_after = tracker.tracks().len();
                if tracks_after > tracks_before {
                    counters.tracks_born.fetch_add((tracks_after - tracks_before) as u64, Ordering::Relaxed);
                } else if tracks_before > tracks_after {
                    counters.tracks_died.fetch_add((tracks_before - tracks_after) as u64, Ordering::Relaxed);
                }

                let message = BroadcastMessage {
                    timestamp,
                    detections: detections
                        .iter()
                        .map(|d| DetectionMsg { doppler: d.doppler_idx as f64, range: d.range_idx as f64, power: d.power as f64 })
                        .collect(),
                    tracks: tracker
                        .tracks()
                        .iter()
                        .map(|t| TrackMsg { id: t.id, range: t.range(), doppler: t.doppler(), vr: t.vr(), vd: t.vd() })
                        .collect(),
                };
                server.broadcast(&message);
                debug!("frame {freshest}: {} detections, {} tracks", message.detections.len(), message.tracks.len());
            }
        })
    }
}

fn average_maps(maps: &[(u64, crate::model::RdMap)]) -> crate::model::RdMap {
    let (_, first) = &maps[0];
    let mut acc = crate::model::RdMap::zeros(first.doppler_bins(), first.range_bins());
    for (_, rd) in maps {
        acc.data += &rd.data;
    }
    acc.data.mapv_inplace(|v| v / maps.len() as f32);
    let max = acc.max().max(0.0) + 1e-12;
    acc.data.mapv_inplace(|v| v / max);
    acc
}

fn now_seconds() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs_f64()
}

fn summarize(config: &Config) -> String {
    format!(
        "mode={:?} channels={} block_size={} ring_depth={}",
        config.mode, config.channels, config.block_size, config.ring_depth
    )
}
