use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{info, warn};
use rustfft::num_complex::Complex32;

use crate::error::{RadarError, Result};
use crate::ingest::{checked_load, IngestCounters, Ingestor};
use crate::model::IqBlock;
use crate::ring::RingBuffer;

/// On-disk sample encoding. No header in either case (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dtype {
    /// Interleaved (I, Q) float32 pairs.
    InterleavedF32,
    /// Native complex64 (two contiguous float32 per sample, same layout
    /// as `InterleavedF32` but named to match the spec's wording).
    Complex64,
}

pub struct FileIngestor {
    path: PathBuf,
    dtype: Dtype,
    channels: usize,
    samples_per_channel: usize,
    chunk_size: usize,
}

impl FileIngestor {
    pub fn new(path: PathBuf, dtype: Dtype, channels: usize, samples_per_channel: usize, chunk_size: usize) -> Self {
        Self { path, dtype, channels, samples_per_channel, chunk_size }
    }

    fn block_bytes(&self) -> usize {
        self.channels * self.samples_per_channel * 8
    }
}

impl Ingestor for FileIngestor {
    fn run(&mut self, ring: Arc<RingBuffer>, shutdown: Arc<AtomicBool>, counters: Arc<IngestCounters>) -> Result<()> {
        let file = File::open(&self.path).map_err(RadarError::SourceIo)?;
        let mut reader = BufReader::with_capacity(self.chunk_size, file);
        info!("file ingestor started: {}", self.path.display());

        let block_bytes = self.block_bytes();
        let mut buf = vec![0u8; block_bytes];

        loop {
            if checked_load(&shutdown) {
                break;
            }
            match read_exact_or_eof(&mut reader, &mut buf) {
                Ok(true) => {
                    match decode_block(&buf, self.channels, self.samples_per_channel, self.dtype) {
                        Some(block) => {
                            counters.frames_in.fetch_add(1, Ordering::Relaxed);
                            ring.push(block);
                        }
                        None => {
                            counters.frames_dropped.fetch_add(1, Ordering::Relaxed);
                            warn!("malformed block in file source, dropped");
                        }
                    }
                }
                Ok(false) => {
                    info!("file ingestor reached EOF");
                    break;
                }
                Err(e) => return Err(RadarError::SourceIo(e)),
            }
        }
        Ok(())
    }
}

/// Fills `buf` from `reader`. Returns `Ok(true)` on a full read, `Ok(false)`
/// on clean EOF with nothing read, and an error otherwise (including a
/// short/partial trailing read, treated as EOF per spec's "no header, no
/// trailer" framing).
fn read_exact_or_eof(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => {
                return if filled == 0 { Ok(false) } else { Ok(false) };
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(true)
}

fn decode_block(buf: &[u8], channels: usize, samples_per_channel: usize, _dtype: Dtype) -> Option<IqBlock> {
    let expected = channels * samples_per_channel * 8;
    if buf.len() != expected {
        return None;
    }
    let mut data = Vec::with_capacity(channels * samples_per_channel);
    for chunk in buf.chunks_exact(8) {
        let i = f32::from_le_bytes(chunk[0..4].try_into().ok()?);
        let q = f32::from_le_bytes(chunk[4..8].try_into().ok()?);
        data.push(Complex32::new(i, q));
    }
    Some(IqBlock::from_channel_data(channels, samples_per_channel, data))
}
