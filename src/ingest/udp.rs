use std::net::UdpSocket;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use rustfft::num_complex::Complex32;

use crate::error::{RadarError, Result};
use crate::ingest::{checked_load, IngestCounters, Ingestor};
use crate::model::IqBlock;
use crate::ring::RingBuffer;

/// Per-packet payload: C*N complex64 values, row-major by channel then
/// sample (spec §6). Binds host:port; canonical port 5000.
pub struct UdpIngestor {
    host: String,
    port: u16,
    channels: usize,
    samples_per_channel: usize,
}

impl UdpIngestor {
    pub fn new(host: String, port: u16, channels: usize, samples_per_channel: usize) -> Self {
        Self { host, port, channels, samples_per_channel }
    }

    fn expected_len(&self) -> usize {
        self.channels * self.samples_per_channel * 8
    }
}

impl Ingestor for UdpIngestor {
    fn run(&mut self, ring: Arc<RingBuffer>, shutdown: Arc<AtomicBool>, counters: Arc<IngestCounters>) -> Result<()> {
        let addr = format!("{}:{}", self.host, self.port);
        let socket = UdpSocket::bind(&addr).map_err(RadarError::SourceIo)?;
        socket
            .set_read_timeout(Some(Duration::from_millis(200)))
            .map_err(RadarError::SourceIo)?;
        info!("udp ingestor bound to {addr}");

        let expected = self.expected_len();
        let mut buf = vec![0u8; expected.max(65536)];

        while !checked_load(&shutdown) {
            match socket.recv(&mut buf) {
                Ok(n) => {
                    if n < expected {
                        // Undersized: dropped silently per spec §4.1, no counter bump.
                        continue;
                    }
                    let payload = &buf[..expected]; // oversized datagrams are truncated
                    match decode(payload, self.channels, self.samples_per_channel) {
                        Some(block) => {
                            counters.frames_in.fetch_add(1, Ordering::Relaxed);
                            ring.push(block);
                        }
                        None => {
                            counters.frames_dropped.fetch_add(1, Ordering::Relaxed);
                            warn!("malformed udp frame, dropped");
                        }
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock || e.kind() == std::io::ErrorKind::TimedOut => {
                    continue;
                }
                Err(e) => {
                    warn!("transient udp read error: {e}, retrying after backoff");
                    std::thread::sleep(Duration::from_millis(500));
                }
            }
        }
        Ok(())
    }
}

fn decode(buf: &[u8], channels: usize, samples_per_channel: usize) -> Option<IqBlock> {
    if buf.len() != channels * samples_per_channel * 8 {
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
