//! Per-channel clutter suppression chain (spec §4.2), grounded on the
//! teacher's `Stage` trait pattern: a small trait applied in sequence to
//! a mutable buffer.

mod dc_remove;
mod fir_highpass;
mod mti;
mod normalize;
mod phase_calibration;

pub use dc_remove::DcRemove;
pub use fir_highpass::FirHighpass;
pub use mti::Mti;
pub use normalize::Normalize;
pub use phase_calibration::PhaseCalibration;

use rustfft::num_complex::Complex32;

/// One preprocessing step applied in place to a single channel's samples.
pub trait IqStage {
    fn process(&self, samples: &mut [Complex32]);
}

/// Stage that needs the reference channel as side input (phase calibration).
pub trait IqStageWithRef {
    fn process(&self, reference: &[Complex32], samples: &mut [Complex32]);
}

/// Runs the five stages of spec §4.2 in order, per non-reference channel,
/// and the reference-independent stages on the reference channel too.
pub struct PreprocessChain {
    pub normalize: Normalize,
    pub dc_remove: DcRemove,
    pub phase_calibration: PhaseCalibration,
    pub fir_highpass: FirHighpass,
    pub mti: Mti,
    pub reference_channel: usize,
}

impl PreprocessChain {
    /// Applies the full chain to every channel of `block` in place.
    /// Phase calibration is skipped for the reference channel itself.
    pub fn apply(&self, block: &mut crate::model::IqBlock) {
        let channels = block.channels;

        for c in 0..channels {
            let samples = block.channel_mut(c);
            self.normalize.process(samples);
            self.dc_remove.process(samples);
        }

        let ref_after_dc: Vec<Complex32> = block.channel(self.reference_channel).to_vec();

        for c in 0..channels {
            if c == self.reference_channel {
                continue;
            }
            let samples = block.channel_mut(c);
            self.phase_calibration.process(&ref_after_dc, samples);
        }

        for c in 0..channels {
            let samples = block.channel_mut(c);
            self.fir_highpass.process(samples);
            self.mti.process(samples);
        }
    }
}
