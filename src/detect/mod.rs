//! 2-D CA-CFAR detection, morphological cleanup, and peak extraction
//! (spec §4.4).

mod cfar;
mod morphology;
mod peaks;

pub use cfar::{cfar_detect, CfarResult};
pub use morphology::clean_mask;
pub use peaks::extract_detections;
