//! Palette construction and frame requantization.
//!
//! The pipeline is two passes over the same frames: every frame is first
//! normalized and fed into a [`ColorHistogram`], the [`PaletteBuilder`] cuts
//! that down to at most 256 colors, and then each frame is normalized again
//! and remapped by a [`FrameQuantizer`] holding the finished palette.

pub mod geometry;
pub mod histogram;
pub mod palette;
pub mod remap;

pub use geometry::{resample, GeometryNormalizer};
pub use histogram::ColorHistogram;
pub use palette::{PaletteBuilder, PaletteStrategy, FALLBACK_PALETTE, LEGACY_PALETTE};
pub use remap::FrameQuantizer;

use std::sync::Arc;
use togif_types::{Frame, IndexedFrame, Palette, TogifResult};

/// Build the shared palette for `frames` with default settings
pub fn build_palette<'a>(frames: impl IntoIterator<Item = &'a Frame>) -> TogifResult<Palette> {
    PaletteBuilder::new().build_from_frames(frames)
}

/// Remap one frame onto `palette`
pub fn quantize(frame: &Frame, palette: &Arc<Palette>) -> TogifResult<IndexedFrame> {
    FrameQuantizer::new(Arc::clone(palette)).quantize(frame)
}
