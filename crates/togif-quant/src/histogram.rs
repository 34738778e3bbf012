use std::cmp::Reverse;
use std::collections::HashMap;

use togif_types::{Frame, Rgba};

/// Exact-color occurrence counts over a whole frame corpus.
///
/// Every distinct RGBA tuple gets its own entry, nothing is merged. Memory
/// grows with the number of distinct colors in the corpus (up to 2^32 keys in
/// the worst case), which makes this the dominant allocation of a conversion;
/// photographic input with millions of unique colors costs tens of megabytes
/// here before the palette cut throws most of it away.
#[derive(Debug, Clone, Default)]
pub struct ColorHistogram {
    counts: HashMap<Rgba, u64>,
    pixels: u64,
}

impl ColorHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every pixel of `frame`
    pub fn observe(&mut self, frame: &Frame) {
        for px in frame.pixels() {
            *self.counts.entry(px).or_insert(0) += 1;
        }
        self.pixels += frame.pixel_count() as u64;
    }

    pub fn from_frames<'a>(frames: impl IntoIterator<Item = &'a Frame>) -> Self {
        let mut histogram = Self::new();
        for frame in frames {
            histogram.observe(frame);
        }
        histogram
    }

    pub fn distinct_colors(&self) -> usize {
        self.counts.len()
    }

    pub fn total_pixels(&self) -> u64 {
        self.pixels
    }

    pub fn count(&self, color: &Rgba) -> u64 {
        self.counts.get(color).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// All observed colors, most frequent first.
    ///
    /// Equal counts are ordered by the channel tuple (R, G, B, A) ascending so
    /// the ranking never depends on hash iteration order.
    pub fn ranked(&self) -> Vec<(Rgba, u64)> {
        let mut ranked: Vec<(Rgba, u64)> = self.counts.iter().map(|(&c, &n)| (c, n)).collect();
        ranked.sort_unstable_by_key(|&(color, count)| (Reverse(count), color));
        ranked
    }
}
