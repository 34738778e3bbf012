use std::collections::HashMap;
use std::sync::Arc;

use togif_types::{Frame, IndexedFrame, Palette, Rgba, TogifResult};
use tracing::debug;

/// Maps true-color frames onto a fixed shared palette.
///
/// A color present verbatim in the palette always maps to its own index.
/// Anything else goes to the entry with the smallest squared Euclidean
/// distance over all four channels; equal distances resolve to the lowest
/// index. The quantizer only reads the palette, so one instance can serve
/// frames in any order or from several threads.
#[derive(Debug, Clone)]
pub struct FrameQuantizer {
    palette: Arc<Palette>,
    exact: HashMap<Rgba, u8>,
}

impl FrameQuantizer {
    pub fn new(palette: Arc<Palette>) -> Self {
        let exact = palette
            .colors()
            .iter()
            .enumerate()
            .map(|(idx, &color)| (color, idx as u8))
            .collect();
        Self { palette, exact }
    }

    pub fn palette(&self) -> &Arc<Palette> {
        &self.palette
    }

    /// Quantize one frame; the result shares this quantizer's palette
    pub fn quantize(&self, frame: &Frame) -> TogifResult<IndexedFrame> {
        let mut nearest_cache: HashMap<Rgba, u8> = HashMap::new();
        let mut approximated = 0usize;

        let indices: Vec<u8> = frame
            .pixels()
            .map(|px| match self.exact.get(&px) {
                Some(&idx) => idx,
                None => {
                    approximated += 1;
                    *nearest_cache
                        .entry(px)
                        .or_insert_with(|| nearest_index(self.palette.colors(), px))
                }
            })
            .collect();

        if approximated > 0 {
            debug!(
                stage = "quantize",
                approximated_pixels = approximated,
                approximated_colors = nearest_cache.len(),
                "Mapped colors missing from palette to nearest entry"
            );
        }

        IndexedFrame::new(frame.width(), frame.height(), indices, Arc::clone(&self.palette))
    }

    /// Index for a single color
    pub fn index_of(&self, color: Rgba) -> u8 {
        match self.exact.get(&color) {
            Some(&idx) => idx,
            None => nearest_index(self.palette.colors(), color),
        }
    }
}

fn distance_sq(a: Rgba, b: Rgba) -> u32 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = x as i32 - y as i32;
            (d * d) as u32
        })
        .sum()
}

fn nearest_index(colors: &[Rgba], target: Rgba) -> u8 {
    let mut best_idx = 0usize;
    let mut best_dist = u32::MAX;
    for (idx, &color) in colors.iter().enumerate() {
        let dist = distance_sq(color, target);
        if dist < best_dist {
            best_dist = dist;
            best_idx = idx;
            if dist == 0 {
                break;
            }
        }
    }
    best_idx as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use togif_types::{BLACK, WHITE};

    fn quantizer(colors: Vec<Rgba>) -> FrameQuantizer {
        FrameQuantizer::new(Arc::new(Palette::new(colors).unwrap()))
    }

    #[test]
    fn test_exact_colors_keep_their_index() {
        let colors = vec![BLACK, WHITE, [250, 250, 250, 255], [255, 0, 0, 255]];
        let q = quantizer(colors.clone());
        for (idx, color) in colors.iter().enumerate() {
            assert_eq!(q.index_of(*color) as usize, idx);
        }
    }

    #[test]
    fn test_missing_color_maps_to_nearest() {
        let q = quantizer(vec![BLACK, WHITE, [255, 0, 0, 255]]);
        assert_eq!(q.index_of([240, 10, 10, 255]), 2);
        assert_eq!(q.index_of([30, 30, 30, 255]), 0);
        assert_eq!(q.index_of([220, 220, 220, 255]), 1);
    }

    #[test]
    fn test_equal_distance_prefers_lowest_index() {
        let q = quantizer(vec![[0, 0, 0, 255], [20, 0, 0, 255]]);
        assert_eq!(q.index_of([10, 0, 0, 255]), 0);
    }

    #[test]
    fn test_quantize_frame_shares_palette() {
        let q = quantizer(vec![BLACK, WHITE]);
        let frame = Frame::from_fn(4, 2, |x, _| if x % 2 == 0 { BLACK } else { [200, 200, 200, 255] });
        let indexed = q.quantize(&frame).unwrap();
        assert_eq!(indexed.dimensions(), (4, 2));
        assert_eq!(indexed.indices(), &[0, 1, 0, 1, 0, 1, 0, 1]);
        assert!(Arc::ptr_eq(indexed.palette(), q.palette()));
    }
}
