use serde::{Deserialize, Serialize};
use togif_types::{Frame, Palette, Rgba, TogifResult, BLACK, MAX_PALETTE_COLORS, WHITE};
use tracing::{debug, info};

use crate::histogram::ColorHistogram;

/// Fixed table used by the early releases of the converter. Kept only as an
/// explicitly selected degraded mode.
pub const LEGACY_PALETTE: [Rgba; 9] = [
    [0, 0, 0, 255],       // Black
    [255, 255, 255, 255], // White
    [255, 0, 0, 255],     // Red
    [0, 255, 0, 255],     // Green
    [0, 0, 255, 255],     // Blue
    [255, 255, 0, 255],   // Yellow
    [255, 0, 255, 255],   // Magenta
    [0, 255, 255, 255],   // Cyan
    [128, 128, 128, 255], // Gray
];

/// Used when nothing was observed; an empty color table is not a valid GIF
pub const FALLBACK_PALETTE: [Rgba; 2] = [BLACK, WHITE];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteStrategy {
    /// Keep every observed color, or the most frequent ones past the cap
    #[default]
    FrequencyRanked,
    /// Ignore the input and use [`LEGACY_PALETTE`]
    Legacy,
}

/// Turns an observed color histogram into the shared palette
#[derive(Debug, Clone)]
pub struct PaletteBuilder {
    max_colors: usize,
    strategy: PaletteStrategy,
}

impl Default for PaletteBuilder {
    fn default() -> Self {
        Self {
            max_colors: MAX_PALETTE_COLORS,
            strategy: PaletteStrategy::FrequencyRanked,
        }
    }
}

impl PaletteBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clamped to 2..=256
    pub fn with_max_colors(mut self, max_colors: usize) -> Self {
        self.max_colors = max_colors.clamp(FALLBACK_PALETTE.len(), MAX_PALETTE_COLORS);
        self
    }

    pub fn with_strategy(mut self, strategy: PaletteStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn max_colors(&self) -> usize {
        self.max_colors
    }

    pub fn strategy(&self) -> PaletteStrategy {
        self.strategy
    }

    /// Derive the palette from a finished histogram.
    ///
    /// Colors are ordered by descending count, ties by ascending channel
    /// tuple. When the corpus holds no more than `max_colors` distinct colors
    /// all of them are kept; otherwise only the top `max_colors` survive.
    #[tracing::instrument(level = "debug", skip_all, fields(distinct = histogram.distinct_colors()))]
    pub fn build(&self, histogram: &ColorHistogram) -> TogifResult<Palette> {
        if self.strategy == PaletteStrategy::Legacy {
            info!(stage = "palette", strategy = "legacy", colors = LEGACY_PALETTE.len(), "Using fixed legacy palette");
            return Palette::new(LEGACY_PALETTE.to_vec());
        }

        if histogram.is_empty() {
            info!(stage = "palette", "No colors observed, using black/white fallback");
            return Palette::new(FALLBACK_PALETTE.to_vec());
        }

        let ranked = histogram.ranked();
        let truncated = ranked.len() > self.max_colors;
        let colors: Vec<Rgba> = ranked
            .into_iter()
            .take(self.max_colors)
            .map(|(color, _)| color)
            .collect();

        if truncated {
            let cutoff = histogram.count(&colors[colors.len() - 1]);
            debug!(stage = "palette", cutoff_count = cutoff, "Discarded colors below frequency cutoff");
        }

        info!(
            stage = "palette",
            distinct_colors = histogram.distinct_colors(),
            palette_size = colors.len(),
            truncated = truncated,
            "Palette built"
        );

        Palette::new(colors)
    }

    /// Sample every frame then build; the one-call form of the first pass
    pub fn build_from_frames<'a>(&self, frames: impl IntoIterator<Item = &'a Frame>) -> TogifResult<Palette> {
        self.build(&ColorHistogram::from_frames(frames))
    }
}
