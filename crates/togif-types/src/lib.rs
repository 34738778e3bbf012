use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

mod error;

pub use error::{TogifError, TogifResult};

/// Indexed-color formats cap the color table at 256 entries
pub const MAX_PALETTE_COLORS: usize = 256;
pub const DEFAULT_DELAY_MS: i64 = 100;

/// One pixel as its exact (R, G, B, A) channel tuple
pub type Rgba = [u8; 4];

pub const BLACK: Rgba = [0, 0, 0, 255];
pub const WHITE: Rgba = [255, 255, 255, 255];
pub const TRANSPARENT: Rgba = [0, 0, 0, 0];

/// Immutable true-color raster with tight RGBA rows.
///
/// Fully transparent pixels are stored as [`TRANSPARENT`] whatever color the
/// source kept under them, so invisible pixels never split into separate
/// palette entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Frame {
    pub fn from_rgba(width: u32, height: u32, mut data: Vec<u8>) -> TogifResult<Self> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(TogifError::InvalidFrameData {
                message: format!(
                    "expected {} bytes for {}x{}, got {}",
                    expected,
                    width,
                    height,
                    data.len()
                ),
            });
        }
        for px in data.chunks_exact_mut(4) {
            if px[3] == 0 {
                px.copy_from_slice(&TRANSPARENT);
            }
        }
        Ok(Self { width, height, data })
    }

    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        Self::from_fn(width, height, |_, _| color)
    }

    pub fn from_fn(width: u32, height: u32, mut pixel: impl FnMut(u32, u32) -> Rgba) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                let px = pixel(x, y);
                data.extend_from_slice(if px[3] == 0 { &TRANSPARENT } else { &px });
            }
        }
        Self { width, height, data }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn as_rgba(&self) -> &[u8] {
        &self.data
    }

    /// Pixels in row-major order
    pub fn pixels(&self) -> impl Iterator<Item = Rgba> + '_ {
        self.data
            .chunks_exact(4)
            .map(|px| [px[0], px[1], px[2], px[3]])
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ])
    }
}

/// Ordered table of at most 256 distinct colors.
///
/// Construction is the only place the invariants are checked; once built a
/// palette is shared read-only (usually behind an `Arc`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Rgba>", into = "Vec<Rgba>")]
pub struct Palette {
    colors: Vec<Rgba>,
}

impl Palette {
    pub fn new(colors: Vec<Rgba>) -> TogifResult<Self> {
        if colors.is_empty() {
            return Err(TogifError::InvalidDocument {
                message: "empty palette".to_string(),
            });
        }
        if colors.len() > MAX_PALETTE_COLORS {
            return Err(TogifError::InvalidDocument {
                message: format!(
                    "palette too large: {} colors (max {})",
                    colors.len(),
                    MAX_PALETTE_COLORS
                ),
            });
        }
        let mut seen = HashSet::with_capacity(colors.len());
        if let Some(dup) = colors.iter().find(|c| !seen.insert(**c)) {
            return Err(TogifError::InvalidDocument {
                message: format!("duplicate palette entry {:?}", dup),
            });
        }
        Ok(Self { colors })
    }

    pub fn colors(&self) -> &[Rgba] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn get(&self, index: u8) -> Option<Rgba> {
        self.colors.get(index as usize).copied()
    }

    pub fn contains(&self, color: &Rgba) -> bool {
        self.colors.contains(color)
    }

    /// Flat RGB bytes as stored in a GIF color table (alpha dropped)
    pub fn rgb_table(&self) -> Vec<u8> {
        self.colors
            .iter()
            .flat_map(|&[r, g, b, _]| [r, g, b])
            .collect()
    }

    /// First fully transparent entry, if any
    pub fn transparent_index(&self) -> Option<u8> {
        self.colors
            .iter()
            .position(|c| c[3] == 0)
            .map(|idx| idx as u8)
    }
}

impl TryFrom<Vec<Rgba>> for Palette {
    type Error = TogifError;

    fn try_from(colors: Vec<Rgba>) -> TogifResult<Self> {
        Palette::new(colors)
    }
}

impl From<Palette> for Vec<Rgba> {
    fn from(palette: Palette) -> Self {
        palette.colors
    }
}

/// Grid of palette indices referencing one shared palette
#[derive(Debug, Clone)]
pub struct IndexedFrame {
    width: u32,
    height: u32,
    indices: Vec<u8>,
    palette: Arc<Palette>,
}

impl IndexedFrame {
    pub fn new(
        width: u32,
        height: u32,
        indices: Vec<u8>,
        palette: Arc<Palette>,
    ) -> TogifResult<Self> {
        let expected = width as usize * height as usize;
        if indices.len() != expected {
            return Err(TogifError::InvalidFrameData {
                message: format!(
                    "expected {} indices for {}x{}, got {}",
                    expected,
                    width,
                    height,
                    indices.len()
                ),
            });
        }
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= palette.len()) {
            return Err(TogifError::InvalidFrameData {
                message: format!("index {} outside palette of {} colors", bad, palette.len()),
            });
        }
        Ok(Self {
            width,
            height,
            indices,
            palette,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    pub fn palette(&self) -> &Arc<Palette> {
        &self.palette
    }

    pub fn shares_palette_with(&self, other: &IndexedFrame) -> bool {
        Arc::ptr_eq(&self.palette, &other.palette)
    }

    /// Resolve an index back to its palette color
    pub fn color_at(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = self.indices[y as usize * self.width as usize + x as usize];
        self.palette.get(index)
    }
}

/// Which part of the conversion a progress event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Sampling,
    Quantizing,
    Encoding,
    Finished,
}

/// Progress update sent to an external display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub stage: Stage,
    pub current_item: String,
    pub processed: usize,
    pub total: usize,
    pub output_path: Option<PathBuf>,
}

impl ProgressEvent {
    pub fn new(stage: Stage, current_item: impl Into<String>, processed: usize, total: usize) -> Self {
        Self {
            stage,
            current_item: current_item.into(),
            processed,
            total,
            output_path: None,
        }
    }

    pub fn finished(output_path: PathBuf, total: usize) -> Self {
        Self {
            stage: Stage::Finished,
            current_item: output_path.display().to_string(),
            processed: total,
            total,
            output_path: Some(output_path),
        }
    }

    /// Displays stop consuming after this event
    pub fn is_terminal(&self) -> bool {
        self.stage == Stage::Finished
    }

    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            return 1.0;
        }
        (self.processed as f32 / self.total as f32).min(1.0)
    }
}
