use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

use gif::{DisposalMethod, Encoder, Repeat};
use togif_types::{IndexedFrame, Palette, TogifError, TogifResult};
use tracing::{debug, info, span, Level};

mod verify;

pub use verify::{inspect_gif, GifSummary};

/// GIF stores frame delays in hundredths of a second
pub const MS_PER_CENTISECOND: i64 = 10;

/// Convert a millisecond delay to the GIF delay field.
///
/// Sub-centisecond remainders are truncated (`105ms -> 10cs`). Negative
/// values and values that overflow the 16-bit field are rejected.
pub fn delay_ms_to_centiseconds(delay_ms: i64) -> TogifResult<u16> {
    if delay_ms < 0 {
        return Err(TogifError::InvalidDelay { delay_ms });
    }
    u16::try_from(delay_ms / MS_PER_CENTISECOND).map_err(|_| TogifError::InvalidDelay { delay_ms })
}

/// Indexed frames plus per-frame delays, all sharing one color table
#[derive(Debug, Clone)]
pub struct AnimatedDocument {
    width: u16,
    height: u16,
    palette: Arc<Palette>,
    frames: Vec<IndexedFrame>,
    delays_cs: Vec<u16>,
}

impl AnimatedDocument {
    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn palette(&self) -> &Arc<Palette> {
        &self.palette
    }

    pub fn frames(&self) -> &[IndexedFrame] {
        &self.frames
    }

    pub fn delays_cs(&self) -> &[u16] {
        &self.delays_cs
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Serialize as GIF89a with a single global color table
    pub fn to_bytes(&self) -> Result<Vec<u8>, gif::EncodingError> {
        let span = span!(Level::INFO, "gif_encode", frames = self.frames.len());
        let _guard = span.enter();

        let mut output = Vec::new();
        let mut encoder = Encoder::new(&mut output, self.width, self.height, &self.palette.rgb_table())?;

        if self.frames.len() > 1 {
            encoder.set_repeat(Repeat::Infinite)?;
        }

        let transparent = self.palette.transparent_index();
        let dispose = if transparent.is_some() {
            DisposalMethod::Background
        } else {
            DisposalMethod::Keep
        };

        for (frame_idx, (frame, &delay)) in self.frames.iter().zip(self.delays_cs.iter()).enumerate() {
            let mut gif_frame = gif::Frame::default();
            gif_frame.width = self.width;
            gif_frame.height = self.height;
            gif_frame.buffer = Cow::Borrowed(frame.indices());
            gif_frame.delay = delay;
            gif_frame.dispose = dispose;
            gif_frame.transparent = transparent;
            encoder.write_frame(&gif_frame)?;
            debug!(stage = "encode", frame_idx = frame_idx, delay_cs = delay, "Frame written");
        }

        // Encoder writes the trailer on drop
        drop(encoder);

        info!(
            stage = "encode",
            frames = self.frames.len(),
            palette_size = self.palette.len(),
            bytes = output.len(),
            "GIF89a encoding complete"
        );
        Ok(output)
    }

    /// Encode and write to `path`, returning the number of bytes written.
    ///
    /// Nothing is created when encoding fails. A failed write may leave a
    /// partial file behind.
    pub fn write_to_path(&self, path: &Path) -> TogifResult<u64> {
        let bytes = self.to_bytes().map_err(|source| TogifError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
        persist(path, &bytes)
    }
}

fn persist(path: &Path, bytes: &[u8]) -> TogifResult<u64> {
    std::fs::write(path, bytes).map_err(|source| TogifError::OutputCreate {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(bytes.len() as u64)
}

/// Combines indexed frames with a uniform delay into a document
#[derive(Debug, Clone)]
pub struct SequenceAssembler {
    verify_output: bool,
}

impl Default for SequenceAssembler {
    fn default() -> Self {
        Self { verify_output: true }
    }
}

impl SequenceAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode every document back after encoding and fail on structural problems
    pub fn with_verification(mut self, verify: bool) -> Self {
        self.verify_output = verify;
        self
    }

    #[tracing::instrument(level = "info", skip(self, frames), fields(frames = frames.len()))]
    pub fn assemble(&self, frames: Vec<IndexedFrame>, delay_ms: i64) -> TogifResult<AnimatedDocument> {
        let delay_cs = delay_ms_to_centiseconds(delay_ms)?;

        let first = frames.first().ok_or_else(|| TogifError::InvalidDocument {
            message: "no frames to encode".to_string(),
        })?;
        let (width, height) = first.dimensions();
        let palette = Arc::clone(first.palette());

        let width = u16::try_from(width).map_err(|_| TogifError::InvalidDocument {
            message: format!("frame width {} exceeds GIF limit of {}", width, u16::MAX),
        })?;
        let height = u16::try_from(height).map_err(|_| TogifError::InvalidDocument {
            message: format!("frame height {} exceeds GIF limit of {}", height, u16::MAX),
        })?;

        for (idx, frame) in frames.iter().enumerate() {
            if frame.dimensions() != (width as u32, height as u32) {
                return Err(TogifError::InvalidDocument {
                    message: format!(
                        "frame {} is {}x{}, expected {}x{}",
                        idx,
                        frame.width(),
                        frame.height(),
                        width,
                        height
                    ),
                });
            }
            if !Arc::ptr_eq(frame.palette(), &palette) {
                return Err(TogifError::InvalidDocument {
                    message: format!("frame {} does not use the shared palette", idx),
                });
            }
        }

        info!(
            stage = "assemble",
            width = width,
            height = height,
            delay_cs = delay_cs,
            palette_size = palette.len(),
            "Document assembled"
        );

        let delays_cs = vec![delay_cs; frames.len()];
        Ok(AnimatedDocument {
            width,
            height,
            palette,
            frames,
            delays_cs,
        })
    }

    /// Encode `document` and write it to `path`, decoding it back first when verification is on
    pub fn write(&self, document: &AnimatedDocument, path: &Path) -> TogifResult<u64> {
        if !self.verify_output {
            return document.write_to_path(path);
        }

        let bytes = document.to_bytes().map_err(|source| TogifError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
        let summary = inspect_gif(&bytes)?;
        if summary.frame_count != document.frame_count() {
            return Err(TogifError::InvalidDocument {
                message: format!(
                    "encoded {} frames, expected {}",
                    summary.frame_count,
                    document.frame_count()
                ),
            });
        }
        debug!(stage = "verify", frames = summary.frame_count, "Encoded GIF verified");
        persist(path, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use togif_types::{BLACK, WHITE};

    fn palette() -> Arc<Palette> {
        Arc::new(Palette::new(vec![BLACK, WHITE]).unwrap())
    }

    fn checker(palette: &Arc<Palette>, w: u32, h: u32) -> IndexedFrame {
        let indices = (0..w * h).map(|i| (i % 2) as u8).collect();
        IndexedFrame::new(w, h, indices, Arc::clone(palette)).unwrap()
    }

    #[test]
    fn test_delay_conversion_truncates() {
        assert_eq!(delay_ms_to_centiseconds(100).unwrap(), 10);
        assert_eq!(delay_ms_to_centiseconds(0).unwrap(), 0);
        assert_eq!(delay_ms_to_centiseconds(9).unwrap(), 0);
        assert_eq!(delay_ms_to_centiseconds(105).unwrap(), 10);
        assert_eq!(delay_ms_to_centiseconds(655_359).unwrap(), u16::MAX);
    }

    #[test]
    fn test_delay_conversion_rejects_invalid() {
        assert!(matches!(
            delay_ms_to_centiseconds(-1),
            Err(TogifError::InvalidDelay { delay_ms: -1 })
        ));
        assert!(delay_ms_to_centiseconds(655_360).is_err());
    }

    #[test]
    fn test_assemble_applies_uniform_delay() {
        let palette = palette();
        let frames = vec![checker(&palette, 4, 4), checker(&palette, 4, 4), checker(&palette, 4, 4)];
        let doc = SequenceAssembler::new().assemble(frames, 100).unwrap();
        assert_eq!(doc.frame_count(), 3);
        assert_eq!(doc.delays_cs(), &[10, 10, 10]);
        assert_eq!((doc.width(), doc.height()), (4, 4));
    }

    #[test]
    fn test_assemble_rejects_empty_and_mismatched() {
        let assembler = SequenceAssembler::new();
        assert!(assembler.assemble(vec![], 100).is_err());

        let palette = palette();
        let mixed = vec![checker(&palette, 4, 4), checker(&palette, 2, 2)];
        assert!(assembler.assemble(mixed, 100).is_err());

        let other = vec![checker(&palette, 4, 4), checker(&self::palette(), 4, 4)];
        assert!(assembler.assemble(other, 100).is_err());
    }

    #[test]
    fn test_assemble_rejects_negative_delay() {
        let palette = palette();
        let result = SequenceAssembler::new().assemble(vec![checker(&palette, 2, 2)], -1);
        assert!(matches!(result, Err(TogifError::InvalidDelay { .. })));
    }

    #[test]
    fn test_encoded_bytes_round_trip_structure() {
        let palette = palette();
        let frames = vec![checker(&palette, 6, 3), checker(&palette, 6, 3)];
        let doc = SequenceAssembler::new().assemble(frames, 250).unwrap();
        let bytes = doc.to_bytes().unwrap();

        let summary = inspect_gif(&bytes).unwrap();
        assert_eq!((summary.width, summary.height), (6, 3));
        assert_eq!(summary.frame_count, 2);
        assert_eq!(summary.delays_cs, vec![25, 25]);
        assert_eq!(summary.global_palette_len, 2);
        assert_eq!(summary.transparent, None);
    }
}
