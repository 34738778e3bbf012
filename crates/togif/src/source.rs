use std::path::{Path, PathBuf};

use togif_types::{Frame, TogifError, TogifResult};
use tracing::debug;

/// Ordered, re-readable collection of frames.
///
/// The converter reads every frame twice (once to sample colors, once to
/// quantize), so `load` must return the same frame each time it is called
/// with the same index.
pub trait FrameSource {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Label used in progress events and logs
    fn name(&self, index: usize) -> String;

    fn load(&self, index: usize) -> TogifResult<Frame>;
}

/// Decode an image file into a true-color frame
pub fn load_frame(path: &Path) -> TogifResult<Frame> {
    let image = image::open(path).map_err(|e| match e {
        image::ImageError::IoError(source) => TogifError::Io {
            path: path.to_path_buf(),
            source,
        },
        source => TogifError::Decode {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    debug!(path = %path.display(), width = width, height = height, "Decoded frame");
    Frame::from_rgba(width, height, rgba.into_raw())
}

fn out_of_range(index: usize, len: usize) -> TogifError {
    TogifError::InvalidFrameData {
        message: format!("frame index {} out of range for {} frames", index, len),
    }
}

/// Frames decoded on demand from image files
#[derive(Debug, Clone)]
pub struct FileSource {
    paths: Vec<PathBuf>,
}

impl FileSource {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

impl FrameSource for FileSource {
    fn len(&self) -> usize {
        self.paths.len()
    }

    fn name(&self, index: usize) -> String {
        self.paths
            .get(index)
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    }

    fn load(&self, index: usize) -> TogifResult<Frame> {
        let path = self
            .paths
            .get(index)
            .ok_or_else(|| out_of_range(index, self.paths.len()))?;
        load_frame(path)
    }
}

/// Frames already held in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    frames: Vec<(String, Frame)>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FromIterator<Frame> for MemorySource {
    fn from_iter<I: IntoIterator<Item = Frame>>(iter: I) -> Self {
        let frames = iter
            .into_iter()
            .enumerate()
            .map(|(idx, frame)| (format!("frame {}", idx), frame))
            .collect();
        Self { frames }
    }
}

impl FrameSource for MemorySource {
    fn len(&self) -> usize {
        self.frames.len()
    }

    fn name(&self, index: usize) -> String {
        self.frames
            .get(index)
            .map(|(name, _)| name.clone())
            .unwrap_or_default()
    }

    fn load(&self, index: usize) -> TogifResult<Frame> {
        self.frames
            .get(index)
            .map(|(_, frame)| frame.clone())
            .ok_or_else(|| out_of_range(index, self.frames.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source_names() {
        let source: MemorySource = vec![Frame::filled(1, 1, [0, 0, 0, 255]); 2].into_iter().collect();
        assert_eq!(source.len(), 2);
        assert_eq!(source.name(1), "frame 1");
        assert!(source.load(1).is_ok());
    }

    #[test]
    fn test_out_of_range_index_names_the_index() {
        let memory: MemorySource = vec![Frame::filled(1, 1, [0, 0, 0, 255])].into_iter().collect();
        let files = FileSource::new(vec![PathBuf::from("a.png")]);

        for err in [memory.load(2).unwrap_err(), files.load(5).unwrap_err()] {
            assert!(matches!(err, TogifError::InvalidFrameData { .. }), "{:?}", err);
        }
        assert!(memory.load(2).unwrap_err().to_string().contains("index 2"));
        assert!(files.load(5).unwrap_err().to_string().contains("index 5 out of range for 1 frames"));
    }

    #[test]
    fn test_load_frame_reports_decode_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();

        let err = load_frame(&path).unwrap_err();
        assert_eq!(err.code(), "E_DECODE");
        assert!(err.to_string().contains("broken.png"));
    }

    #[test]
    fn test_load_frame_reads_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        image::RgbaImage::from_pixel(3, 2, image::Rgba([1, 2, 3, 4]))
            .save(&path)
            .unwrap();

        let frame = load_frame(&path).unwrap();
        assert_eq!(frame.dimensions(), (3, 2));
        assert!(frame.pixels().all(|px| px == [1, 2, 3, 4]));
    }
}
