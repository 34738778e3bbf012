use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use togif_gif::{delay_ms_to_centiseconds, SequenceAssembler};
use togif_quant::{ColorHistogram, FrameQuantizer, GeometryNormalizer, PaletteBuilder, PaletteStrategy};
use togif_types::{ProgressEvent, Stage, TogifError, TogifResult, DEFAULT_DELAY_MS};
use tracing::{debug, info, span, Level};

use crate::progress::ProgressSink;
use crate::source::{FileSource, FrameSource};
use crate::validate::validate_inputs;

/// Label of the single event sent between quantization and encoding
pub const ENCODING_ITEM: &str = "Creating output GIF";

/// Conversion settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertConfig {
    /// Display time of every frame, truncated to hundredths of a second
    pub delay_ms: i64,
    pub palette: PaletteStrategy,
    /// Decode the encoded GIF before writing it
    pub verify_output: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_DELAY_MS,
            palette: PaletteStrategy::FrequencyRanked,
            verify_output: true,
        }
    }
}

impl ConvertConfig {
    pub fn with_delay_ms(mut self, delay_ms: i64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn with_palette_strategy(mut self, palette: PaletteStrategy) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_verification(mut self, verify: bool) -> Self {
        self.verify_output = verify;
        self
    }
}

/// What a finished conversion produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionReport {
    pub frames: usize,
    pub width: u16,
    pub height: u16,
    pub palette_size: usize,
    pub distinct_colors: usize,
    pub delay_cs: u16,
    pub output_path: PathBuf,
    pub bytes: u64,
}

/// Two-pass frame sequence to GIF conversion.
///
/// Pass one normalizes every frame to the first frame's size and counts its
/// colors. The palette is cut from those counts. Pass two loads and
/// normalizes each frame again and remaps it onto the palette. Nothing is
/// written until every frame has been quantized, so any failure leaves the
/// output path untouched.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: ConvertConfig,
}

impl Converter {
    pub fn new(config: ConvertConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    pub fn convert<S>(&self, source: &S, output: &Path, sink: &dyn ProgressSink) -> TogifResult<ConversionReport>
    where
        S: FrameSource + ?Sized,
    {
        let span = span!(Level::INFO, "convert", frames = source.len(), output = %output.display());
        let _guard = span.enter();

        let delay_cs = delay_ms_to_centiseconds(self.config.delay_ms)?;
        if source.is_empty() {
            return Err(TogifError::NoInputFiles);
        }
        let total = source.len();

        let mut normalizer = GeometryNormalizer::new();
        let mut histogram = ColorHistogram::new();
        for idx in 0..total {
            let frame = normalizer.normalize(source.load(idx)?);
            histogram.observe(&frame);
            sink.emit(ProgressEvent::new(Stage::Sampling, source.name(idx), idx + 1, total));
        }
        info!(
            stage = "sample",
            frames = total,
            distinct_colors = histogram.distinct_colors(),
            pixels = histogram.total_pixels(),
            "Sampling pass complete"
        );

        let palette = PaletteBuilder::new()
            .with_strategy(self.config.palette)
            .build(&histogram)?;
        let distinct_colors = histogram.distinct_colors();
        drop(histogram);

        let quantizer = FrameQuantizer::new(Arc::new(palette));
        let mut indexed = Vec::with_capacity(total);
        for idx in 0..total {
            let frame = normalizer.normalize(source.load(idx)?);
            indexed.push(quantizer.quantize(&frame)?);
            sink.emit(ProgressEvent::new(Stage::Quantizing, source.name(idx), idx + 1, total));
            debug!(stage = "quantize", frame_idx = idx, "Frame quantized");
        }

        sink.emit(ProgressEvent::new(Stage::Encoding, ENCODING_ITEM, total, total));
        let assembler = SequenceAssembler::new().with_verification(self.config.verify_output);
        let document = assembler.assemble(indexed, self.config.delay_ms)?;
        let bytes = assembler.write(&document, output)?;

        sink.emit(ProgressEvent::finished(output.to_path_buf(), total));
        info!(
            stage = "done",
            frames = total,
            palette_size = document.palette().len(),
            bytes = bytes,
            "Conversion complete"
        );

        Ok(ConversionReport {
            frames: document.frame_count(),
            width: document.width(),
            height: document.height(),
            palette_size: document.palette().len(),
            distinct_colors,
            delay_cs,
            output_path: output.to_path_buf(),
            bytes,
        })
    }
}

/// Validate `inputs` and convert them, in order, into one GIF at `output`
pub fn convert_files(
    inputs: &[PathBuf],
    output: &Path,
    config: ConvertConfig,
    sink: &dyn ProgressSink,
) -> TogifResult<ConversionReport> {
    validate_inputs(inputs)?;
    let source = FileSource::new(inputs.to_vec());
    Converter::new(config).convert(&source, output, sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoopSink;
    use crate::source::MemorySource;
    use togif_types::Frame;

    #[test]
    fn test_default_config() {
        let config = ConvertConfig::default();
        assert_eq!(config.delay_ms, 100);
        assert_eq!(config.palette, PaletteStrategy::FrequencyRanked);
        assert!(config.verify_output);
    }

    #[test]
    fn test_empty_source_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.gif");
        let result = Converter::default().convert(&MemorySource::new(), &output, &NoopSink);
        assert!(matches!(result, Err(TogifError::NoInputFiles)));
        assert!(!output.exists());
    }

    #[test]
    fn test_report_describes_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.gif");
        let source: MemorySource = vec![
            Frame::filled(8, 4, [255, 0, 0, 255]),
            Frame::filled(8, 4, [0, 0, 255, 255]),
        ]
        .into_iter()
        .collect();

        let report = Converter::new(ConvertConfig::default().with_delay_ms(250))
            .convert(&source, &output, &NoopSink)
            .unwrap();

        assert_eq!(report.frames, 2);
        assert_eq!((report.width, report.height), (8, 4));
        assert_eq!(report.palette_size, 2);
        assert_eq!(report.distinct_colors, 2);
        assert_eq!(report.delay_cs, 25);
        assert_eq!(report.bytes, std::fs::metadata(&output).unwrap().len());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["palette_size"], 2);
        assert_eq!(json["output_path"], output.display().to_string());
    }

    #[test]
    fn test_legacy_palette_is_fixed() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("legacy.gif");
        let source: MemorySource = vec![Frame::filled(2, 2, [10, 20, 30, 255])].into_iter().collect();

        let report = Converter::new(ConvertConfig::default().with_palette_strategy(PaletteStrategy::Legacy))
            .convert(&source, &output, &NoopSink)
            .unwrap();
        assert_eq!(report.palette_size, togif_quant::LEGACY_PALETTE.len());
    }
}
