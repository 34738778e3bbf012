//! Turn a sequence of PNG frames into one animated GIF.
//!
//! Typical use resolves the user's patterns, then hands the file list to
//! [`convert_files`]:
//!
//! ```no_run
//! use std::path::Path;
//! use togif::{convert_files, resolve_patterns, ConvertConfig, NoopSink};
//!
//! let files = resolve_patterns(&["frames/frame[0-9]+\\.png"])?;
//! let report = convert_files(&files, Path::new("out.gif"), ConvertConfig::default(), &NoopSink)?;
//! println!("{} frames, {} colors", report.frames, report.palette_size);
//! # Ok::<(), togif::TogifError>(())
//! ```

pub mod convert;
pub mod input;
pub mod progress;
pub mod source;
pub mod validate;

pub use convert::{convert_files, ConversionReport, ConvertConfig, Converter, ENCODING_ITEM};
pub use input::{has_allowed_extension, resolve_pattern, resolve_patterns, ALLOWED_EXTENSIONS};
pub use progress::{progress_channel, ChannelSink, NoopSink, ProgressSink};
pub use source::{load_frame, FileSource, FrameSource, MemorySource};
pub use validate::validate_inputs;

pub use togif_quant::PaletteStrategy;
pub use togif_types::{Frame, ProgressEvent, Stage, TogifError, TogifResult, DEFAULT_DELAY_MS};
