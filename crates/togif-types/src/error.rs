use std::path::PathBuf;
use thiserror::Error;

/// Structured error taxonomy with stable codes
#[derive(Error, Debug)]
pub enum TogifError {
    // Input errors (E_INPUT_*)
    #[error("E_INPUT_EMPTY: no input files specified")]
    NoInputFiles,

    #[error("E_INPUT_DIR: directory does not exist: {}", dir.display())]
    DirectoryMissing { dir: PathBuf },

    #[error("E_INPUT_NOMATCH: no PNG files found matching pattern: {pattern}")]
    NoMatches { pattern: String },

    #[error("E_INPUT_PATTERN: invalid pattern {pattern}: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("E_INPUT_EXT: file {} is not a PNG", path.display())]
    UnsupportedExtension { path: PathBuf },

    #[error("E_INPUT_MISSING: file does not exist: {}", path.display())]
    FileMissing { path: PathBuf },

    #[error("E_INPUT_IO: error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("E_INPUT_FRAME: invalid RGBA frame: {message}")]
    InvalidFrameData { message: String },

    // Decode errors (E_DECODE)
    #[error("E_DECODE: error decoding image {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    // Validation errors (E_VALIDATION_*)
    #[error("E_VALIDATION_DELAY: invalid frame delay {delay_ms}ms")]
    InvalidDelay { delay_ms: i64 },

    #[error("E_VALIDATION_DOCUMENT: invalid document: {message}")]
    InvalidDocument { message: String },

    // Output errors (E_OUTPUT_*)
    #[error("E_OUTPUT_CREATE: error creating output file {}: {source}", path.display())]
    OutputCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("E_OUTPUT_ENCODE: error encoding GIF {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: gif::EncodingError,
    },
}

impl TogifError {
    /// Get structured error code for logging
    pub fn code(&self) -> &'static str {
        match self {
            TogifError::NoInputFiles => "E_INPUT_EMPTY",
            TogifError::DirectoryMissing { .. } => "E_INPUT_DIR",
            TogifError::NoMatches { .. } => "E_INPUT_NOMATCH",
            TogifError::InvalidPattern { .. } => "E_INPUT_PATTERN",
            TogifError::UnsupportedExtension { .. } => "E_INPUT_EXT",
            TogifError::FileMissing { .. } => "E_INPUT_MISSING",
            TogifError::Io { .. } => "E_INPUT_IO",
            TogifError::InvalidFrameData { .. } => "E_INPUT_FRAME",

            TogifError::Decode { .. } => "E_DECODE",

            TogifError::InvalidDelay { .. } => "E_VALIDATION_DELAY",
            TogifError::InvalidDocument { .. } => "E_VALIDATION_DOCUMENT",

            TogifError::OutputCreate { .. } => "E_OUTPUT_CREATE",
            TogifError::Encode { .. } => "E_OUTPUT_ENCODE",
        }
    }

    /// True for failures caused by the caller's inputs rather than by I/O on the output side.
    pub fn is_input_error(&self) -> bool {
        self.code().starts_with("E_INPUT") || matches!(self, TogifError::Decode { .. })
    }
}

pub type TogifResult<T> = Result<T, TogifError>;
