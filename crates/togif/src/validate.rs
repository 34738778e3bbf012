use std::path::PathBuf;

use togif_types::{TogifError, TogifResult};

use crate::input::has_allowed_extension;

/// Check that there is at least one input and every input is an existing PNG
pub fn validate_inputs(files: &[PathBuf]) -> TogifResult<()> {
    if files.is_empty() {
        return Err(TogifError::NoInputFiles);
    }

    for file in files {
        if !file.exists() {
            return Err(TogifError::FileMissing { path: file.clone() });
        }
        if !has_allowed_extension(file) {
            return Err(TogifError::UnsupportedExtension { path: file.clone() });
        }
    }
    Ok(())
}
