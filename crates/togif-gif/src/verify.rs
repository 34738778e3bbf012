use gif::{ColorOutput, DecodeOptions};
use togif_types::{TogifError, TogifResult};

/// What a decoder sees when reading an encoded document back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GifSummary {
    pub width: u16,
    pub height: u16,
    pub global_palette_len: usize,
    pub frame_count: usize,
    pub delays_cs: Vec<u16>,
    pub transparent: Option<u8>,
}

/// Decode `bytes` and report their structure.
///
/// Fails when the signature, trailer or any frame is unreadable.
pub fn inspect_gif(bytes: &[u8]) -> TogifResult<GifSummary> {
    if bytes.len() < 6 || &bytes[0..6] != b"GIF89a" {
        return Err(TogifError::InvalidDocument {
            message: "missing GIF89a signature".to_string(),
        });
    }
    if bytes.last() != Some(&0x3B) {
        return Err(TogifError::InvalidDocument {
            message: "missing GIF trailer".to_string(),
        });
    }

    let mut options = DecodeOptions::new();
    options.set_color_output(ColorOutput::Indexed);
    let mut decoder = options.read_info(bytes).map_err(|e| TogifError::InvalidDocument {
        message: format!("unreadable GIF header: {}", e),
    })?;

    let width = decoder.width();
    let height = decoder.height();
    let global_palette_len = decoder.global_palette().map_or(0, |p| p.len() / 3);

    let mut delays_cs = Vec::new();
    let mut transparent = None;
    loop {
        let frame_idx = delays_cs.len();
        let frame = match decoder.read_next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(e) => {
                return Err(TogifError::InvalidDocument {
                    message: format!("unreadable frame {}: {}", frame_idx, e),
                })
            }
        };
        delays_cs.push(frame.delay);
        transparent = transparent.or(frame.transparent);
    }

    Ok(GifSummary {
        width,
        height,
        global_palette_len,
        frame_count: delays_cs.len(),
        delays_cs,
        transparent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_wrong_signature() {
        assert!(inspect_gif(b"GIF87a\x3B").is_err());
        assert!(inspect_gif(b"PNG").is_err());
    }

    #[test]
    fn test_rejects_missing_trailer() {
        let result = inspect_gif(b"GIF89a\x01\x00\x01\x00\x00\x00\x00");
        assert!(matches!(result, Err(TogifError::InvalidDocument { .. })));
    }
}
