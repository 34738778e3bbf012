use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgba};
use togif_types::{Frame, TRANSPARENT};
use tracing::debug;

type Rgba32FImage = ImageBuffer<Rgba<f32>, Vec<f32>>;

/// Brings every frame onto the bounds of the first frame it sees.
///
/// Frames that already match are passed through untouched. Mismatched frames
/// are resampled with a Catmull-Rom kernel in premultiplied-alpha space so
/// that transparent edges do not bleed their (invisible) color into the
/// opaque neighbourhood.
#[derive(Debug, Clone)]
pub struct GeometryNormalizer {
    reference: Option<(u32, u32)>,
    filter: FilterType,
}

impl Default for GeometryNormalizer {
    fn default() -> Self {
        Self {
            reference: None,
            filter: FilterType::CatmullRom,
        }
    }
}

impl GeometryNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a known reference instead of adopting the first frame's size
    pub fn with_reference(mut self, width: u32, height: u32) -> Self {
        self.reference = Some((width, height));
        self
    }

    pub fn reference(&self) -> Option<(u32, u32)> {
        self.reference
    }

    pub fn normalize(&mut self, frame: Frame) -> Frame {
        let (width, height) = *self.reference.get_or_insert(frame.dimensions());
        if frame.dimensions() == (width, height) {
            return frame;
        }

        debug!(
            stage = "normalize",
            from_w = frame.width(),
            from_h = frame.height(),
            to_w = width,
            to_h = height,
            "Resampling frame onto reference bounds"
        );
        resample(&frame, width, height, self.filter)
    }
}

/// Resample `frame` to exactly `width`×`height`
pub fn resample(frame: &Frame, width: u32, height: u32, filter: FilterType) -> Frame {
    if width == 0 || height == 0 {
        return Frame::filled(width, height, TRANSPARENT);
    }
    if frame.pixel_count() == 0 {
        return Frame::filled(width, height, TRANSPARENT);
    }

    let premultiplied: Vec<f32> = frame
        .pixels()
        .flat_map(|[r, g, b, a]| {
            let alpha = a as f32 / 255.0;
            [
                r as f32 / 255.0 * alpha,
                g as f32 / 255.0 * alpha,
                b as f32 / 255.0 * alpha,
                alpha,
            ]
        })
        .collect();

    let source = match Rgba32FImage::from_raw(frame.width(), frame.height(), premultiplied) {
        Some(image) => image,
        None => return Frame::filled(width, height, TRANSPARENT),
    };

    let resized = imageops::resize(&source, width, height, filter);

    Frame::from_fn(width, height, |x, y| unpremultiply(resized.get_pixel(x, y).0))
}

fn unpremultiply([r, g, b, a]: [f32; 4]) -> [u8; 4] {
    let alpha = a.clamp(0.0, 1.0);
    if alpha <= f32::EPSILON {
        return TRANSPARENT;
    }
    let channel = |v: f32| ((v / alpha).clamp(0.0, 1.0) * 255.0).round() as u8;
    [channel(r), channel(g), channel(b), (alpha * 255.0).round() as u8]
}
