//! Segmentation collaborator: grayscale frame in, cleaned binary mask out.
//!
//! Fixed inverted thresholding (dark objects against a light background)
//! followed by a morphological opening with a small square structuring
//! element to remove speckle noise. The rest of the pipeline only ever sees
//! the resulting mask.

use serde::{Deserialize, Serialize};
use shape_classify_core::{is_foreground, Mask};

#[derive(thiserror::Error, Debug)]
pub enum SegmentError {
    #[error("invalid grayscale buffer length (expected {expected} bytes, got {got})")]
    InvalidGrayBuffer { expected: usize, got: usize },
}

fn default_threshold() -> u8 {
    127
}

fn default_kernel() -> usize {
    3
}

/// Parameters of the fixed-threshold segmentation stage.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SegmentParams {
    /// Pixels at or below this intensity become foreground.
    #[serde(default = "default_threshold")]
    pub threshold: u8,
    /// Side of the square structuring element used for the opening.
    #[serde(default = "default_kernel")]
    pub kernel: usize,
}

impl Default for SegmentParams {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            kernel: default_kernel(),
        }
    }
}

/// Threshold and clean one grayscale frame.
pub fn mask_from_gray(img: &image::GrayImage, params: &SegmentParams) -> Mask {
    let width = img.width() as usize;
    let height = img.height() as usize;

    let mut mask = Mask::new(width, height);
    for (dst, src) in mask.data.iter_mut().zip(img.as_raw()) {
        *dst = u8::from(*src <= params.threshold);
    }

    open(&mask, params.kernel)
}

/// Validating variant over a raw grayscale buffer.
pub fn mask_from_gray_u8(
    width: u32,
    height: u32,
    pixels: &[u8],
    params: &SegmentParams,
) -> Result<Mask, SegmentError> {
    let expected = width as usize * height as usize;
    if pixels.len() != expected {
        return Err(SegmentError::InvalidGrayBuffer {
            expected,
            got: pixels.len(),
        });
    }
    let img = image::GrayImage::from_raw(width, height, pixels.to_vec()).ok_or(
        SegmentError::InvalidGrayBuffer {
            expected,
            got: pixels.len(),
        },
    )?;
    Ok(mask_from_gray(&img, params))
}

/// Morphological opening: erosion followed by dilation.
fn open(mask: &Mask, kernel: usize) -> Mask {
    if kernel <= 1 {
        return mask.clone();
    }
    let radius = (kernel / 2) as i32;
    dilate(&erode(mask, radius), radius)
}

fn erode(mask: &Mask, radius: i32) -> Mask {
    morph(mask, radius, true)
}

fn dilate(mask: &Mask, radius: i32) -> Mask {
    morph(mask, radius, false)
}

fn morph(mask: &Mask, radius: i32, eroding: bool) -> Mask {
    let view = mask.view();
    let mut out = Mask::new(mask.width, mask.height);

    for y in 0..mask.height {
        for x in 0..mask.width {
            let mut value = eroding;
            'window: for dy in -radius..=radius {
                for dx in -radius..=radius {
                    let fg = is_foreground(&view, x as i32 + dx, y as i32 + dy);
                    if eroding && !fg {
                        value = false;
                        break 'window;
                    }
                    if !eroding && fg {
                        value = true;
                        break 'window;
                    }
                }
            }
            out.data[y * mask.width + x] = u8::from(value);
        }
    }
    out
}
