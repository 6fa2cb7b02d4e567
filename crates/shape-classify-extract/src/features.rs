//! Descriptor computation for extracted regions.

use log::trace;
use nalgebra::{Point2, Vector2};
use shape_classify_core::{is_foreground, MaskView, PixelRect, Region, ShapeDescriptor};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::contour::trace_external_contours;
use crate::moments::contour_moments;
use crate::obb::min_area_box;

/// Compute one descriptor per external contour inside the region's bounding
/// rectangle.
///
/// Degenerate contours (vanishing area moment) produce no descriptor; an
/// empty rectangle therefore yields an empty vector, never an error and
/// never a NaN field.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(mask, region), fields(bounds = ?region.bounds))
)]
pub fn extract_features(mask: &MaskView<'_>, region: &Region) -> Vec<ShapeDescriptor> {
    let rect = region.bounds;
    let percent_filled = filled_fraction(mask, &rect);
    let offset = Vector2::new(rect.x as f32, rect.y as f32);

    let mut descriptors = Vec::new();
    for contour in trace_external_contours(mask, &rect) {
        let moments = contour_moments(&contour);
        let Some(centroid) = moments.centroid() else {
            continue;
        };
        let Some(hu) = moments.hu() else {
            continue;
        };
        let Some(mut obb) = min_area_box(&contour) else {
            continue;
        };

        obb.center += offset;
        let hw_ratio = f64::from(obb.width.min(obb.height) / obb.width.max(obb.height));
        descriptors.push(ShapeDescriptor {
            centroid: Point2::new(centroid.x as f32, centroid.y as f32) + offset,
            hu,
            percent_filled,
            hw_ratio,
            obb,
        });
    }

    trace!(
        "{} descriptor(s) from region at ({}, {})",
        descriptors.len(),
        rect.x,
        rect.y
    );
    descriptors
}

/// Descriptors for every region of a frame, in region order.
pub fn extract_all(mask: &MaskView<'_>, regions: &[Region]) -> Vec<ShapeDescriptor> {
    regions
        .iter()
        .flat_map(|region| extract_features(mask, region))
        .collect()
}

fn filled_fraction(mask: &MaskView<'_>, rect: &PixelRect) -> f64 {
    if rect.area() == 0 {
        return 0.0;
    }
    let mut count = 0usize;
    for y in 0..rect.height {
        for x in 0..rect.width {
            if is_foreground(mask, (rect.x + x) as i32, (rect.y + y) as i32) {
                count += 1;
            }
        }
    }
    count as f64 / rect.area() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RegionExtractor, RegionExtractorParams};
    use approx::assert_relative_eq;
    use shape_classify_core::Mask;

    fn filled_square_mask(x0: usize, y0: usize, side: usize) -> Mask {
        let mut mask = Mask::new(128, 128);
        for y in y0..y0 + side {
            for x in x0..x0 + side {
                mask.data[y * 128 + x] = 255;
            }
        }
        mask
    }

    #[test]
    fn filled_square_descriptor() {
        // A fully filled 40x40 square: the box ratio and the filled
        // fraction both sit at 1.0.
        let mask = filled_square_mask(30, 20, 40);
        let extractor = RegionExtractor::new(RegionExtractorParams::default());
        let regions = extractor.extract(&mask.view());
        assert_eq!(regions.len(), 1);

        let descriptors = extract_features(&mask.view(), &regions[0]);
        assert_eq!(descriptors.len(), 1);
        let d = &descriptors[0];
        assert_relative_eq!(d.hw_ratio, 1.0, epsilon = 1e-6);
        assert_relative_eq!(d.percent_filled, 1.0, epsilon = 1e-9);
        // Centroid sits at the square's center, in frame coordinates.
        assert_relative_eq!(d.centroid.x, 49.5, epsilon = 1e-3);
        assert_relative_eq!(d.centroid.y, 39.5, epsilon = 1e-3);
    }

    #[test]
    fn descriptor_invariants_survive_translation_and_scaling() {
        let small = filled_square_mask(10, 10, 24);
        let large = filled_square_mask(60, 50, 48);
        let extractor = RegionExtractor::new(RegionExtractorParams { min_area: 100 });

        let small_regions = extractor.extract(&small.view());
        let large_regions = extractor.extract(&large.view());
        let a = &extract_features(&small.view(), &small_regions[0])[0];
        let b = &extract_features(&large.view(), &large_regions[0])[0];

        for (x, y) in a.invariants().iter().zip(b.invariants().iter()) {
            assert_relative_eq!(*x, *y, epsilon = 1e-3, max_relative = 1e-2);
        }
    }

    #[test]
    fn region_over_background_yields_nothing() {
        let mask = Mask::new(128, 128);
        let region = Region {
            bounds: PixelRect {
                x: 10,
                y: 10,
                width: 20,
                height: 20,
            },
            area: 0,
        };
        assert!(extract_features(&mask.view(), &region).is_empty());
    }

    #[test]
    fn two_shapes_in_one_rect_give_two_descriptors() {
        // Two blocks whose bounding boxes overlap into a single rect when
        // merged by hand; the crop must still produce one descriptor per
        // component.
        let mut mask = filled_square_mask(10, 10, 10);
        for y in 25..35 {
            for x in 25..35 {
                mask.data[y * 128 + x] = 255;
            }
        }
        let region = Region {
            bounds: PixelRect {
                x: 10,
                y: 10,
                width: 25,
                height: 25,
            },
            area: 200,
        };
        let descriptors = extract_features(&mask.view(), &region);
        assert_eq!(descriptors.len(), 2);
    }
}
