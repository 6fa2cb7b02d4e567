use log::debug;
use serde::{Deserialize, Serialize};
use shape_classify_core::{is_foreground, MaskView, PixelRect, Region};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Parameters for connected-component region extraction.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct RegionExtractorParams {
    /// Components with at most this many pixels are dropped as noise.
    pub min_area: usize,
}

impl Default for RegionExtractorParams {
    fn default() -> Self {
        Self { min_area: 500 }
    }
}

/// Finds connected foreground components in a binary mask.
pub struct RegionExtractor {
    params: RegionExtractorParams,
}

pub(crate) const NEIGHBORS_8: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

impl RegionExtractor {
    pub fn new(params: RegionExtractorParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &RegionExtractorParams {
        &self.params
    }

    /// Extract all sufficiently large 8-connected foreground components,
    /// each reduced to its tight bounding rectangle.
    ///
    /// Components are reported in raster order of their first-seen pixel,
    /// so identical masks always yield identical region order.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, mask), fields(width = mask.width, height = mask.height))
    )]
    pub fn extract(&self, mask: &MaskView<'_>) -> Vec<Region> {
        let mut visited = vec![false; mask.width * mask.height];
        let mut regions = Vec::new();

        for y in 0..mask.height {
            for x in 0..mask.width {
                let idx = y * mask.width + x;
                if visited[idx] || mask.data[idx] == 0 {
                    continue;
                }
                let region = flood_component(mask, &mut visited, x, y);
                if region.area > self.params.min_area {
                    regions.push(region);
                }
            }
        }

        debug!("{} region(s) above min_area", regions.len());
        regions
    }
}

fn flood_component(mask: &MaskView<'_>, visited: &mut [bool], x0: usize, y0: usize) -> Region {
    let mut queue = vec![(x0, y0)];
    visited[y0 * mask.width + x0] = true;

    let (mut min_x, mut min_y, mut max_x, mut max_y) = (x0, y0, x0, y0);
    let mut area = 0usize;

    while let Some((x, y)) = queue.pop() {
        area += 1;
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);

        for (dx, dy) in NEIGHBORS_8 {
            let nx = x as i32 + dx;
            let ny = y as i32 + dy;
            if !is_foreground(mask, nx, ny) {
                continue;
            }
            let nidx = ny as usize * mask.width + nx as usize;
            if !visited[nidx] {
                visited[nidx] = true;
                queue.push((nx as usize, ny as usize));
            }
        }
    }

    Region {
        bounds: PixelRect {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        },
        area,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shape_classify_core::Mask;

    fn mask_with_squares(squares: &[(usize, usize, usize)]) -> Mask {
        // (x0, y0, side) triples on a 128x128 canvas
        let mut mask = Mask::new(128, 128);
        for &(x0, y0, side) in squares {
            for y in y0..y0 + side {
                for x in x0..x0 + side {
                    mask.data[y * 128 + x] = 255;
                }
            }
        }
        mask
    }

    #[test]
    fn small_components_are_dropped_silently() {
        let mask = mask_with_squares(&[(10, 10, 8), (40, 40, 30)]);
        let extractor = RegionExtractor::new(RegionExtractorParams { min_area: 500 });
        let regions = extractor.extract(&mask.view());
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].area, 900);
        assert_eq!(
            regions[0].bounds,
            PixelRect {
                x: 40,
                y: 40,
                width: 30,
                height: 30
            }
        );
    }

    #[test]
    fn regions_come_out_in_raster_order() {
        let mask = mask_with_squares(&[(60, 5, 12), (5, 20, 12), (90, 40, 12)]);
        let extractor = RegionExtractor::new(RegionExtractorParams { min_area: 50 });
        let regions = extractor.extract(&mask.view());
        assert_eq!(regions.len(), 3);
        assert_eq!(regions[0].bounds.y, 5);
        assert_eq!(regions[1].bounds.y, 20);
        assert_eq!(regions[2].bounds.y, 40);
    }

    #[test]
    fn extraction_is_deterministic() {
        let mask = mask_with_squares(&[(10, 10, 20), (60, 60, 25)]);
        let extractor = RegionExtractor::new(RegionExtractorParams { min_area: 100 });
        let first = extractor.extract(&mask.view());
        let second = extractor.extract(&mask.view());
        assert_eq!(first, second);
    }

    #[test]
    fn diagonal_touch_is_one_component() {
        let mut mask = Mask::new(16, 16);
        for y in 2..6 {
            for x in 2..6 {
                mask.data[y * 16 + x] = 1;
            }
        }
        for y in 6..10 {
            for x in 6..10 {
                mask.data[y * 16 + x] = 1;
            }
        }
        let extractor = RegionExtractor::new(RegionExtractorParams { min_area: 10 });
        let regions = extractor.extract(&mask.view());
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].area, 32);
    }
}
