//! Region extraction and invariant shape features for binary masks.
//!
//! The pipeline runs in two stages:
//! 1. [`RegionExtractor`] finds connected foreground components and reduces
//!    each to its tight bounding rectangle.
//! 2. [`extract_features`] traces the external contours inside a rectangle
//!    and computes one [`ShapeDescriptor`](shape_classify_core::ShapeDescriptor)
//!    per contour: Hu moment invariants, filled fraction and oriented-box
//!    side ratio, plus centroid and box for display.
//!
//! Both stages are deterministic for a fixed input mask: regions and
//! contours come out in raster order of their first-seen pixel.

mod contour;
mod features;
mod moments;
mod obb;
mod regions;

pub use contour::trace_external_contours;
pub use features::{extract_all, extract_features};
pub use moments::{contour_moments, ContourMoments};
pub use obb::{convex_hull, min_area_box};
pub use regions::{RegionExtractor, RegionExtractorParams};
