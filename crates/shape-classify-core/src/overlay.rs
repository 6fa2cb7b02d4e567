use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::ShapeDescriptor;

/// Label text is drawn a fixed distance right of the centroid marker.
const LABEL_OFFSET_PX: f32 = 20.0;

/// Drawing primitives for one classified region.
///
/// The core never renders anything; a display collaborator turns these into
/// pixels (centroid marker, box edges, label text).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegionOverlay {
    /// Centroid marker position in frame coordinates.
    pub centroid: Point2<f32>,
    /// Oriented bounding box corners in drawing order.
    pub box_corners: [Point2<f32>; 4],
    /// Anchor point for the label text.
    pub label_anchor: Point2<f32>,
    /// Predicted or operator-assigned label, if any.
    pub label: Option<String>,
}

impl RegionOverlay {
    pub fn from_descriptor(shape: &ShapeDescriptor, label: Option<&str>) -> Self {
        Self {
            centroid: shape.centroid,
            box_corners: shape.obb.corners(),
            label_anchor: shape.centroid + Vector2::new(LABEL_OFFSET_PX, 0.0),
            label: label.map(str::to_owned),
        }
    }
}
