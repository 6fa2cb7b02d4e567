use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// Number of dimensions the classifier distance is computed over.
pub const INVARIANT_DIMS: usize = 9;

/// Minimum-area rotated rectangle enclosing a contour.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct OrientedBox {
    pub center: Point2<f32>,
    pub width: f32,
    pub height: f32,
    /// Rotation of the `width` side against the x axis, radians.
    pub angle: f32,
}

impl OrientedBox {
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Corner points in drawing order.
    pub fn corners(&self) -> [Point2<f32>; 4] {
        let (sin, cos) = self.angle.sin_cos();
        let u = Vector2::new(cos, sin) * (self.width * 0.5);
        let v = Vector2::new(-sin, cos) * (self.height * 0.5);
        [
            self.center - u - v,
            self.center + u - v,
            self.center + u + v,
            self.center - u + v,
        ]
    }
}

impl Default for OrientedBox {
    fn default() -> Self {
        Self {
            center: Point2::origin(),
            width: 0.0,
            height: 0.0,
            angle: 0.0,
        }
    }
}

/// Invariant feature representation of one region contour.
///
/// `hu`, `percent_filled` and `hw_ratio` are the translation-, rotation- and
/// scale-invariant dimensions the classifier matches on; they depend on the
/// contour alone, not on frame resolution or object placement. `centroid`
/// and `obb` are positional metadata kept for display and training-time
/// selection only.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShapeDescriptor {
    /// Contour centroid in frame coordinates (pixel units).
    pub centroid: Point2<f32>,
    /// The seven Hu moment invariants.
    pub hu: [f64; 7],
    /// Fraction of the axis-aligned bounding rectangle covered by
    /// foreground, in `[0, 1]`.
    pub percent_filled: f64,
    /// Shorter over longer side of the oriented box, in `(0, 1]`.
    pub hw_ratio: f64,
    pub obb: OrientedBox,
}

impl ShapeDescriptor {
    /// The dimensions used for nearest-neighbor matching, in fixed order.
    pub fn invariants(&self) -> [f64; INVARIANT_DIMS] {
        [
            self.hu[0],
            self.hu[1],
            self.hu[2],
            self.hu[3],
            self.hu[4],
            self.hu[5],
            self.hu[6],
            self.percent_filled,
            self.hw_ratio,
        ]
    }
}

/// A descriptor tagged with an operator-supplied ground-truth label.
/// Immutable once created.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LabeledShape {
    pub shape: ShapeDescriptor,
    pub label: String,
}

impl LabeledShape {
    pub fn new(shape: ShapeDescriptor, label: impl Into<String>) -> Self {
        Self {
            shape,
            label: label.into(),
        }
    }
}
