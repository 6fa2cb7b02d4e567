//! Polygon moments and Hu invariants.
//!
//! Raw geometric moments of a closed contour are accumulated along the
//! boundary polygon with Green's theorem, the classical contour-moment
//! construction. The seven Hu invariants derived from them are invariant to
//! translation, rotation and uniform scaling of the contour.

use nalgebra::Point2;

/// Contours whose area moment falls below this are treated as degenerate.
const M00_EPSILON: f64 = 1e-9;

/// Raw geometric moments of a closed polygon up to third order.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ContourMoments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
    pub m20: f64,
    pub m11: f64,
    pub m02: f64,
    pub m30: f64,
    pub m21: f64,
    pub m12: f64,
    pub m03: f64,
}

/// Accumulate the moments of the closed polygon through `points`.
///
/// The polygon is closed implicitly from the last point back to the first.
/// Fewer than three points, or a polygon with vanishing area, produce
/// all-zero moments; such contours are degenerate and carry no shape.
pub fn contour_moments(points: &[Point2<f64>]) -> ContourMoments {
    if points.len() < 3 {
        return ContourMoments::default();
    }

    let (mut a00, mut a10, mut a01) = (0.0f64, 0.0f64, 0.0f64);
    let (mut a20, mut a11, mut a02) = (0.0f64, 0.0f64, 0.0f64);
    let (mut a30, mut a21, mut a12, mut a03) = (0.0f64, 0.0f64, 0.0f64, 0.0f64);

    let last = points[points.len() - 1];
    let (mut xp, mut yp) = (last.x, last.y);

    for p in points {
        let (x, y) = (p.x, p.y);
        let cross = xp * y - x * yp;
        let xs = xp + x;
        let ys = yp + y;

        a00 += cross;
        a10 += cross * xs;
        a01 += cross * ys;
        a20 += cross * (xp * xs + x * x);
        a11 += cross * (xp * (ys + yp) + x * (ys + y));
        a02 += cross * (yp * ys + y * y);
        a30 += cross * xs * (xp * xp + x * x);
        a03 += cross * ys * (yp * yp + y * y);
        a21 += cross
            * (xp * xp * (3.0 * yp + y) + 2.0 * x * xp * ys + x * x * (yp + 3.0 * y));
        a12 += cross
            * (yp * yp * (3.0 * xp + x) + 2.0 * y * yp * xs + y * y * (xp + 3.0 * x));

        xp = x;
        yp = y;
    }

    // Orientation-independent: flip the sign for clockwise polygons.
    let s = if a00 < 0.0 { -1.0 } else { 1.0 };

    ContourMoments {
        m00: s * a00 / 2.0,
        m10: s * a10 / 6.0,
        m01: s * a01 / 6.0,
        m20: s * a20 / 12.0,
        m11: s * a11 / 24.0,
        m02: s * a02 / 12.0,
        m30: s * a30 / 20.0,
        m21: s * a21 / 60.0,
        m12: s * a12 / 60.0,
        m03: s * a03 / 20.0,
    }
}

impl ContourMoments {
    /// Polygon centroid `(m10/m00, m01/m00)`, or `None` for degenerate
    /// contours. Degenerate contours must never be divided against.
    pub fn centroid(&self) -> Option<Point2<f64>> {
        if self.m00.abs() <= M00_EPSILON {
            return None;
        }
        Some(Point2::new(self.m10 / self.m00, self.m01 / self.m00))
    }

    /// The seven Hu moment invariants, or `None` for degenerate contours.
    pub fn hu(&self) -> Option<[f64; 7]> {
        if self.m00.abs() <= M00_EPSILON {
            return None;
        }

        let cx = self.m10 / self.m00;
        let cy = self.m01 / self.m00;

        let mu20 = self.m20 - cx * self.m10;
        let mu11 = self.m11 - cx * self.m01;
        let mu02 = self.m02 - cy * self.m01;
        let mu30 = self.m30 - 3.0 * cx * self.m20 + 2.0 * cx * cx * self.m10;
        let mu21 = self.m21 - 2.0 * cx * self.m11 - cy * self.m20 + 2.0 * cx * cx * self.m01;
        let mu12 = self.m12 - 2.0 * cy * self.m11 - cx * self.m02 + 2.0 * cy * cy * self.m10;
        let mu03 = self.m03 - 3.0 * cy * self.m02 + 2.0 * cy * cy * self.m01;

        // Scale-normalized central moments.
        let s2 = self.m00 * self.m00;
        let s3 = s2 * self.m00.sqrt();
        let n20 = mu20 / s2;
        let n11 = mu11 / s2;
        let n02 = mu02 / s2;
        let n30 = mu30 / s3;
        let n21 = mu21 / s3;
        let n12 = mu12 / s3;
        let n03 = mu03 / s3;

        let p = n30 + n12;
        let q = n21 + n03;
        let p2 = p * p;
        let q2 = q * q;

        Some([
            n20 + n02,
            (n20 - n02) * (n20 - n02) + 4.0 * n11 * n11,
            (n30 - 3.0 * n12) * (n30 - 3.0 * n12) + (3.0 * n21 - n03) * (3.0 * n21 - n03),
            p2 + q2,
            (n30 - 3.0 * n12) * p * (p2 - 3.0 * q2) + (3.0 * n21 - n03) * q * (3.0 * p2 - q2),
            (n20 - n02) * (p2 - q2) + 4.0 * n11 * p * q,
            (3.0 * n21 - n03) * p * (p2 - 3.0 * q2) - (n30 - 3.0 * n12) * q * (3.0 * p2 - q2),
        ])
    }
}
