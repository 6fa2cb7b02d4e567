//! Convex hull and minimum-area oriented bounding box.

use nalgebra::{Point2, Vector2};
use shape_classify_core::OrientedBox;

/// Andrew's monotone chain. Returns the hull boundary without the closing
/// point; collinear points are dropped. Degenerate inputs come back with
/// fewer than three points.
pub fn convex_hull(points: &[Point2<f64>]) -> Vec<Point2<f64>> {
    let mut pts: Vec<Point2<f64>> = points.to_vec();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let cross = |o: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>| {
        (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
    };

    let mut lower: Vec<Point2<f64>> = Vec::new();
    for p in &pts {
        while lower.len() >= 2 && cross(&lower[lower.len() - 2], &lower[lower.len() - 1], p) <= 0.0
        {
            lower.pop();
        }
        lower.push(*p);
    }

    let mut upper: Vec<Point2<f64>> = Vec::new();
    for p in pts.iter().rev() {
        while upper.len() >= 2 && cross(&upper[upper.len() - 2], &upper[upper.len() - 1], p) <= 0.0
        {
            upper.pop();
        }
        upper.push(*p);
    }

    // Chain endpoints are shared between the two halves.
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Minimum-area oriented rectangle enclosing the points, or `None` when the
/// hull is degenerate (fewer than three non-collinear points).
///
/// The optimal rectangle shares a direction with some hull edge, so every
/// edge direction is swept and the tightest extents kept.
pub fn min_area_box(points: &[Point2<f64>]) -> Option<OrientedBox> {
    let hull = convex_hull(points);
    if hull.len() < 3 {
        return None;
    }

    let mut best: Option<(f64, OrientedBox)> = None;
    for i in 0..hull.len() {
        let edge = hull[(i + 1) % hull.len()] - hull[i];
        let len = edge.norm();
        if len <= f64::EPSILON {
            continue;
        }
        let u = edge / len;
        let v = Vector2::new(-u.y, u.x);

        let (mut lo_u, mut hi_u) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut lo_v, mut hi_v) = (f64::INFINITY, f64::NEG_INFINITY);
        for p in &hull {
            let du = p.coords.dot(&u);
            let dv = p.coords.dot(&v);
            lo_u = lo_u.min(du);
            hi_u = hi_u.max(du);
            lo_v = lo_v.min(dv);
            hi_v = hi_v.max(dv);
        }

        let width = hi_u - lo_u;
        let height = hi_v - lo_v;
        let area = width * height;
        if best.map_or(true, |(best_area, _)| area < best_area) {
            let center = u * (0.5 * (lo_u + hi_u)) + v * (0.5 * (lo_v + hi_v));
            best = Some((
                area,
                OrientedBox {
                    center: Point2::new(center.x as f32, center.y as f32),
                    width: width as f32,
                    height: height as f32,
                    angle: u.y.atan2(u.x) as f32,
                },
            ));
        }
    }

    best.map(|(_, obb)| obb)
}
