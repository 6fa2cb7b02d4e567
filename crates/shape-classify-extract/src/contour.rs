//! External boundary tracing for foreground components inside a bounding
//! rectangle.

use nalgebra::Point2;
use shape_classify_core::{is_foreground, MaskView, PixelRect};

use crate::regions::NEIGHBORS_8;

/// Clockwise Moore neighborhood in image coordinates (y down), starting
/// west.
const MOORE: [(i32, i32); 8] = [
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
];

/// Backtrack direction after moving to `MOORE[probe]`: the index, relative
/// to the new pixel, of the last background pixel examined before the hit.
const BACKTRACK: [usize; 8] = [6, 6, 0, 0, 2, 2, 4, 4];

/// Trace the external boundary of every 8-connected foreground component
/// inside `rect`, in raster order of each component's first pixel.
///
/// Points are crop-local pixel coordinates. A component reduced to a single
/// pixel yields a one-point contour; the caller is expected to discard
/// contours whose area moment vanishes.
pub fn trace_external_contours(mask: &MaskView<'_>, rect: &PixelRect) -> Vec<Vec<Point2<f64>>> {
    let (w, h) = (rect.width, rect.height);
    if w == 0 || h == 0 {
        return Vec::new();
    }

    let fg = |x: usize, y: usize| is_foreground(mask, (rect.x + x) as i32, (rect.y + y) as i32);

    // Label the crop's own components first; the rectangle may clip parts
    // of neighboring components, and those must not join this region's
    // contour.
    let mut labels = vec![0u32; w * h];
    let mut seeds = Vec::new();
    for y in 0..h {
        for x in 0..w {
            if labels[y * w + x] != 0 || !fg(x, y) {
                continue;
            }
            let id = seeds.len() as u32 + 1;
            seeds.push((x, y));
            label_component(&fg, &mut labels, w, h, x, y, id);
        }
    }

    seeds
        .iter()
        .enumerate()
        .map(|(i, &(sx, sy))| {
            let id = i as u32 + 1;
            let inside = |x: i32, y: i32| {
                x >= 0
                    && y >= 0
                    && (x as usize) < w
                    && (y as usize) < h
                    && labels[y as usize * w + x as usize] == id
            };
            trace_boundary(&inside, sx, sy, 4 * w * h + 8)
        })
        .collect()
}

fn label_component(
    fg: &impl Fn(usize, usize) -> bool,
    labels: &mut [u32],
    w: usize,
    h: usize,
    x0: usize,
    y0: usize,
    id: u32,
) {
    let mut queue = vec![(x0, y0)];
    labels[y0 * w + x0] = id;

    while let Some((x, y)) = queue.pop() {
        for (dx, dy) in NEIGHBORS_8 {
            let nx = x as i32 + dx;
            let ny = y as i32 + dy;
            if nx < 0 || ny < 0 || nx as usize >= w || ny as usize >= h {
                continue;
            }
            let (nx, ny) = (nx as usize, ny as usize);
            if labels[ny * w + nx] == 0 && fg(nx, ny) {
                labels[ny * w + nx] = id;
                queue.push((nx, ny));
            }
        }
    }
}

/// Moore-neighbor tracing, clockwise. Terminates when the initial
/// start-to-second-pixel transition recurs, which closes the boundary even
/// when it passes through the start pixel more than once.
///
/// `(sx, sy)` must be the raster-first pixel of its component so the west
/// neighbor is known background.
fn trace_boundary(
    inside: &impl Fn(i32, i32) -> bool,
    sx: usize,
    sy: usize,
    max_len: usize,
) -> Vec<Point2<f64>> {
    let start = (sx as i32, sy as i32);
    let mut contour = vec![Point2::new(start.0 as f64, start.1 as f64)];

    let (mut cx, mut cy) = start;
    let mut dir = 0usize; // backtrack points west of the raster-first pixel
    let mut first_move: Option<(i32, i32)> = None;

    loop {
        let mut hit = None;
        for step in 1..=8 {
            let probe = (dir + step) % 8;
            let (dx, dy) = MOORE[probe];
            if inside(cx + dx, cy + dy) {
                hit = Some(probe);
                break;
            }
        }
        let Some(probe) = hit else {
            break; // isolated pixel
        };
        let next = (cx + MOORE[probe].0, cy + MOORE[probe].1);

        match first_move {
            None => first_move = Some(next),
            Some(first) if (cx, cy) == start && next == first => break,
            Some(_) => {}
        }

        contour.push(Point2::new(next.0 as f64, next.1 as f64));
        (cx, cy) = next;
        dir = BACKTRACK[probe];

        if contour.len() > max_len {
            break; // safety bound, unreachable for well-formed components
        }
    }

    if contour.len() > 1 && contour.first() == contour.last() {
        contour.pop();
    }
    contour
}
