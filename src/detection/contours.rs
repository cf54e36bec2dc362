use image::GrayImage;
use imageproc::contours::{BorderType, find_contours};
use imageproc::point::Point;

use crate::models::Contour;

/// Trace the outermost borders of the white regions in a binary edge map.
/// Holes and anything nested inside a hole are skipped.
pub fn find_external_contours(edges: &GrayImage) -> Vec<Contour> {
    find_contours::<i32>(edges)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .filter_map(|c| build_contour(c.points))
        .collect()
}

fn build_contour(points: Vec<Point<i32>>) -> Option<Contour> {
    let first = points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in &points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    Some(Contour {
        points: compress_chain(&points),
        min_x: min_x.max(0) as u32,
        min_y: min_y.max(0) as u32,
        max_x: max_x.max(0) as u32,
        max_y: max_y.max(0) as u32,
    })
}

/// Drop the interior points of straight horizontal, vertical and diagonal
/// runs, keeping only the corners of the closed chain.
pub fn compress_chain(points: &[Point<i32>]) -> Vec<Point<i32>> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let step = |a: Point<i32>, b: Point<i32>| ((b.x - a.x).signum(), (b.y - a.y).signum());

    (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let here = points[i];
            let next = points[(i + 1) % n];
            step(prev, here) != step(here, next)
        })
        .map(|i| points[i])
        .collect()
}
