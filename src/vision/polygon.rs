//! Polygon normalization for detection boundaries
//!
//! Decoders usually report a simple quadrilateral for each QR code, which can
//! be drawn as-is. Anything else (more points, self-intersecting or concave
//! raw point sets) is reduced to its convex hull before rendering.

/// A 2D integer point in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Normalize a raw detection polygon into a closed drawable boundary.
///
/// Exactly 4 points are assumed to already form a simple quadrilateral and
/// pass through unchanged. Any other point set is replaced by its convex
/// hull with the first hull point appended to close the loop.
///
/// Collinear input degenerates to a zero-area boundary; that is accepted,
/// not treated as an error.
pub fn normalize_polygon(points: &[Point]) -> Vec<Point> {
    if points.len() == 4 {
        return points.to_vec();
    }

    let mut hull = convex_hull(points);
    if let Some(&first) = hull.first() {
        hull.push(first);
    }
    hull
}

/// Convex hull of a point set via Andrew's monotone chain, returned in
/// boundary order.
///
/// Duplicate and interior points are dropped. Fewer than 3 distinct
/// points yield the distinct points themselves.
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    let mut sorted: Vec<Point> = points.to_vec();
    sorted.sort_by(|a, b| (a.x, a.y).cmp(&(b.x, b.y)));
    sorted.dedup();

    if sorted.len() < 3 {
        return sorted;
    }

    let mut hull: Vec<Point> = Vec::with_capacity(sorted.len() * 2);

    // Lower hull
    for &p in &sorted {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0 {
            hull.pop();
        }
        hull.push(p);
    }

    // Upper hull
    let lower_len = hull.len() + 1;
    for &p in sorted.iter().rev().skip(1) {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0 {
            hull.pop();
        }
        hull.push(p);
    }

    // Last point repeats the first
    hull.pop();
    hull
}

/// Cross product of (b - a) x (c - a). Positive when c lies to the left
/// of the a->b direction (counter-clockwise turn).
fn cross(a: Point, b: Point, c: Point) -> i64 {
    let abx = (b.x - a.x) as i64;
    let aby = (b.y - a.y) as i64;
    let acx = (c.x - a.x) as i64;
    let acy = (c.y - a.y) as i64;
    abx * acy - aby * acx
}
