use crate::simplify::PathPoint;

/// Removes vertices that sit within `distance` of a neighbour or of the line
/// through their neighbours, repeating until no vertex qualifies.
///
/// Returns an empty ring when fewer than three vertices survive.
pub fn clean_ring(ring: &[PathPoint], distance: f64) -> Vec<PathPoint> {
    let len = ring.len();
    if len < 3 {
        return Vec::new();
    }
    let dist_sq = distance.max(0.0) * distance.max(0.0);

    let mut next: Vec<usize> = (0..len).map(|i| (i + 1) % len).collect();
    let mut prev: Vec<usize> = (0..len).map(|i| (i + len - 1) % len).collect();
    let mut visited = vec![false; len];
    let mut size = len;
    let mut op = 0;

    while !visited[op] && next[op] != prev[op] {
        let p = ring[op];
        let before = ring[prev[op]];
        let after = ring[next[op]];

        if points_are_close(p, before, dist_sq) {
            op = exclude(op, &mut next, &mut prev, &mut visited);
            size -= 1;
        } else if points_are_close(before, after, dist_sq) {
            let doomed = next[op];
            exclude(doomed, &mut next, &mut prev, &mut visited);
            op = exclude(op, &mut next, &mut prev, &mut visited);
            size -= 2;
        } else if slopes_near_collinear(before, p, after, dist_sq) {
            op = exclude(op, &mut next, &mut prev, &mut visited);
            size -= 1;
        } else {
            visited[op] = true;
            op = next[op];
        }
    }

    if size < 3 {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(size);
    for _ in 0..size {
        out.push(ring[op]);
        op = next[op];
    }
    out
}

/// Unlinks `idx` and returns its predecessor, which must be re-examined.
fn exclude(idx: usize, next: &mut [usize], prev: &mut [usize], visited: &mut [bool]) -> usize {
    let before = prev[idx];
    let after = next[idx];
    next[before] = after;
    prev[after] = before;
    visited[before] = false;
    before
}

fn points_are_close(a: PathPoint, b: PathPoint, dist_sq: f64) -> bool {
    let dx = (a.x - b.x) as f64;
    let dy = (a.y - b.y) as f64;
    dx * dx + dy * dy <= dist_sq
}

/// Squared perpendicular distance from `pt` to the infinite line `a`-`b`.
fn distance_from_line_sq(pt: PathPoint, a: PathPoint, b: PathPoint) -> f64 {
    let la = (a.y - b.y) as f64;
    let lb = (b.x - a.x) as f64;
    let lc = la * a.x as f64 + lb * a.y as f64;
    let c = la * pt.x as f64 + lb * pt.y as f64 - lc;
    let denom = la * la + lb * lb;
    if denom == 0.0 {
        let dx = (pt.x - a.x) as f64;
        let dy = (pt.y - a.y) as f64;
        return dx * dx + dy * dy;
    }
    c * c / denom
}

/// Tests whichever of the three points lies between the other two against
/// the line through the outer pair.
fn slopes_near_collinear(p1: PathPoint, p2: PathPoint, p3: PathPoint, dist_sq: f64) -> bool {
    if (p1.x - p2.x).abs() > (p1.y - p2.y).abs() {
        if (p1.x > p2.x) == (p1.x < p3.x) {
            distance_from_line_sq(p1, p2, p3) < dist_sq
        } else if (p2.x > p1.x) == (p2.x < p3.x) {
            distance_from_line_sq(p2, p1, p3) < dist_sq
        } else {
            distance_from_line_sq(p3, p1, p2) < dist_sq
        }
    } else if (p1.y > p2.y) == (p1.y < p3.y) {
        distance_from_line_sq(p1, p2, p3) < dist_sq
    } else if (p2.y > p1.y) == (p2.y < p3.y) {
        distance_from_line_sq(p2, p1, p3) < dist_sq
    } else {
        distance_from_line_sq(p3, p1, p2) < dist_sq
    }
}
