//! Resolves self-intersections of a single ring under the non-zero fill rule.
//!
//! The ring is snap-rounded into a planar arrangement: every crossing becomes
//! an integer hot point and every edge passing through a hot point's unit
//! square is routed through it, repeated until no two edges cross. Faces of
//! the arrangement get winding numbers by stepping across edges, and the
//! edges separating filled from unfilled faces are chained into rings with
//! the filled side on their left. All predicates are exact integer tests.

use crate::simplify::PathPoint;
use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

const MAX_SNAP_ROUNDS: usize = 32;

/// Filled ring (positive orientation) and the unfilled rings cut out of it
/// (negative orientation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPolygon {
    pub exterior: Vec<PathPoint>,
    pub holes: Vec<Vec<PathPoint>>,
}

type Edge = (PathPoint, PathPoint);

pub fn resolve_nonzero(ring: &[PathPoint]) -> Vec<PathPolygon> {
    let Some(arrangement) = Arrangement::from_ring(ring) else {
        return Vec::new();
    };
    let (rings, open_chains) = arrangement.boundary_rings();
    if open_chains > 0 {
        tracing::warn!(open_chains, "boundary edges left out of closed rings");
    }
    assemble(rings)
}

fn snap_round(mut edges: Vec<Edge>) -> Vec<Edge> {
    for _ in 0..MAX_SNAP_ROUNDS {
        let mut hot: BTreeSet<PathPoint> = edges.iter().flat_map(|&(a, b)| [a, b]).collect();
        let crossings = crossing_points(&edges);
        let touching = edges
            .iter()
            .any(|&(a, b)| near(&hot, a, b).any(|c| strictly_inside(a, b, c)));
        if crossings.is_empty() && !touching {
            return edges;
        }
        hot.extend(crossings);
        edges = edges
            .into_iter()
            .flat_map(|(a, b)| route_through(a, b, &hot))
            .collect();
    }
    tracing::warn!(rounds = MAX_SNAP_ROUNDS, "snap rounding did not settle");
    edges
}

/// Hot points whose unit square can touch the bounding box of `a`-`b`.
fn near(
    hot: &BTreeSet<PathPoint>,
    a: PathPoint,
    b: PathPoint,
) -> impl Iterator<Item = PathPoint> + '_ {
    let (min_y, max_y) = (a.y.min(b.y) - 1, a.y.max(b.y) + 1);
    let lo = PathPoint {
        x: a.x.min(b.x) - 1,
        y: i64::MIN,
    };
    let hi = PathPoint {
        x: a.x.max(b.x) + 1,
        y: i64::MAX,
    };
    hot.range(lo..=hi)
        .copied()
        .filter(move |p| p.y >= min_y && p.y <= max_y)
}

/// Rounded points where two edges cross away from their endpoints.
fn crossing_points(edges: &[Edge]) -> Vec<PathPoint> {
    let mut order: Vec<usize> = (0..edges.len()).collect();
    order.sort_by_key(|&i| edges[i].0.x.min(edges[i].1.x));

    let mut points = Vec::new();
    for (pos, &i) in order.iter().enumerate() {
        let (a, b) = edges[i];
        let max_x = a.x.max(b.x);
        for &j in &order[pos + 1..] {
            let (c, d) = edges[j];
            if c.x.min(d.x) > max_x {
                break;
            }
            if let Some(p) = proper_crossing(a, b, c, d) {
                points.push(p);
            }
        }
    }
    points
}

fn proper_crossing(a: PathPoint, b: PathPoint, c: PathPoint, d: PathPoint) -> Option<PathPoint> {
    let o1 = orient(a, b, c).signum();
    let o2 = orient(a, b, d).signum();
    let o3 = orient(c, d, a).signum();
    let o4 = orient(c, d, b).signum();
    if o1 * o2 >= 0 || o3 * o4 >= 0 {
        return None;
    }
    let r = delta(a, b);
    let s = delta(c, d);
    let denom = cross(r, s);
    let t_num = cross(delta(a, c), s);
    Some(PathPoint {
        x: a.x + div_round(r.0 as i128 * t_num, denom) as i64,
        y: a.y + div_round(r.1 as i128 * t_num, denom) as i64,
    })
}

/// Splits `a`-`b` at every hot point whose unit square it touches.
fn route_through(a: PathPoint, b: PathPoint, hot: &BTreeSet<PathPoint>) -> Vec<Edge> {
    let dir = delta(a, b);
    let mut stops: Vec<(i128, PathPoint)> = near(hot, a, b)
        .filter(|&c| c != a && c != b && touches_pixel(a, b, c))
        .map(|c| (dot(delta(a, c), dir), c))
        .collect();
    stops.sort();

    let mut path = Vec::with_capacity(stops.len() + 2);
    path.push(a);
    path.extend(stops.into_iter().map(|(_, c)| c));
    path.push(b);
    path.dedup();
    path.windows(2).map(|w| (w[0], w[1])).collect()
}

/// Whether `a`-`b` meets the closed unit square centred on `c`. Works in
/// doubled coordinates so the square's corners stay integral.
fn touches_pixel(a: PathPoint, b: PathPoint, c: PathPoint) -> bool {
    let (ax, ay, bx, by) = (2 * a.x, 2 * a.y, 2 * b.x, 2 * b.y);
    let (cx, cy) = (2 * c.x, 2 * c.y);
    if ax.max(bx) < cx - 1 || ax.min(bx) > cx + 1 || ay.max(by) < cy - 1 || ay.min(by) > cy + 1 {
        return false;
    }
    let sides = [(cx - 1, cy - 1), (cx + 1, cy - 1), (cx + 1, cy + 1), (cx - 1, cy + 1)]
        .map(|(x, y)| cross((bx - ax, by - ay), (x - ax, y - ay)).signum());
    !(sides.iter().all(|&s| s > 0) || sides.iter().all(|&s| s < 0))
}

fn strictly_inside(a: PathPoint, b: PathPoint, c: PathPoint) -> bool {
    if orient(a, b, c) != 0 {
        return false;
    }
    let along = dot(delta(a, c), delta(a, b));
    along > 0 && along < dot(delta(a, b), delta(a, b))
}

#[derive(Debug, Clone, Copy)]
struct HalfEdge {
    from: PathPoint,
    to: PathPoint,
    /// Net number of times the ring walks this edge in this direction.
    count: i64,
}

#[derive(Debug, Clone, Copy)]
struct Face {
    first: usize,
    area2: i128,
    component: usize,
}

/// Planar arrangement of the netted ring edges. Half-edges come in pairs,
/// `h` and `h ^ 1` being twins; `next[h]` continues the face on the left.
struct Arrangement {
    half_edges: Vec<HalfEdge>,
    around: BTreeMap<PathPoint, Vec<usize>>,
    slot: Vec<usize>,
    next: Vec<usize>,
    face_of: Vec<usize>,
    faces: Vec<Face>,
    component_of: Vec<usize>,
}

impl Arrangement {
    fn from_ring(ring: &[PathPoint]) -> Option<Self> {
        if ring.len() < 3 {
            return None;
        }
        let len = ring.len();
        let edges: Vec<Edge> = (0..len)
            .map(|i| (ring[i], ring[(i + 1) % len]))
            .filter(|(a, b)| a != b)
            .collect();

        let mut counts: BTreeMap<Edge, i64> = BTreeMap::new();
        for (a, b) in snap_round(edges) {
            if a < b {
                *counts.entry((a, b)).or_default() += 1;
            } else {
                *counts.entry((b, a)).or_default() -= 1;
            }
        }

        let mut half_edges = Vec::new();
        for ((a, b), count) in counts {
            if count != 0 {
                half_edges.push(HalfEdge { from: a, to: b, count });
                half_edges.push(HalfEdge {
                    from: b,
                    to: a,
                    count: -count,
                });
            }
        }
        if half_edges.is_empty() {
            return None;
        }
        Some(Self::build(half_edges))
    }

    fn build(half_edges: Vec<HalfEdge>) -> Self {
        let mut around: BTreeMap<PathPoint, Vec<usize>> = BTreeMap::new();
        for (idx, h) in half_edges.iter().enumerate() {
            around.entry(h.from).or_default().push(idx);
        }
        let mut slot = vec![0; half_edges.len()];
        for out in around.values_mut() {
            out.sort_by(|&l, &r| {
                let (l, r) = (&half_edges[l], &half_edges[r]);
                angle_cmp(delta(l.from, l.to), delta(r.from, r.to))
            });
            for (i, &h) in out.iter().enumerate() {
                slot[h] = i;
            }
        }

        let mut arrangement = Self {
            next: Vec::new(),
            face_of: vec![usize::MAX; half_edges.len()],
            faces: Vec::new(),
            component_of: vec![0; half_edges.len()],
            half_edges,
            around,
            slot,
        };
        let next = (0..arrangement.half_edges.len())
            .map(|h| arrangement.clockwise_from(h ^ 1, 1))
            .collect();
        arrangement.next = next;
        arrangement.link_components();
        arrangement.trace_faces();
        arrangement
    }

    /// Outgoing half-edge `steps` positions clockwise from `h` around its
    /// origin.
    fn clockwise_from(&self, h: usize, steps: usize) -> usize {
        match self.around.get(&self.half_edges[h].from) {
            Some(out) => out[(self.slot[h] + out.len() - steps % out.len()) % out.len()],
            None => h,
        }
    }

    fn link_components(&mut self) {
        let ids: BTreeMap<PathPoint, usize> =
            self.around.keys().enumerate().map(|(i, &p)| (p, i)).collect();
        let mut parent: Vec<usize> = (0..ids.len()).collect();
        for h in self.half_edges.iter().step_by(2) {
            let (a, b) = (find(&mut parent, ids[&h.from]), find(&mut parent, ids[&h.to]));
            parent[a] = b;
        }
        for (idx, h) in self.half_edges.iter().enumerate() {
            self.component_of[idx] = find(&mut parent, ids[&h.from]);
        }
    }

    fn trace_faces(&mut self) {
        for start in 0..self.half_edges.len() {
            if self.face_of[start] != usize::MAX {
                continue;
            }
            let id = self.faces.len();
            let mut area2 = 0;
            let mut h = start;
            loop {
                self.face_of[h] = id;
                let (a, b) = (self.half_edges[h].from, self.half_edges[h].to);
                area2 += a.x as i128 * b.y as i128 - b.x as i128 * a.y as i128;
                h = self.next[h];
                if h == start || self.face_of[h] != usize::MAX {
                    break;
                }
            }
            self.faces.push(Face {
                first: start,
                area2,
                component: self.component_of[start],
            });
        }
    }

    fn face_edges(&self, face: usize) -> impl Iterator<Item = usize> + '_ {
        let first = self.faces[face].first;
        let mut h = Some(first);
        std::iter::from_fn(move || {
            let current = h?;
            let next = self.next[current];
            h = (next != first && self.face_of[next] == face).then_some(next);
            Some(current)
        })
    }

    /// Winding number of every face. Each component's unbounded face takes
    /// the winding of the other components around it; the rest follow by
    /// stepping across edges, the left side exceeding the right by the
    /// edge's count.
    fn face_windings(&self) -> Vec<i64> {
        let mut by_component: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (id, face) in self.faces.iter().enumerate() {
            by_component.entry(face.component).or_default().push(id);
        }

        let mut winding: Vec<Option<i64>> = vec![None; self.faces.len()];
        for (component, faces) in by_component {
            let Some(&outer) = faces.iter().min_by_key(|&&f| self.faces[f].area2) else {
                continue;
            };
            let seed = self.half_edges[self.faces[outer].first].from;
            let others = self
                .half_edges
                .iter()
                .enumerate()
                .step_by(2)
                .filter(|(idx, _)| self.component_of[*idx] != component)
                .map(|(_, h)| (h.from, h.to, h.count));
            winding[outer] = Some(winding_at(others, seed));

            let mut queue = VecDeque::from([outer]);
            while let Some(face) = queue.pop_front() {
                let here = winding[face].unwrap_or_default();
                for h in self.face_edges(face) {
                    let across = self.face_of[h ^ 1];
                    if winding[across].is_none() {
                        winding[across] = Some(here - self.half_edges[h].count);
                        queue.push_back(across);
                    }
                }
            }
        }
        winding.into_iter().map(Option::unwrap_or_default).collect()
    }

    /// Closed rings of boundary half-edges, plus how many chains failed to
    /// close. At each vertex the ring continues along the first boundary
    /// edge clockwise from where it came, which keeps rings that touch at a
    /// vertex apart.
    fn boundary_rings(&self) -> (Vec<Vec<PathPoint>>, usize) {
        let filled: Vec<bool> = self.face_windings().into_iter().map(|w| w != 0).collect();
        let is_boundary =
            |h: usize| filled[self.face_of[h]] && !filled[self.face_of[h ^ 1]];

        let mut used = vec![false; self.half_edges.len()];
        let mut rings = Vec::new();
        let mut open_chains = 0;

        for start in 0..self.half_edges.len() {
            if used[start] || !is_boundary(start) {
                continue;
            }
            let mut ring = Vec::new();
            let mut h = start;
            let closed = loop {
                used[h] = true;
                ring.push(self.half_edges[h].from);
                let twin = h ^ 1;
                let degree = self.around.get(&self.half_edges[twin].from).map_or(0, Vec::len);
                let Some(next) = (1..=degree)
                    .map(|k| self.clockwise_from(twin, k))
                    .find(|&g| is_boundary(g))
                else {
                    break false;
                };
                if next == start {
                    break true;
                }
                if used[next] {
                    break false;
                }
                h = next;
            };

            if !closed {
                open_chains += 1;
                continue;
            }
            let ring = drop_collinear(ring);
            if ring.len() >= 3 && signed_area_2x(&ring) != 0 {
                rings.push(ring);
            }
        }
        (rings, open_chains)
    }
}

fn find(parent: &mut [usize], mut x: usize) -> usize {
    while parent[x] != x {
        parent[x] = parent[parent[x]];
        x = parent[x];
    }
    x
}

/// Counter-clockwise order of directions starting from the positive x axis.
fn angle_cmp(u: (i64, i64), v: (i64, i64)) -> Ordering {
    let half = |d: (i64, i64)| u8::from(!(d.1 > 0 || (d.1 == 0 && d.0 > 0)));
    half(u)
        .cmp(&half(v))
        .then_with(|| 0.cmp(&cross(u, v)))
}

/// Groups negative rings under the smallest positive ring containing them.
fn assemble(rings: Vec<Vec<PathPoint>>) -> Vec<PathPolygon> {
    let (exteriors, holes): (Vec<_>, Vec<_>) =
        rings.into_iter().partition(|r| signed_area_2x(r) > 0);
    let mut polygons: Vec<PathPolygon> = exteriors
        .into_iter()
        .map(|exterior| PathPolygon {
            exterior,
            holes: Vec::new(),
        })
        .collect();

    for hole in holes {
        // doubled midpoint of an edge never sits on another ring
        let sample = PathPoint {
            x: hole[0].x + hole[1].x,
            y: hole[0].y + hole[1].y,
        };
        let owner = polygons
            .iter()
            .enumerate()
            .filter(|(_, p)| {
                let doubled = ring_edges(&p.exterior)
                    .map(|(a, b)| (double(a), double(b), 1));
                winding_at(doubled, sample) != 0
            })
            .min_by_key(|(_, p)| signed_area_2x(&p.exterior))
            .map(|(i, _)| i);
        match owner {
            Some(i) => polygons[i].holes.push(hole),
            None => tracing::debug!(points = hole.len(), "dropping hole outside every ring"),
        }
    }

    polygons.sort_by_key(|p| Reverse(signed_area_2x(&p.exterior)));
    polygons
}

fn drop_collinear(mut ring: Vec<PathPoint>) -> Vec<PathPoint> {
    let mut changed = true;
    while changed && ring.len() >= 3 {
        changed = false;
        let len = ring.len();
        for i in 0..len {
            let prev = ring[(i + len - 1) % len];
            let cur = ring[i];
            let next = ring[(i + 1) % len];
            if cross(delta(prev, cur), delta(cur, next)) == 0 {
                ring.remove(i);
                changed = true;
                break;
            }
        }
    }
    ring
}

/// Winding number of `p` around directed edges with multiplicities; `p`
/// must not lie on any of them.
fn winding_at(edges: impl Iterator<Item = (PathPoint, PathPoint, i64)>, p: PathPoint) -> i64 {
    let mut winding = 0;
    for (a, b, count) in edges {
        if a.y <= p.y {
            if b.y > p.y && orient(a, b, p) > 0 {
                winding += count;
            }
        } else if b.y <= p.y && orient(a, b, p) < 0 {
            winding -= count;
        }
    }
    winding
}

fn ring_edges(ring: &[PathPoint]) -> impl Iterator<Item = Edge> + '_ {
    (0..ring.len()).map(move |i| (ring[i], ring[(i + 1) % ring.len()]))
}

fn double(p: PathPoint) -> PathPoint {
    PathPoint {
        x: 2 * p.x,
        y: 2 * p.y,
    }
}

fn delta(a: PathPoint, b: PathPoint) -> (i64, i64) {
    (b.x - a.x, b.y - a.y)
}

fn cross(a: (i64, i64), b: (i64, i64)) -> i128 {
    a.0 as i128 * b.1 as i128 - a.1 as i128 * b.0 as i128
}

fn dot(a: (i64, i64), b: (i64, i64)) -> i128 {
    a.0 as i128 * b.0 as i128 + a.1 as i128 * b.1 as i128
}

fn orient(a: PathPoint, b: PathPoint, c: PathPoint) -> i128 {
    cross(delta(a, b), delta(a, c))
}

/// `num / den` rounded to nearest, halves away from negative infinity.
fn div_round(num: i128, den: i128) -> i128 {
    let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
    (2 * num + den).div_euclid(2 * den)
}

pub(crate) fn signed_area_2x(ring: &[PathPoint]) -> i128 {
    ring_edges(ring)
        .map(|(a, b)| a.x as i128 * b.y as i128 - b.x as i128 * a.y as i128)
        .sum()
}
