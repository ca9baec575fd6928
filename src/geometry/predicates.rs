// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometric predicates for planar face clipping
//!
//! All side tests are made against distances, not raw cross products, so the
//! linear tolerance keeps its meaning regardless of edge length.

use nalgebra::{Point2, Point3, Vector2, Vector3};

/// 2D cross product (z component of the 3D cross product)
#[inline]
pub fn cross2(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Newell's method over an ordered point sequence.
///
/// The result is normal to the best-fit plane and its length equals twice the
/// enclosed area, so it doubles as an orientation test against a face normal.
pub fn newell_normal<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Vector3<f64> {
    let pts: Vec<&Point3<f64>> = points.into_iter().collect();
    let mut n = Vector3::zeros();
    for i in 0..pts.len() {
        let a = pts[i];
        let b = pts[(i + 1) % pts.len()];
        n.x += (a.y - b.y) * (a.z + b.z);
        n.y += (a.z - b.z) * (a.x + b.x);
        n.z += (a.x - b.x) * (a.y + b.y);
    }
    n
}

/// Signed area of a 3D loop measured along `normal` (unit length expected)
pub fn signed_area_along(points: &[Point3<f64>], normal: &Vector3<f64>) -> f64 {
    0.5 * newell_normal(points.iter()).dot(normal)
}

/// Drop-one-axis projection that preserves orientation with respect to a normal.
///
/// A loop that is counter-clockwise around `normal` in 3D stays
/// counter-clockwise in the projected plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projection {
    u: usize,
    v: usize,
}

impl Projection {
    pub fn for_normal(normal: &Vector3<f64>) -> Self {
        let k = dominant_axis(normal);
        let (u, v) = ((k + 1) % 3, (k + 2) % 3);
        if normal[k] >= 0.0 {
            Self { u, v }
        } else {
            Self { u: v, v: u }
        }
    }

    #[inline]
    pub fn project(&self, p: &Point3<f64>) -> Point2<f64> {
        Point2::new(p[self.u], p[self.v])
    }

    pub fn project_all(&self, points: &[Point3<f64>]) -> Vec<Point2<f64>> {
        points.iter().map(|p| self.project(p)).collect()
    }
}

/// Index of the largest absolute component
pub fn dominant_axis(v: &Vector3<f64>) -> usize {
    let a = v.abs();
    if a.x >= a.y && a.x >= a.z {
        0
    } else if a.y >= a.z {
        1
    } else {
        2
    }
}

/// Parameter of `p` along segment `a`→`b` when `p` lies strictly inside it.
///
/// Endpoints (within `eps` of either end) are not interior.
pub fn point_on_segment_interior(
    p: &Point2<f64>,
    a: &Point2<f64>,
    b: &Point2<f64>,
    eps: f64,
) -> Option<f64> {
    let d = b - a;
    let len = d.norm();
    if len <= eps {
        return None;
    }
    let dist = cross2(&d, &(p - a)).abs() / len;
    if dist > eps {
        return None;
    }
    let along = (p - a).dot(&d) / len;
    if along <= eps || along >= len - eps {
        return None;
    }
    Some(along / len)
}

/// Distance from `p` to the closed segment `a`→`b`
pub fn distance_to_segment(p: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    let d = b - a;
    let len_sq = d.norm_squared();
    if len_sq == 0.0 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&d) / len_sq).clamp(0.0, 1.0);
    (p - (a + d * t)).norm()
}

/// How two segments touch each other
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentTouch {
    /// No common point
    Disjoint,
    /// Interiors cross at a single point; `t` along the first, `u` along the second
    Crossing { t: f64, u: f64 },
    /// Both segments lie on one line and share more than a point
    Collinear,
    /// An endpoint of one lies on the other (shared endpoints included)
    Touching,
}

/// Classify the contact between segments `p0`→`p1` and `q0`→`q1`.
///
/// Side tests use signed distances; a distance within `eps` counts as "on the
/// line", which is how vertex-on-edge and collinear contacts are separated
/// from true crossings.
pub fn classify_segment_touch(
    p0: &Point2<f64>,
    p1: &Point2<f64>,
    q0: &Point2<f64>,
    q1: &Point2<f64>,
    eps: f64,
) -> SegmentTouch {
    let r = p1 - p0;
    let s = q1 - q0;
    let lr = r.norm();
    let ls = s.norm();
    if lr <= eps || ls <= eps {
        return SegmentTouch::Disjoint;
    }

    // Signed distances of each endpoint from the other segment's line
    let dq0 = cross2(&r, &(q0 - p0)) / lr;
    let dq1 = cross2(&r, &(q1 - p0)) / lr;
    let dp0 = cross2(&s, &(p0 - q0)) / ls;
    let dp1 = cross2(&s, &(p1 - q0)) / ls;

    if dq0.abs() <= eps && dq1.abs() <= eps {
        return if collinear_overlap(p0, p1, q0, q1, eps) {
            SegmentTouch::Collinear
        } else if shares_point(p0, p1, q0, q1, eps) {
            SegmentTouch::Touching
        } else {
            SegmentTouch::Disjoint
        };
    }

    let straddle_q = (dq0 > eps && dq1 < -eps) || (dq0 < -eps && dq1 > eps);
    let straddle_p = (dp0 > eps && dp1 < -eps) || (dp0 < -eps && dp1 > eps);
    if straddle_q && straddle_p {
        let t = dp0 / (dp0 - dp1);
        let u = dq0 / (dq0 - dq1);
        return SegmentTouch::Crossing { t, u };
    }

    let endpoint_on_other = (dq0.abs() <= eps && distance_to_segment(q0, p0, p1) <= eps)
        || (dq1.abs() <= eps && distance_to_segment(q1, p0, p1) <= eps)
        || (dp0.abs() <= eps && distance_to_segment(p0, q0, q1) <= eps)
        || (dp1.abs() <= eps && distance_to_segment(p1, q0, q1) <= eps);
    if endpoint_on_other {
        SegmentTouch::Touching
    } else {
        SegmentTouch::Disjoint
    }
}

/// Proper crossing of two segments, ignoring every kind of endpoint contact
pub fn segments_cross_properly(
    p0: &Point2<f64>,
    p1: &Point2<f64>,
    q0: &Point2<f64>,
    q1: &Point2<f64>,
    eps: f64,
) -> bool {
    matches!(
        classify_segment_touch(p0, p1, q0, q1, eps),
        SegmentTouch::Crossing { .. } | SegmentTouch::Collinear
    )
}

fn collinear_overlap(p0: &Point2<f64>, p1: &Point2<f64>, q0: &Point2<f64>, q1: &Point2<f64>, eps: f64) -> bool {
    let r = p1 - p0;
    let len = r.norm();
    let a = (q0 - p0).dot(&r) / len;
    let b = (q1 - p0).dot(&r) / len;
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    lo.max(0.0) + eps < hi.min(len)
}

fn shares_point(p0: &Point2<f64>, p1: &Point2<f64>, q0: &Point2<f64>, q1: &Point2<f64>, eps: f64) -> bool {
    [(p0, q0), (p0, q1), (p1, q0), (p1, q1)]
        .iter()
        .any(|(a, b)| (*a - *b).norm() <= eps)
}

/// Result of a point-in-region query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Inside,
    Outside,
    Boundary,
}

/// Even-odd ray cast against every loop of a region.
///
/// Points within `eps` of any edge report [`Location::Boundary`].
pub fn locate_point(p: &Point2<f64>, loops: &[Vec<Point2<f64>>], eps: f64) -> Location {
    let mut inside = false;
    for ring in loops {
        let n = ring.len();
        for i in 0..n {
            let a = &ring[i];
            let b = &ring[(i + 1) % n];
            if distance_to_segment(p, a, b) <= eps {
                return Location::Boundary;
            }
            if (a.y > p.y) != (b.y > p.y) {
                let x = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if p.x < x {
                    inside = !inside;
                }
            }
        }
    }
    if inside {
        Location::Inside
    } else {
        Location::Outside
    }
}

/// Counter-clockwise angle from `from` to `to`, in `[0, 2π)`
pub fn ccw_angle(from: &Vector2<f64>, to: &Vector2<f64>) -> f64 {
    let a = cross2(from, to).atan2(from.dot(to));
    if a < 0.0 {
        a + std::f64::consts::TAU
    } else {
        a
    }
}

/// Signed turn from `incoming` to `outgoing`, positive for left turns, in `(-π, π]`
pub fn left_turn(incoming: &Vector2<f64>, outgoing: &Vector2<f64>) -> f64 {
    cross2(incoming, outgoing).atan2(incoming.dot(outgoing))
}

/// Line of intersection of planes `n1·x = d1` and `n2·x = d2`.
///
/// Returns a point on the line and the direction `n1 × n2`, or `None` when the
/// planes are parallel within `angular`.
pub fn plane_plane_line(
    n1: &Vector3<f64>,
    d1: f64,
    n2: &Vector3<f64>,
    d2: f64,
    angular: f64,
) -> Option<(Point3<f64>, Vector3<f64>)> {
    let dir = n1.cross(n2);
    let len_sq = dir.norm_squared();
    if len_sq.sqrt() <= angular * n1.norm() * n2.norm() {
        return None;
    }
    let origin = (n2.cross(&dir) * d1 + dir.cross(n1) * d2) / len_sq;
    Some((Point3::from(origin), dir))
}

/// Whether segment `a`→`b` passes through the axis-aligned rectangle `[lo, hi]`
pub fn segment_hits_rect(a: &Point2<f64>, b: &Point2<f64>, lo: &Point2<f64>, hi: &Point2<f64>) -> bool {
    // Liang-Barsky slab clipping
    let d = b - a;
    let mut t0: f64 = 0.0;
    let mut t1: f64 = 1.0;
    for k in 0..2 {
        if d[k].abs() < f64::EPSILON {
            if a[k] < lo[k] || a[k] > hi[k] {
                return false;
            }
        } else {
            let mut ta = (lo[k] - a[k]) / d[k];
            let mut tb = (hi[k] - a[k]) / d[k];
            if ta > tb {
                std::mem::swap(&mut ta, &mut tb);
            }
            t0 = t0.max(ta);
            t1 = t1.min(tb);
            if t0 > t1 {
                return false;
            }
        }
    }
    true
}
