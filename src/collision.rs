// Copyright 2017 Matthew Plant. This file is part of MGF2D.
//
// MGF2D is free software: you can redistribute it and/or modify
// it under the terms of the GNU Lesser General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// MGF2D is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Lesser General Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License
// along with MGF2D. If not, see <http://www.gnu.org/licenses/>.

use std::ops::Neg;

use cgmath::{EuclideanSpace, InnerSpace, MetricSpace, Vector2};
use serde::{Deserialize, Serialize};

use crate::bounds::*;
use crate::geom::*;
use crate::physics::*;
use crate::simplex::*;

/// A type that can overlap another.
pub trait Overlaps<RHS> {
    fn overlaps(&self, rhs: &RHS) -> bool;
}

/// A type that can completely subsume another.
pub trait Contains<RHS> {
    fn contains(&self, rhs: &RHS) -> bool;
}

/// The result of testing two bodies against each other.
///
/// A CollisionPoint is always expressed from the perspective of the first
/// body of the pair.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollisionPoint {
    /// Unit normal pointing from the first body toward the second.
    pub normal: Vector2<f32>,
    /// Signed separation between the bodies. Negative values are penetration
    /// depths. Pairs resolved by GJK report the distance between the body
    /// positions instead.
    pub distance: f32,
    pub colliding: bool,
}

impl CollisionPoint {
    /// A collision point whose bodies collide if they are separated by a
    /// negative distance.
    pub fn new(normal: Vector2<f32>, distance: f32) -> Self {
        CollisionPoint {
            normal,
            distance,
            colliding: distance < 0.0,
        }
    }

    /// Express the collision from the perspective of the other body.
    pub fn invert(self) -> Self {
        CollisionPoint {
            normal: -self.normal,
            ..self
        }
    }
}

impl Neg for CollisionPoint {
    type Output = CollisionPoint;

    fn neg(self) -> Self {
        self.invert()
    }
}

pub fn circle_circle(a: &Circle, b: &Circle) -> CollisionPoint {
    let d = b.c - a.c;
    let normal = try_normalize(d).unwrap_or(Vector2::unit_y());
    CollisionPoint::new(normal, d.magnitude() - (a.r + b.r))
}

/// The nearest point of the box to the circle center is found by clamping the
/// center onto the box. If the center is inside, the box's edge point in the
/// direction of the center marks where the circle has to leave.
pub fn circle_rect(circle: &Circle, rect: &OrientedBox) -> CollisionPoint {
    let local = rect.to_local(circle.c);
    let nearest = box_clamp(rect.r, local);
    match try_normalize(local - nearest) {
        Some(out) => {
            let gap = (local - nearest).magnitude();
            CollisionPoint::new(rotate(-out, rect.rot), gap - circle.r)
        },
        None => {
            let exit = box_edge_point(rect.r, local);
            let depth = (exit - local).magnitude();
            let normal = try_normalize(rect.c - circle.c).unwrap_or(-Vector2::unit_y());
            CollisionPoint::new(normal, -(depth + circle.r))
        },
    }
}

pub fn circle_line(circle: &Circle, line: &Segment) -> CollisionPoint {
    let d = line.closest_point(circle.c) - circle.c;
    let normal = try_normalize(d).unwrap_or_else(|| line.normal());
    CollisionPoint::new(normal, d.magnitude() - circle.r)
}

/// Overlap test of two axis aligned boxes. The normal lies along the axis of
/// least penetration.
pub fn aabb_aabb(a: &AABB, b: &AABB) -> CollisionPoint {
    let d = b.c - a.c;
    let sign = |x: f32| if x < 0.0 { -1.0 } else { 1.0 };
    let overlap_x = a.r.x + b.r.x - d.x.abs();
    let overlap_y = a.r.y + b.r.y - d.y.abs();
    if overlap_x < overlap_y {
        CollisionPoint::new(Vector2::new(sign(d.x), 0.0), -overlap_x)
    } else {
        CollisionPoint::new(Vector2::new(0.0, sign(d.y)), -overlap_y)
    }
}

/// Separating axis test between a box and a segment, over the two box axes and
/// the segment normal.
pub fn rect_line(rect: &OrientedBox, line: &Segment) -> CollisionPoint {
    let [u, v] = rect.axes();
    let mut best = (u, f32::INFINITY);
    for &axis in [u, v, line.normal()].iter() {
        let (rect_min, rect_max) = rect.project(axis);
        let pa = line.a.to_vec().dot(axis);
        let pb = line.b.to_vec().dot(axis);
        let (line_min, line_max) = (pa.min(pb), pa.max(pb));
        // How far the box must move along the axis in either direction to
        // clear the segment.
        let overlap = (rect_max - line_min).min(line_max - rect_min);
        if overlap < best.1 {
            best = (axis, overlap);
        }
    }
    let (axis, overlap) = best;
    let normal = if axis.dot(line.midpoint() - rect.c) < 0.0 {
        -axis
    } else {
        axis
    };
    CollisionPoint::new(normal, -overlap)
}

/// Crossing segments report a distance of zero. Otherwise the gap is the
/// smallest distance from an endpoint of one segment to the other segment.
pub fn line_line(a: &Segment, b: &Segment) -> CollisionPoint {
    if a.intersection(b).is_some() {
        let n = b.normal();
        let normal = if n.dot(b.midpoint() - a.midpoint()) < 0.0 { -n } else { n };
        return CollisionPoint {
            normal,
            distance: 0.0,
            colliding: true,
        };
    }
    let candidates = [
        (a.a, b.closest_point(a.a)),
        (a.b, b.closest_point(a.b)),
        (a.closest_point(b.a), b.a),
        (a.closest_point(b.b), b.b),
    ];
    let mut closest = candidates[0];
    for &(p, q) in candidates[1..].iter() {
        if p.distance2(q) < closest.0.distance2(closest.1) {
            closest = (p, q);
        }
    }
    let (p, q) = closest;
    let normal = try_normalize(q - p).unwrap_or_else(|| b.normal());
    CollisionPoint::new(normal, p.distance(q))
}

/// Resolves a pair with GJK, for geometries with no analytic routine.
pub fn gjk_collide(a: &RigidBody, b: &RigidBody) -> CollisionPoint {
    let d = b.position() - a.position();
    CollisionPoint {
        normal: try_normalize(d).unwrap_or(Vector2::unit_y()),
        distance: d.magnitude(),
        colliding: gjk(a, b),
    }
}

/// The analytic description of a body, if it has one.
enum Kind {
    Circle(Circle),
    Rect(OrientedBox),
    Line(Segment),
    Hull,
}

impl Kind {
    fn of(body: &RigidBody) -> Kind {
        if let Some(c) = body.as_circle() {
            Kind::Circle(c)
        } else if let Some(b) = body.as_box() {
            Kind::Rect(b)
        } else if let Some(s) = body.segment() {
            Kind::Line(s)
        } else {
            Kind::Hull
        }
    }
}

/// Tests two bodies against each other with the routine specific to their
/// pair of shapes. The normal points from `a` toward `b`.
pub fn collide(a: &RigidBody, b: &RigidBody) -> CollisionPoint {
    match (Kind::of(a), Kind::of(b)) {
        (Kind::Circle(ca), Kind::Circle(cb)) => circle_circle(&ca, &cb),
        (Kind::Circle(c), Kind::Rect(r)) => circle_rect(&c, &r),
        (Kind::Rect(r), Kind::Circle(c)) => -circle_rect(&c, &r),
        (Kind::Circle(c), Kind::Line(s)) => circle_line(&c, &s),
        (Kind::Line(s), Kind::Circle(c)) => -circle_line(&c, &s),
        (Kind::Rect(ra), Kind::Rect(rb)) => {
            match (AABB::aligned(&ra), AABB::aligned(&rb)) {
                (Some(aa), Some(ab)) => aabb_aabb(&aa, &ab),
                _ => gjk_collide(a, b),
            }
        },
        (Kind::Rect(r), Kind::Line(s)) => rect_line(&r, &s),
        (Kind::Line(s), Kind::Rect(r)) => -rect_line(&r, &s),
        (Kind::Line(sa), Kind::Line(sb)) => line_line(&sa, &sb),
        _ => gjk_collide(a, b),
    }
}

impl Overlaps<RigidBody> for RigidBody {
    fn overlaps(&self, rhs: &RigidBody) -> bool {
        collide(self, rhs).colliding
    }
}

#[cfg(test)]
mod tests {
    mod analytic {
        use approx::assert_relative_eq;
        use cgmath::{InnerSpace, Point2, Vector2};
        use std::f32::consts::PI;

        use crate::collision::*;

        fn circle(x: f32, y: f32, r: f32) -> Circle {
            Circle { c: Point2::new(x, y), r }
        }

        fn unit_box(x: f32, y: f32, rot: f32) -> OrientedBox {
            OrientedBox {
                c: Point2::new(x, y),
                r: Vector2::new(1.0, 1.0),
                rot,
            }
        }

        fn floor() -> Segment {
            Segment::from((Point2::new(10.0, 0.0), Point2::new(-10.0, 0.0)))
        }

        #[test]
        fn test_circle_circle() {
            let p = circle_circle(&circle(0.0, 0.0, 1.0), &circle(3.0, 0.0, 1.0));
            assert_eq!(p.normal, Vector2::new(1.0, 0.0));
            assert_eq!(p.distance, 1.0);
            assert!(!p.colliding);

            let p = circle_circle(&circle(0.0, 0.0, 1.0), &circle(0.0, -1.5, 1.0));
            assert_eq!(p.normal, Vector2::new(0.0, -1.0));
            assert_eq!(p.distance, -0.5);
            assert!(p.colliding);

            // Touching circles do not collide.
            let p = circle_circle(&circle(-2.0, 1.0, 1.0), &circle(0.0, 1.0, 1.0));
            assert_eq!(p.distance, 0.0);
            assert!(!p.colliding);
        }

        #[test]
        fn test_circle_rect() {
            let p = circle_rect(&circle(3.0, 0.0, 1.0), &unit_box(0.0, 0.0, 0.0));
            assert_eq!(p.normal, Vector2::new(-1.0, 0.0));
            assert_eq!(p.distance, 1.0);
            assert!(!p.colliding);

            let p = circle_rect(&circle(1.5, 0.0, 1.0), &unit_box(0.0, 0.0, 0.0));
            assert_eq!(p.distance, -0.5);
            assert!(p.colliding);

            let p = circle_rect(&circle(2.0, 2.0, 1.0), &unit_box(0.0, 0.0, 0.0));
            assert_relative_eq!(p.distance, 2.0f32.sqrt() - 1.0);
            assert_relative_eq!(p.normal, Vector2::new(-1.0, -1.0).normalize());
            assert!(!p.colliding);

            // Center inside the box.
            let p = circle_rect(&circle(0.5, 0.0, 0.25), &unit_box(0.0, 0.0, 0.0));
            assert!(p.colliding);
            assert_relative_eq!(p.distance, -0.75, epsilon = 1e-3);
            assert_eq!(p.normal, Vector2::new(-1.0, 0.0));
        }

        #[test]
        fn test_circle_rotated_rect() {
            let diamond = unit_box(0.0, 0.0, PI / 4.0);
            // The corner of the diamond sits at (sqrt(2), 0).
            let p = circle_rect(&circle(2.0, 0.0, 0.5), &diamond);
            assert!(!p.colliding);
            assert_relative_eq!(p.distance, 2.0 - 2.0f32.sqrt() - 0.5, epsilon = 1e-5);
            assert_relative_eq!(p.normal, Vector2::new(-1.0, 0.0), epsilon = 1e-5);
            assert!(circle_rect(&circle(2.0, 0.0, 0.7), &diamond).colliding);
        }

        #[test]
        fn test_circle_line() {
            let p = circle_line(&circle(-1.0, 1.0, 1.0), &floor());
            assert_eq!(p.normal, Vector2::new(0.0, -1.0));
            assert_eq!(p.distance, 0.0);
            assert!(!p.colliding);

            let p = circle_line(&circle(0.0, 0.5, 1.0), &floor());
            assert_eq!(p.distance, -0.5);
            assert!(p.colliding);

            // Past the end of the segment the nearest point is the endpoint.
            let p = circle_line(&circle(13.0, 4.0, 1.0), &floor());
            assert_relative_eq!(p.normal, Vector2::new(-0.6, -0.8));
            assert_relative_eq!(p.distance, 4.0);

            let wall = Segment::from((Point2::new(0.0, 10.0), Point2::new(0.0, -10.0)));
            let p = circle_line(&circle(-1.0, 1.0, 1.0), &wall);
            assert_eq!(p.normal, Vector2::new(1.0, 0.0));
        }

        #[test]
        fn test_aabb_aabb() {
            let a = AABB { c: Point2::new(0.0, 0.0), r: Vector2::new(1.0, 1.0) };
            let b = AABB { c: Point2::new(1.5, 0.5), r: Vector2::new(1.0, 1.0) };
            let p = aabb_aabb(&a, &b);
            assert_eq!(p.normal, Vector2::new(1.0, 0.0));
            assert_eq!(p.distance, -0.5);
            assert!(p.colliding);

            let c = AABB { c: Point2::new(0.5, -4.0), r: Vector2::new(1.0, 1.0) };
            let p = aabb_aabb(&a, &c);
            assert_eq!(p.normal, Vector2::new(0.0, -1.0));
            assert_eq!(p.distance, 2.0);
            assert!(!p.colliding);
        }

        #[test]
        fn test_rect_line() {
            let resting = rect_line(&unit_box(0.0, 1.0, 0.0), &floor());
            assert_eq!(resting.normal, Vector2::new(0.0, -1.0));
            assert_eq!(resting.distance, 0.0);
            assert!(!resting.colliding);

            let sunk = rect_line(&unit_box(0.0, 0.25, 0.0), &floor());
            assert_eq!(sunk.normal, Vector2::new(0.0, -1.0));
            assert_eq!(sunk.distance, -0.75);
            assert!(sunk.colliding);

            let beside = rect_line(&unit_box(12.0, 0.0, 0.0), &floor());
            assert!(!beside.colliding);
            assert_eq!(beside.distance, 1.0);
            assert_eq!(beside.normal, Vector2::new(-1.0, 0.0));

            // A diamond dips its corner sqrt(2) below its center.
            let diamond = rect_line(&unit_box(0.0, 1.3, PI / 4.0), &floor());
            assert!(diamond.colliding);
            assert_relative_eq!(diamond.distance, 1.3 - 2.0f32.sqrt(), epsilon = 1e-5);
        }

        #[test]
        fn test_line_line() {
            let wall = Segment::from((Point2::new(0.0, 10.0), Point2::new(0.0, -10.0)));
            let p = line_line(&floor(), &wall);
            assert!(p.colliding);
            assert_eq!(p.distance, 0.0);

            let above = Segment::from((Point2::new(-1.0, 1.0), Point2::new(1.0, 1.0)));
            let p = line_line(&floor(), &above);
            assert!(!p.colliding);
            assert_eq!(p.distance, 1.0);
            assert_eq!(p.normal, Vector2::new(0.0, 1.0));

            let tilted = Segment::from((Point2::new(11.0, 1.0), Point2::new(14.0, 5.0)));
            let p = line_line(&floor(), &tilted);
            assert!(!p.colliding);
            assert_relative_eq!(p.distance, 2.0f32.sqrt());
        }

        #[test]
        fn test_invert() {
            let p = CollisionPoint::new(Vector2::new(0.6, 0.8), -0.25);
            let q = p.invert();
            assert_eq!(q.normal, Vector2::new(-0.6, -0.8));
            assert_eq!(q.distance, p.distance);
            assert_eq!(q.colliding, p.colliding);
            assert_eq!(q.invert(), p);
            assert_eq!(-(-p), p);
        }
    }

    mod dispatch {
        use approx::assert_relative_eq;
        use cgmath::{Point2, Vector2};
        use std::f32::consts::PI;

        use crate::collision::*;

        fn circle(x: f32, y: f32, r: f32) -> RigidBody {
            RigidBody::circle(1.0, Point2::new(x, y), 0.0, r)
        }

        fn rect(x: f32, y: f32, rot: f32) -> RigidBody {
            RigidBody::rect(1.0, Point2::new(x, y), rot, Vector2::new(1.0, 0.5))
        }

        fn line(ax: f32, ay: f32, bx: f32, by: f32) -> RigidBody {
            RigidBody::line(STATIC_MASS, Point2::new(ax, ay), Point2::new(bx, by))
        }

        fn triangle(x: f32, y: f32) -> RigidBody {
            RigidBody::polygon(
                1.0,
                &[
                    Point2::new(x - 1.0, y - 1.0),
                    Point2::new(x + 1.0, y - 1.0),
                    Point2::new(x, y + 2.0),
                ],
            )
        }

        #[test]
        fn test_commuted_pairs() {
            let pairs = [
                (circle(0.0, 0.0, 1.0), circle(1.5, 0.7, 0.8)),
                (circle(0.0, 0.0, 1.0), rect(1.5, 0.7, 0.0)),
                (circle(0.0, 0.0, 1.0), rect(2.5, -0.7, 0.3)),
                (circle(0.0, 2.0, 1.0), line(-3.0, 0.0, 3.0, 0.0)),
                (rect(0.0, 0.0, 0.0), rect(1.5, 0.2, 0.0)),
                (rect(0.0, 0.3, 0.2), line(-3.0, 0.0, 3.0, 0.0)),
            ];
            for &(ref a, ref b) in pairs.iter() {
                let ab = collide(a, b);
                let ba = collide(b, a);
                assert_relative_eq!(ab.normal, -ba.normal, epsilon = 1e-5);
                assert_relative_eq!(ab.distance, ba.distance, epsilon = 1e-5);
                assert_eq!(ab.colliding, ba.colliding);
                assert_eq!(a.collide(b), ab);
            }
        }

        #[test]
        fn test_derived_normals() {
            // Two circles: the normal is the direction between their centers.
            let p = collide(&circle(0.0, 3.0, 1.0), &circle(0.0, 1.0, 1.0));
            assert_eq!(p.normal, Vector2::new(0.0, -1.0));
            // Against a line: toward the nearest point of the line, or away
            // from it when the line comes first.
            let floor = line(1.0, 0.0, -1.0, 0.0);
            assert_eq!(collide(&circle(0.0, 1.0, 1.0), &floor).normal, Vector2::new(0.0, -1.0));
            assert_eq!(collide(&floor, &circle(0.0, 1.0, 1.0)).normal, Vector2::new(0.0, 1.0));
        }

        #[test]
        fn test_gjk_fallback() {
            let tri = triangle(0.0, 0.0);
            let c = circle(3.0, 4.0, 1.0);
            let p = collide(&tri, &c);
            assert!(!p.colliding);
            assert_relative_eq!(p.distance, 5.0);
            assert_relative_eq!(p.normal, Vector2::new(0.6, 0.8));

            let p = collide(&tri, &circle(0.5, 0.5, 1.0));
            assert!(p.colliding);

            // Rotated boxes have no analytic routine against each other.
            let p = collide(&rect(0.0, 0.0, PI / 4.0), &rect(4.0, 0.0, 0.0));
            assert_eq!(p.distance, 4.0);
            assert!(!p.colliding);
            // A quarter turn keeps a box axis aligned.
            let p = collide(&rect(0.0, 0.0, PI / 2.0), &rect(1.2, 0.0, 0.0));
            assert_relative_eq!(p.distance, -0.3, epsilon = 1e-5);
            assert!(p.colliding);
        }

        #[test]
        fn test_overlaps() {
            assert!(circle(0.0, 0.0, 1.0).overlaps(&rect(1.5, 0.0, 0.0)));
            assert!(!circle(0.0, 0.0, 1.0).overlaps(&rect(2.5, 0.0, 0.0)));
        }

        /// The analytic routines and GJK must agree on every configuration that
        /// is not within a hair of touching.
        #[test]
        fn test_agrees_with_gjk() {
            const MARGIN: f32 = 0.05;
            let probes = |x: f32, y: f32| -> Vec<RigidBody> {
                vec![
                    circle(x, y, 0.75),
                    rect(x, y, 0.0),
                    rect(x, y, 0.4),
                    line(x - 1.0, y - 0.3, x + 1.0, y + 0.3),
                ]
            };
            let fixtures = [
                circle(0.0, 0.0, 1.0),
                rect(0.0, 0.0, 0.0),
                rect(0.0, 0.0, 0.9),
                line(-2.0, 0.0, 2.0, 0.0),
            ];
            let mut checked = 0;
            for i in -8..9 {
                for j in -8..9 {
                    let (x, y) = (i as f32 * 0.37, j as f32 * 0.29);
                    for fixture in fixtures.iter() {
                        for probe in probes(x, y).iter() {
                            let p = collide(fixture, probe);
                            if p.distance.abs() < MARGIN {
                                continue;
                            }
                            assert_eq!(
                                p.colliding,
                                gjk(fixture, probe),
                                "{:?} against {:?}",
                                fixture,
                                probe
                            );
                            checked += 1;
                        }
                    }
                }
            }
            assert!(checked > 500);
        }

        /// Crossing segments report a distance of zero, which the sweep above
        /// leaves out.
        #[test]
        fn test_crossing_lines_agree_with_gjk() {
            let crossing = [
                (line(-2.0, 0.0, 2.0, 0.0), line(-1.0, -1.0, 1.0, 1.0)),
                (line(0.5, -2.0, 0.7, 2.0), line(-1.5, 1.0, 1.5, -0.5)),
            ];
            for &(ref a, ref b) in crossing.iter() {
                let p = collide(a, b);
                assert!(p.colliding);
                assert_eq!(p.distance, 0.0);
                assert!(gjk(a, b));
                assert!(gjk(b, a));
            }

            let a = line(-2.0, 0.0, 2.0, 0.0);
            let b = line(-1.0, 1.0, 1.0, 2.0);
            let p = collide(&a, &b);
            assert!(!p.colliding);
            assert_relative_eq!(p.distance, 1.0, epsilon = 1e-5);
            assert!(!gjk(&a, &b));
        }
    }
}
