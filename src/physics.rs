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

use std::f32;
use std::ops::{AddAssign, SubAssign};

use cgmath::{EuclideanSpace, InnerSpace, Point2, Vector2, Zero};
use serde::{Deserialize, Serialize};

use crate::collision::*;
use crate::error::*;
use crate::geom::*;

/// The mass of a body that can never be moved. Stored as an inverse mass of
/// zero.
pub const STATIC_MASS: f32 = f32::INFINITY;

/// Restitution given to static particles unless another one is requested.
pub const STATIC_RESTITUTION: f32 = 1.0;

/// An type that has a moment of inertia.
pub trait Inertia {
    fn moment(&self, m: f32) -> f32;
}

impl Inertia for Shape {
    fn moment(&self, m: f32) -> f32 {
        match self {
            &Shape::Circle { r } => 0.5 * m * r * r,
            // m (w^2 + h^2) / 12 with w and h twice the half extents.
            &Shape::Rect { half_extents: h } => m * (h.x * h.x + h.y * h.y) / 3.0,
            &Shape::Polygon { ref local } if local.len() < 3 => {
                let len2 = match local.as_slice() {
                    &[a, b] => (b - a).magnitude2(),
                    _ => 0.0,
                };
                m * len2 / 12.0
            },
            &Shape::Polygon { ref local } => {
                // Sum the triangles of a fan around the body position.
                let (mut num, mut denom) = (0.0, 0.0);
                for (i, &a) in local.iter().enumerate() {
                    let b = local[(i + 1) % local.len()];
                    let cross = a.perp_dot(b).abs();
                    num += cross * (a.dot(a) + a.dot(b) + b.dot(b));
                    denom += cross;
                }
                if denom < COLLISION_EPSILON {
                    0.0
                } else {
                    m * num / (6.0 * denom)
                }
            },
        }
    }
}

/// A convex body with a mass, a position and a rotation.
///
/// World space vertices of boxes and polygons are cached and kept in sync
/// with the position and rotation; move bodies with `set_position`,
/// `set_rotation` or the `+=` / `-=` operators.
#[derive(Clone, Debug, PartialEq)]
pub struct RigidBody {
    inv_mass: f32,
    position: Point2<f32>,
    rotation: f32,
    shape: Shape,
    vertices: Vec<Point2<f32>>,
}

impl RigidBody {
    /// Construct a new RigidBody. Pass `STATIC_MASS` for an immovable body.
    ///
    /// # Panics
    ///
    /// Panics if `mass` is not a positive number.
    pub fn new(mass: f32, position: Point2<f32>, rotation: f32, shape: Shape) -> Self {
        assert!(mass > 0.0, "body mass must be positive, found {}", mass);
        let vertices = shape.world_vertices(position, rotation);
        RigidBody {
            inv_mass: 1.0 / mass,
            position,
            rotation,
            shape,
            vertices,
        }
    }

    pub fn circle(mass: f32, position: Point2<f32>, rotation: f32, r: f32) -> Self {
        Self::new(mass, position, rotation, Shape::Circle { r })
    }

    pub fn rect(
        mass: f32,
        position: Point2<f32>,
        rotation: f32,
        half_extents: Vector2<f32>,
    ) -> Self {
        Self::new(mass, position, rotation, Shape::Rect { half_extents })
    }

    /// Construct a convex polygon from world space vertices. The position of
    /// the body is the mean of the vertices.
    ///
    /// # Panics
    ///
    /// Panics if `vertices` is empty.
    pub fn polygon(mass: f32, vertices: &[Point2<f32>]) -> Self {
        assert!(!vertices.is_empty(), "a polygon needs at least one vertex");
        let sum = vertices
            .iter()
            .fold(Vector2::zero(), |sum, v| sum + v.to_vec());
        let center = Point2::from_vec(sum / vertices.len() as f32);
        let local = vertices.iter().map(|&v| v - center).collect();
        Self::new(mass, center, 0.0, Shape::Polygon { local })
    }

    /// Construct a line segment between two world space points.
    pub fn line(mass: f32, a: Point2<f32>, b: Point2<f32>) -> Self {
        Self::polygon(mass, &[a, b])
    }

    /// The mass of the body; `STATIC_MASS` for immovable bodies.
    pub fn mass(&self) -> f32 {
        if self.is_static() {
            STATIC_MASS
        } else {
            1.0 / self.inv_mass
        }
    }

    #[inline(always)]
    pub fn inv_mass(&self) -> f32 {
        self.inv_mass
    }

    #[inline(always)]
    pub fn is_static(&self) -> bool {
        self.inv_mass == 0.0
    }

    #[inline(always)]
    pub fn position(&self) -> Point2<f32> {
        self.position
    }

    #[inline(always)]
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    #[inline(always)]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// World space vertices. Empty for circles.
    #[inline(always)]
    pub fn vertices(&self) -> &[Point2<f32>] {
        &self.vertices
    }

    /// Moment of inertia about the body's position.
    pub fn moment(&self) -> f32 {
        if self.is_static() {
            f32::INFINITY
        } else {
            self.shape.moment(self.mass())
        }
    }

    pub fn set_position(&mut self, position: Point2<f32>) {
        self.position = position;
        self.update_vertices();
    }

    pub fn set_rotation(&mut self, rotation: f32) {
        self.rotation = rotation;
        self.update_vertices();
    }

    fn update_vertices(&mut self) {
        self.vertices = self.shape.world_vertices(self.position, self.rotation);
    }

    /// Returns a copy of the body displaced by `offset`.
    pub fn copy_at(&self, offset: Vector2<f32>) -> RigidBody {
        let mut copy = self.clone();
        copy += offset;
        copy
    }

    /// The segment described by a two vertex polygon.
    pub fn segment(&self) -> Option<Segment> {
        match (&self.shape, self.vertices.as_slice()) {
            (&Shape::Polygon { .. }, &[a, b]) => Some(Segment { a, b }),
            _ => None,
        }
    }

    pub fn as_circle(&self) -> Option<Circle> {
        match self.shape {
            Shape::Circle { r } => Some(Circle { c: self.position, r }),
            _ => None,
        }
    }

    pub fn as_box(&self) -> Option<OrientedBox> {
        match self.shape {
            Shape::Rect { half_extents } => Some(OrientedBox {
                c: self.position,
                r: half_extents,
                rot: self.rotation,
            }),
            _ => None,
        }
    }

    /// For boxes, the point on the boundary in direction `d` from the center,
    /// found by scaling `d` onto the extent of its dominant axis in the box's
    /// frame.
    pub fn edge_point(&self, d: Vector2<f32>) -> Option<Point2<f32>> {
        self.as_box().map(|b| b.edge_point(d))
    }

    /// Produces the collision point between this body and `other`, with the
    /// normal pointing from this body toward `other`.
    pub fn collide(&self, other: &RigidBody) -> CollisionPoint {
        collide(self, other)
    }
}

impl AddAssign<Vector2<f32>> for RigidBody {
    fn add_assign(&mut self, v: Vector2<f32>) {
        self.position += v;
        for vert in self.vertices.iter_mut() {
            *vert += v;
        }
    }
}

impl SubAssign<Vector2<f32>> for RigidBody {
    fn sub_assign(&mut self, v: Vector2<f32>) {
        *self += -v;
    }
}

impl Convex for RigidBody {
    fn support(&self, d: Vector2<f32>) -> Point2<f32> {
        match self.shape {
            Shape::Circle { r } => {
                self.position + try_normalize(d).unwrap_or(Vector2::unit_x()) * r
            },
            _ => furthest_vertex(&self.vertices, d).unwrap_or(self.position),
        }
    }

    #[inline(always)]
    fn center(&self) -> Point2<f32> {
        self.position
    }
}

/// The kinematic state of a particle. Static particles have no velocity or
/// force to speak of.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Motion {
    Dynamic {
        velocity: Vector2<f32>,
        force: Vector2<f32>,
    },
    Static,
}

/// A description of the physical state of an object.
#[derive(Copy, Clone, Debug)]
pub struct PhysicsState {
    /// Restitution is a measure of how much kinetic energy is retained in a
    /// collision. 100% of kinetic energy retention corresponds to a coefficient
    /// of one.
    pub restitution: f32,
    /// Static objects have an inverse mass of zero.
    pub inv_mass: f32,
    pub v: Vector2<f32>,
}

/// A type that exhibits physical properties.
///
/// Calling `apply_impulse` or `transfer_force` on a static object is a no-op.
pub trait PhysicsObject {
    /// Integrate accumulated force over the timestep.
    fn integrate(&mut self, dt: f32);

    /// Return the physics state of the object
    fn state(&self) -> PhysicsState;

    /// Apply a linear impulse to the object.
    fn apply_impulse(&mut self, impulse: Vector2<f32>);

    /// Add to the object's accumulated force.
    fn transfer_force(&mut self, f: Vector2<f32>);
}

/// A rigid body with a velocity, an accumulated force and a restitution
/// coefficient.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    body: RigidBody,
    restitution: f32,
    motion: Motion,
}

fn check_restitution(restitution: f32) {
    assert!(
        restitution >= 0.0 && restitution <= 1.0,
        "restitution must be within [0, 1], found {}",
        restitution
    );
}

impl Particle {
    /// Construct a particle around `body`. A body with `STATIC_MASS` produces
    /// a static particle and the velocity and force are ignored.
    ///
    /// # Panics
    ///
    /// Panics if `restitution` lies outside of `[0, 1]`.
    pub fn new(
        body: RigidBody,
        velocity: Vector2<f32>,
        force: Vector2<f32>,
        restitution: f32,
    ) -> Self {
        check_restitution(restitution);
        let motion = if body.is_static() {
            Motion::Static
        } else {
            Motion::Dynamic { velocity, force }
        };
        Particle { body, restitution, motion }
    }

    /// Construct an immovable particle. Whatever mass the body was built with
    /// is replaced by `STATIC_MASS`.
    pub fn fixed(mut body: RigidBody) -> Self {
        body.inv_mass = 0.0;
        Particle {
            body,
            restitution: STATIC_RESTITUTION,
            motion: Motion::Static,
        }
    }

    /// Replaces the restitution coefficient.
    ///
    /// # Panics
    ///
    /// Panics if `restitution` lies outside of `[0, 1]`.
    pub fn with_restitution(self, restitution: f32) -> Self {
        check_restitution(restitution);
        Particle { restitution, ..self }
    }

    #[inline(always)]
    pub fn body(&self) -> &RigidBody {
        &self.body
    }

    /// Mutable access to the body, for repositioning it. The mass can not be
    /// changed through it.
    #[inline(always)]
    pub fn body_mut(&mut self) -> &mut RigidBody {
        &mut self.body
    }

    #[inline(always)]
    pub fn restitution(&self) -> f32 {
        self.restitution
    }

    #[inline(always)]
    pub fn motion(&self) -> Motion {
        self.motion
    }

    #[inline(always)]
    pub fn is_static(&self) -> bool {
        self.motion == Motion::Static
    }

    /// The velocity of the particle; always zero for static particles.
    pub fn velocity(&self) -> Vector2<f32> {
        match self.motion {
            Motion::Dynamic { velocity, .. } => velocity,
            Motion::Static => Vector2::zero(),
        }
    }

    /// The force accumulated since the last integration; always zero for
    /// static particles.
    pub fn force(&self) -> Vector2<f32> {
        match self.motion {
            Motion::Dynamic { force, .. } => force,
            Motion::Static => Vector2::zero(),
        }
    }

    pub fn set_velocity(&mut self, v: Vector2<f32>) -> Result<(), PhysicsError> {
        match self.motion {
            Motion::Dynamic { ref mut velocity, .. } => {
                *velocity = v;
                Ok(())
            },
            Motion::Static => Err(PhysicsError::StaticMutation),
        }
    }

    /// Accumulates `f` into the force applied at the next integration.
    pub fn add_force(&mut self, f: Vector2<f32>) -> Result<(), PhysicsError> {
        match self.motion {
            Motion::Dynamic { ref mut force, .. } => {
                *force += f;
                Ok(())
            },
            Motion::Static => Err(PhysicsError::StaticMutation),
        }
    }

    /// Moves the body along its velocity for `dt`.
    pub fn advance(&mut self, dt: f32) {
        if let Motion::Dynamic { velocity, .. } = self.motion {
            self.body += velocity * dt;
        }
    }
}

impl PhysicsObject for Particle {
    fn integrate(&mut self, dt: f32) {
        let inv_mass = self.body.inv_mass;
        if let Motion::Dynamic { ref mut velocity, ref mut force } = self.motion {
            *velocity += *force * (dt * inv_mass);
            *force = Vector2::zero();
        }
    }

    fn state(&self) -> PhysicsState {
        PhysicsState {
            restitution: self.restitution,
            inv_mass: self.body.inv_mass,
            v: self.velocity(),
        }
    }

    fn apply_impulse(&mut self, impulse: Vector2<f32>) {
        let inv_mass = self.body.inv_mass;
        if let Motion::Dynamic { ref mut velocity, .. } = self.motion {
            *velocity += impulse * inv_mass;
        }
    }

    fn transfer_force(&mut self, f: Vector2<f32>) {
        if let Motion::Dynamic { ref mut force, .. } = self.motion {
            *force += f;
        }
    }
}
