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

//! Particle systems and interaction expansion.
//!
//! A `System` owns a set of particles and an ordered list of interactions.
//! An interaction states that its source particle pushes against its target
//! along some direction. Expanding the interactions turns them into impulses
//! that stop the particles from moving into one another, and hands any force
//! pressing a particle into its neighbours over to those neighbours.
//!
//! Interactions are usually declared in both directions. Each edge is visited
//! once, in declaration order, so the order of declaration is part of the
//! scene description.

use std::collections::HashMap;

use cgmath::{InnerSpace, Vector2};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::*;
use crate::geom::*;
use crate::physics::*;
use crate::pool::*;
use crate::solver::*;

/// Handle to a particle owned by a `System`.
///
/// Handles of removed particles may be handed out again to particles added
/// later.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParticleId(usize);

impl ParticleId {
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A directed interaction between two particles. Without an explicit
/// direction the contact normal of the source body against the target body is
/// used.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub source: ParticleId,
    pub target: ParticleId,
    pub direction: Option<Vector2<f32>>,
}

/// How the restitution coefficients of two particles are mixed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestitutionRule {
    Minimum,
    Maximum,
    Average,
    Product,
}

impl Default for RestitutionRule {
    fn default() -> Self {
        RestitutionRule::Minimum
    }
}

impl RestitutionRule {
    pub fn combine(self, a: f32, b: f32) -> f32 {
        match self {
            RestitutionRule::Minimum => a.min(b),
            RestitutionRule::Maximum => a.max(b),
            RestitutionRule::Average => (a + b) * 0.5,
            RestitutionRule::Product => a * b,
        }
    }
}

/// Parameters used when expanding interactions.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionParams {
    pub restitution: RestitutionRule,
    /// Maximum number of solver sweeps per contact group.
    pub iterations: usize,
    /// Relative change below which the solver stops early.
    pub tolerance: f32,
    /// Closing speeds and forces at or below this are treated as zero.
    pub separation_epsilon: f32,
}

impl Default for InteractionParams {
    fn default() -> Self {
        InteractionParams {
            restitution: RestitutionRule::default(),
            iterations: 64,
            tolerance: 1e-6,
            separation_epsilon: 1e-6,
        }
    }
}

/// A collection of particles and the interactions between them.
#[derive(Clone, Debug, Default)]
pub struct System {
    particles: Pool<Particle>,
    interactions: Vec<Interaction>,
    params: InteractionParams,
}

/// Edge indices of the interactions sharing a source.
type Siblings = SmallVec<[usize; 4]>;

impl System {
    /// Construct a system from a list of particles. The particles receive ids
    /// in the order given.
    pub fn new<I: IntoIterator<Item = Particle>>(particles: I) -> Self {
        let mut system = System::default();
        for p in particles {
            system.add_particle(p);
        }
        system
    }

    pub fn with_params(self, params: InteractionParams) -> Self {
        System { params, ..self }
    }

    #[inline(always)]
    pub fn params(&self) -> &InteractionParams {
        &self.params
    }

    pub fn set_params(&mut self, params: InteractionParams) {
        self.params = params;
    }

    pub fn add_particle(&mut self, particle: Particle) -> ParticleId {
        ParticleId(self.particles.push(particle))
    }

    /// Removes a particle along with every interaction it takes part in.
    pub fn remove_particle(&mut self, id: ParticleId) -> Result<Particle, PhysicsError> {
        let particle = self
            .particles
            .remove(id.0)
            .ok_or(PhysicsError::UnknownParticle(id))?;
        let before = self.interactions.len();
        self.interactions
            .retain(|i| i.source != id && i.target != id);
        let dropped = before - self.interactions.len();
        if dropped > 0 {
            debug!("dropped {} interactions of removed particle {:?}", dropped, id);
        }
        Ok(particle)
    }

    pub fn particle(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.get(id.0)
    }

    pub fn particle_mut(&mut self, id: ParticleId) -> Option<&mut Particle> {
        self.particles.get_mut(id.0)
    }

    pub fn particles(&self) -> impl Iterator<Item = (ParticleId, &Particle)> {
        self.particles.iter().map(|(i, p)| (ParticleId(i), p))
    }

    pub fn ids(&self) -> impl Iterator<Item = ParticleId> + '_ {
        self.particles.iter().map(|(i, _)| ParticleId(i))
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Declares that `source` pushes against `target`. Interactions are
    /// expanded in the order they are added.
    pub fn add_interaction(
        &mut self,
        source: ParticleId,
        target: ParticleId,
        direction: Option<Vector2<f32>>,
    ) -> Result<(), PhysicsError> {
        if source == target {
            return Err(PhysicsError::SelfInteraction(source));
        }
        for &id in [source, target].iter() {
            if !self.particles.contains(id.0) {
                return Err(PhysicsError::UnknownParticle(id));
            }
        }
        self.interactions.push(Interaction { source, target, direction });
        Ok(())
    }

    #[inline(always)]
    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    pub fn clear_interactions(&mut self) {
        self.interactions.clear();
    }

    /// The unit direction of an interaction, or None if it can have no
    /// effect.
    ///
    /// Without an explicit direction the bodies are tested against each other
    /// and the interaction only applies while they touch or overlap.
    fn direction(&self, interaction: &Interaction) -> Option<Vector2<f32>> {
        let source = self.particles.get(interaction.source.0)?;
        let target = self.particles.get(interaction.target.0)?;
        if source.is_static() && target.is_static() {
            return None;
        }
        let d = match interaction.direction {
            Some(d) => d,
            None => {
                let point = source.body().collide(target.body());
                if !point.colliding && point.distance > COLLISION_EPSILON {
                    debug!(
                        "skipping interaction {:?} -> {:?}, bodies are {} apart",
                        interaction.source, interaction.target, point.distance
                    );
                    return None;
                }
                point.normal
            },
        };
        let n = try_normalize(d);
        if n.is_none() {
            debug!(
                "skipping interaction {:?} -> {:?} with a degenerate direction",
                interaction.source, interaction.target
            );
        }
        n
    }

    fn state(&self, id: ParticleId) -> Option<PhysicsState> {
        self.particles.get(id.0).map(|p| p.state())
    }

    /// Resolves every interaction once, in declaration order.
    ///
    /// For each edge, every interaction of the same source that is closing is
    /// resolved together with it, so that a particle striking several bodies
    /// at once shares its momentum among them. A dynamic source whose
    /// accumulated force presses along its edges then passes that force on to
    /// the targets. Static particles are never moved.
    pub fn expand_interactions(&mut self) {
        let directions: Vec<Option<Vector2<f32>>> = self
            .interactions
            .iter()
            .map(|i| self.direction(i))
            .collect();
        let mut by_source: HashMap<ParticleId, Siblings> = HashMap::new();
        for (i, interaction) in self.interactions.iter().enumerate() {
            by_source.entry(interaction.source).or_default().push(i);
        }
        for i in 0..self.interactions.len() {
            if directions[i].is_none() {
                continue;
            }
            let source = self.interactions[i].source;
            if let Some(siblings) = by_source.get(&source) {
                self.resolve_velocities(i, siblings, &directions);
                self.propagate_load(i, siblings, &directions);
            }
        }
    }

    fn resolve_velocities(
        &mut self,
        edge: usize,
        siblings: &[usize],
        directions: &[Option<Vector2<f32>>],
    ) {
        let source_id = self.interactions[edge].source;
        let source = match self.state(source_id) {
            Some(s) => s,
            None => return,
        };
        let eps = self.params.separation_epsilon;

        // Closing contacts of the source: (edge, normal, closing speed, target).
        let mut group: SmallVec<[(usize, Vector2<f32>, f32, PhysicsState); 4]> = SmallVec::new();
        for &k in siblings {
            let (n, target) = match (directions[k], self.state(self.interactions[k].target)) {
                (Some(n), Some(target)) => (n, target),
                _ => continue,
            };
            let u = (source.v - target.v).dot(n);
            if u > eps {
                group.push((k, n, u, target));
            }
        }
        if !group.iter().any(|&(k, ..)| k == edge) {
            return;
        }

        let mut sys = ProjectedSystem::new(group.len());
        for (r, &(k, n, u, target)) in group.iter().enumerate() {
            let e = self.params.restitution.combine(source.restitution, target.restitution);
            sys.set_rhs(r, (1.0 + e) * u);
            let target_id = self.interactions[k].target;
            for (c, &(l, m, ..)) in group.iter().enumerate() {
                let shared = if self.interactions[l].target == target_id {
                    target.inv_mass
                } else {
                    0.0
                };
                sys.set_coeff(r, c, n.dot(m) * (source.inv_mass + shared));
            }
        }
        let impulses = sys.solve(self.params.iterations, self.params.tolerance);
        trace!(
            "particle {:?} resolved {} contacts with impulses {:?}",
            source_id,
            group.len(),
            impulses
        );

        for (&(k, n, ..), &j) in group.iter().zip(impulses.iter()) {
            let impulse = n * j;
            if let Some(p) = self.particles.get_mut(source_id.0) {
                p.apply_impulse(-impulse);
            }
            if let Some(p) = self.particles.get_mut(self.interactions[k].target.0) {
                p.apply_impulse(impulse);
            }
        }
    }

    fn propagate_load(
        &mut self,
        edge: usize,
        siblings: &[usize],
        directions: &[Option<Vector2<f32>>],
    ) {
        let source_id = self.interactions[edge].source;
        let f = match self.particles.get(source_id.0) {
            Some(p) if !p.is_static() => p.force(),
            _ => return,
        };
        let eps = self.params.separation_epsilon;

        let mut group: SmallVec<[(usize, Vector2<f32>); 4]> = SmallVec::new();
        for &k in siblings {
            if let Some(n) = directions[k] {
                if f.dot(n) > eps {
                    group.push((k, n));
                }
            }
        }
        if !group.iter().any(|&(k, _)| k == edge) {
            return;
        }

        // Largest non-negative combination of the pushing directions that
        // the force covers.
        let mut sys = ProjectedSystem::new(group.len());
        for (r, &(_, n)) in group.iter().enumerate() {
            sys.set_rhs(r, f.dot(n));
            for (c, &(_, m)) in group.iter().enumerate() {
                sys.set_coeff(r, c, n.dot(m));
            }
        }
        let loads = sys.solve(self.params.iterations, self.params.tolerance);

        for (&(k, n), &c) in group.iter().zip(loads.iter()) {
            let load = n * c;
            let target_id = self.interactions[k].target;
            trace!("particle {:?} transfers {:?} to {:?}", source_id, load, target_id);
            if let Some(p) = self.particles.get_mut(source_id.0) {
                p.transfer_force(-load);
            }
            if let Some(p) = self.particles.get_mut(target_id.0) {
                p.transfer_force(load);
            }
        }
    }

    /// Integrates the accumulated force of every particle.
    pub fn integrate(&mut self, dt: f32) {
        for (_, p) in self.particles.iter_mut() {
            p.integrate(dt);
        }
    }

    /// Expands interactions, integrates forces and moves every particle along
    /// its velocity.
    pub fn step(&mut self, dt: f32) {
        self.expand_interactions();
        for (_, p) in self.particles.iter_mut() {
            p.integrate(dt);
            p.advance(dt);
        }
    }
}
