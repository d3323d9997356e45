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

use crate::system::ParticleId;

/// Errors produced when a particle system is misused.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum PhysicsError {
    /// An interaction was declared from a particle to itself.
    #[error("particle {0:?} cannot interact with itself")]
    SelfInteraction(ParticleId),

    /// The id does not refer to a particle of the system.
    #[error("particle {0:?} is not part of the system")]
    UnknownParticle(ParticleId),

    /// Static particles have no velocity or force that could be changed.
    #[error("static particles cannot change velocity or accumulate force")]
    StaticMutation,
}
