//! Implements systems to advance particle trajectories.

use rayon::prelude::ParallelIterator;
use specs::{ParJoin, ReadExpect, ReadStorage, System, WriteExpect, WriteStorage};

use crate::particle::{DtRemain, Position, Velocity};

/// Tracks the number of the current integration step.
pub struct Step {
    pub n: u64,
}
impl Default for Step {
    fn default() -> Self {
        Step { n: 0 }
    }
}

/// The timestep used for the integration.
///
/// Collisionless free flight between surface interactions is exact, so the
/// timestep is chosen to resolve particle transit across a grid cell rather
/// than any force timescale.
pub struct Timestep {
    /// Duration of the simulation timestep, in SI units of seconds.
    pub delta: f64,
}
impl Default for Timestep {
    fn default() -> Self {
        Timestep { delta: 1.0e-6 }
    }
}

/// Moves each particle by its velocity over the portion of the step it has
/// left, then restores the full timestep for the next step.
///
/// Freshly emitted particles carry a partial [DtRemain], so they drift only
/// over the remainder of the step they were born in.
pub struct AdvectParticlesSystem;

impl<'a> System<'a> for AdvectParticlesSystem {
    type SystemData = (
        WriteStorage<'a, Position>,
        WriteStorage<'a, DtRemain>,
        ReadStorage<'a, Velocity>,
        ReadExpect<'a, Timestep>,
        WriteExpect<'a, Step>,
    );

    fn run(&mut self, (mut positions, mut dt_remains, velocities, timestep, mut step): Self::SystemData) {
        step.n += 1;
        let dt = timestep.delta;
        (&mut positions, &mut dt_remains, &velocities)
            .par_join()
            .for_each(|(pos, dt_remain, vel)| {
                pos.pos += vel.vel * dt_remain.value;
                dt_remain.value = dt;
            });
    }
}
