//! Emission of gas particles from permeable and reactive surfaces.
//!
//! Wherever a surface element of the configured group borders a simulated
//! volume cell, particles must enter the domain at a rate and with a velocity
//! distribution consistent with kinetic theory and the upstream gas state.
//! The work is organised around emission tasks, one per (cell, surface)
//! overlap: [task] owns the relocatable task store, [builder] fills it from
//! the grid and surface geometry, [quota] splits a fixed global insertion
//! count exactly over the distributed task set, and [sampler] turns the
//! tasks into particles every step.

pub mod builder;
pub mod quota;
pub mod sampler;
pub mod task;

use specs::{DispatcherBuilder, RunNow, World, WorldExt};

use crate::chemistry::StepEvents;
use crate::hooks::StepHooks;
use crate::particle::CreationTally;

/// Adds the per-step emission systems to the dispatcher.
///
/// # Arguments
///
/// `builder`: the dispatch builder to modify
///
/// `deps`: any dependencies that must be completed before the emission
/// systems run.
pub fn add_systems_to_dispatch(
    builder: DispatcherBuilder<'static, 'static>,
    deps: &[&str],
) -> DispatcherBuilder<'static, 'static> {
    builder
        .with(
            sampler::EmitSurfaceParticlesSystem,
            "emit_surface_particles",
            deps,
        )
        .with(
            sampler::CheckpointChemistrySystem,
            "checkpoint_surface_chemistry",
            &["emit_surface_particles"],
        )
}

/// Registers resources required by the emission module.
pub fn register_resources(world: &mut World) {
    world.insert(task::TaskStore::new());
    world.insert(StepEvents::default());
}

/// Driver-facing lifecycle handle of the surface-emission engine.
///
/// The outer driver owns the step loop and calls these hooks; the engine
/// state itself lives in the world as resources.
pub struct SurfaceEmissionHooks;

impl StepHooks for SurfaceEmissionHooks {
    /// Rebuilds the task store; runs whenever the grid is (re)initialised.
    fn init(&mut self, world: &mut World) {
        builder::BuildEmissionTasksSystem.run_now(world);
        world.maintain();
    }

    /// Emits this step's particles.
    fn start_of_step(&mut self, world: &mut World) {
        sampler::EmitSurfaceParticlesSystem.run_now(world);
        world.maintain();
    }

    /// Checkpoints surface chemistry after the step's events.
    fn end_of_step(&mut self, world: &mut World) {
        sampler::CheckpointChemistrySystem.run_now(world);
    }

    /// Total particles emitted over the run.
    fn compute_scalar(&self, world: &World) -> f64 {
        world.read_resource::<CreationTally>().ntotal as f64
    }

    /// Entry 0: particles emitted this step. Entry 1: reaction events this
    /// step.
    fn compute_vector(&self, world: &World, i: usize) -> f64 {
        match i {
            0 => world.read_resource::<CreationTally>().nsingle as f64,
            1 => world.read_resource::<StepEvents>().count as f64,
            _ => 0.0,
        }
    }
}
