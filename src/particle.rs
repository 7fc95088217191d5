//! Gas particle components and particle creation.
//!
//! Particles are entities carrying position, velocity, species, internal
//! energy, and the grid sub-cell they currently occupy. Creation goes through
//! [add_particle], which defers component insertion through `LazyUpdate` and
//! tags the entity [NewlyCreated] so downstream modules can initialise it;
//! the marker is cleared each step by [DeflagNewParticlesSystem].

use nalgebra::Vector3;
use specs::world::EntitiesRes;
use specs::{
    Component, Entities, Entity, Join, LazyUpdate, NullStorage, Read, ReadStorage, System,
    VecStorage, World, WorldExt,
};

use crate::grid::CellId;

/// Marker component for gas particles.
#[derive(Component, Default)]
#[storage(NullStorage)]
pub struct Particle;

/// Randomised positive identifier carried by each particle.
#[derive(Component, Clone, Copy)]
#[storage(VecStorage)]
pub struct ParticleId {
    pub id: u32,
}

/// Index of the particle's species in the species table.
#[derive(Component, Clone, Copy)]
#[storage(VecStorage)]
pub struct SpeciesIndex {
    pub index: usize,
}

/// Position of a particle, in SI units of metres.
#[derive(Component, Clone, Copy)]
#[storage(VecStorage)]
pub struct Position {
    pub pos: Vector3<f64>,
}

/// Velocity of a particle, in SI units of m/s.
#[derive(Component, Clone, Copy)]
#[storage(VecStorage)]
pub struct Velocity {
    pub vel: Vector3<f64>,
}

/// Rotational and vibrational energy of a particle, in Joules.
#[derive(Component, Clone, Copy)]
#[storage(VecStorage)]
pub struct InternalEnergy {
    pub rotational: f64,
    pub vibrational: f64,
}

/// The grid sub-cell the particle is assigned to.
#[derive(Component, Clone, Copy)]
#[storage(VecStorage)]
pub struct InCell {
    pub cell: CellId,
}

/// Fraction of the current timestep the particle still has to move.
///
/// Freshly emitted particles receive a value in `[0, dt)` so they start
/// their motion mid-step; the advection system resets it to the full
/// timestep afterwards.
#[derive(Component, Clone, Copy)]
#[storage(VecStorage)]
pub struct DtRemain {
    pub value: f64,
}

/// Marker attached to particles on the step they are created.
#[derive(Component, Default)]
#[storage(NullStorage)]
pub struct NewlyCreated;

/// Marker for particles that must be removed at the end of the step.
#[derive(Component, Default)]
#[storage(NullStorage)]
pub struct Doomed;

/// Number of real molecules represented by one simulated particle.
pub struct MacroWeight {
    pub fnum: f64,
}

impl Default for MacroWeight {
    fn default() -> Self {
        MacroWeight { fnum: 1.0 }
    }
}

/// Counts of particles created by emission.
#[derive(Default)]
pub struct CreationTally {
    /// Particles created during the current step.
    pub nsingle: u64,
    /// Particles created over the whole run.
    pub ntotal: u64,
}

/// Everything known about a particle at the moment of creation.
pub struct NewParticle {
    pub id: u32,
    pub species: usize,
    pub cell: CellId,
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub rot_energy: f64,
    pub vib_energy: f64,
}

/// Observer notified for every created particle, with the emission state it
/// was drawn from.
pub trait CreationObserver: Send + Sync {
    fn particle_created(
        &mut self,
        particle: &NewParticle,
        temp_thermal: f64,
        temp_rot: f64,
        temp_vib: f64,
        vstream: &Vector3<f64>,
    );
}

/// The registered creation observers.
#[derive(Default)]
pub struct CreationObservers {
    pub observers: Vec<Box<dyn CreationObserver>>,
}

/// Creates a particle entity with all its components. Insertion is deferred
/// through `LazyUpdate` and becomes visible after `world.maintain()`.
pub fn add_particle(
    entities: &EntitiesRes,
    updater: &LazyUpdate,
    new: &NewParticle,
    dt_remain: f64,
) -> Entity {
    let entity = entities.create();
    updater.insert(entity, Particle);
    updater.insert(entity, ParticleId { id: new.id });
    updater.insert(
        entity,
        SpeciesIndex {
            index: new.species,
        },
    );
    updater.insert(entity, Position { pos: new.position });
    updater.insert(entity, Velocity { vel: new.velocity });
    updater.insert(
        entity,
        InternalEnergy {
            rotational: new.rot_energy,
            vibrational: new.vib_energy,
        },
    );
    updater.insert(entity, InCell { cell: new.cell });
    updater.insert(entity, DtRemain { value: dt_remain });
    updater.insert(entity, NewlyCreated);
    entity
}

/// Removes the [NewlyCreated] marker from last step's particles.
pub struct DeflagNewParticlesSystem;

impl<'a> System<'a> for DeflagNewParticlesSystem {
    type SystemData = (
        Entities<'a>,
        ReadStorage<'a, NewlyCreated>,
        Read<'a, LazyUpdate>,
    );

    fn run(&mut self, (entities, newly_created, updater): Self::SystemData) {
        for (entity, _) in (&entities, &newly_created).join() {
            updater.remove::<NewlyCreated>(entity);
        }
    }
}

/// Deletes particles marked [Doomed].
pub struct DestroyDoomedParticlesSystem;

impl<'a> System<'a> for DestroyDoomedParticlesSystem {
    type SystemData = (Entities<'a>, ReadStorage<'a, Doomed>);

    fn run(&mut self, (entities, doomed): Self::SystemData) {
        for (entity, _) in (&entities, &doomed).join() {
            entities
                .delete(entity)
                .expect("Could not delete doomed particle");
        }
    }
}

/// Registers components used by this module.
pub fn register_components(world: &mut World) {
    world.register::<Particle>();
    world.register::<ParticleId>();
    world.register::<SpeciesIndex>();
    world.register::<Position>();
    world.register::<Velocity>();
    world.register::<InternalEnergy>();
    world.register::<InCell>();
    world.register::<DtRemain>();
    world.register::<NewlyCreated>();
    world.register::<Doomed>();
}
