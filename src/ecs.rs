//! Assembles the world and dispatcher for a simulation.

use specs::{Dispatcher, DispatcherBuilder, World, WorldExt};

use crate::chemistry::ChemistryTable;
use crate::clip::ClipperRes;
use crate::emission;
use crate::grid::{Domain, Grid};
use crate::integrator::{AdvectParticlesSystem, Step, Timestep};
use crate::mixture::MixtureTable;
use crate::particle::{
    self, CreationObservers, CreationTally, DeflagNewParticlesSystem,
    DestroyDoomedParticlesSystem, MacroWeight,
};
use crate::surface::Surfaces;

/// Registers all components used by the modules of the crate.
pub fn register_components(world: &mut World) {
    particle::register_components(world);
}

/// Adds default resources to the world. Domain, grid, surfaces, mixtures and
/// chemistry start empty; the caller replaces them with the problem setup
/// before building tasks.
pub fn register_resources(world: &mut World) {
    world.insert(Timestep::default());
    world.insert(Step::default());
    world.insert(MacroWeight::default());
    world.insert(CreationTally::default());
    world.insert(CreationObservers::default());
    world.insert(Domain::default());
    world.insert(Grid::default());
    world.insert(Surfaces::default());
    world.insert(MixtureTable::default());
    world.insert(ChemistryTable::default());
    world.insert(ClipperRes::default());
    emission::register_resources(world);
}

/// Creates a `DispatcherBuilder` wired with the systems of one simulation
/// frame: deflag last step's particles, emit, advect, clean up.
pub fn create_simulation_dispatcher_builder() -> DispatcherBuilder<'static, 'static> {
    let mut builder = DispatcherBuilder::new();
    builder = builder.with(DeflagNewParticlesSystem, "deflag", &[]);
    builder.add_barrier();
    builder = emission::add_systems_to_dispatch(builder, &[]);
    builder.add_barrier();
    builder = builder.with(AdvectParticlesSystem, "advect", &[]);
    builder.add_barrier();
    builder = builder.with(DestroyDoomedParticlesSystem, "destroy", &[]);
    builder
}

/// Creates a `Dispatcher` that can be used to calculate each simulation
/// frame.
pub fn create_simulation_dispatcher() -> Dispatcher<'static, 'static> {
    create_simulation_dispatcher_builder().build()
}
