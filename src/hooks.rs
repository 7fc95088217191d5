//! Lifecycle hooks engines expose to the outer simulation driver.
//!
//! The driver owns the timestep loop; engines plug into it through a small
//! set of hooks. `init` runs once per grid (re)build, `setup` once before the
//! first step after pointers/resources may have moved, `start_of_step` and
//! `end_of_step` bracket every step, and the `compute_*` accessors expose
//! diagnostics the driver can tabulate.

use specs::World;

/// Per-step lifecycle hooks of one engine.
pub trait StepHooks {
    /// Runs once whenever the grid is (re)initialised.
    fn init(&mut self, world: &mut World);

    /// Runs once before stepping begins.
    fn setup(&mut self, _world: &mut World) {}

    /// Runs at the start of every step.
    fn start_of_step(&mut self, world: &mut World);

    /// Runs at the end of every step.
    fn end_of_step(&mut self, _world: &mut World) {}

    /// A scalar diagnostic of the engine.
    fn compute_scalar(&self, _world: &World) -> f64 {
        0.0
    }

    /// One entry of a vector diagnostic.
    fn compute_vector(&self, _world: &World, _i: usize) -> f64 {
        0.0
    }

    /// One entry of an array diagnostic.
    fn compute_array(&self, _world: &World, _i: usize, _j: usize) -> f64 {
        0.0
    }
}
