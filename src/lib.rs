#[macro_use]
extern crate specs_derive;
pub mod chemistry;
pub mod clip;
pub mod constant;
pub mod ecs;
pub mod emission;
pub mod grid;
pub mod hooks;
pub mod integrator;
pub mod maths;
pub mod mixture;
pub mod output;
pub mod particle;
pub mod surface;
