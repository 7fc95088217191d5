//! Emits particles from the task store, once per timestep.
//!
//! For every live task the sampler refreshes the per-species thermal scales,
//! determines how many particles to insert (a fixed quota share, a
//! kinetic-theory flux target, or discrete chemistry events), and draws each
//! particle's position on the clipped geometry, its velocity from the
//! flux-weighted half-Maxwellian shifted by the stream, and its internal
//! energies from the species' equilibrium distributions.

use rand::Rng;
use rand_distr::Exp1;
use specs::world::EntitiesRes;
use specs::{
    Entities, LazyUpdate, Read, ReadExpect, System, Write, WriteExpect,
};

use crate::chemistry::{ChemistryTable, StepEvents};
use crate::constant::PI;
use crate::emission::builder::SurfaceEmission;
use crate::emission::task::{EmissionTask, TaskStore};
use crate::grid::{Domain, Grid};
use crate::integrator::{Step, Timestep};
use crate::maths::inflow_number_flux;
use crate::mixture::{
    rotational_energy, thermal_scale, vibrational_energy, MixtureTable, Species,
};
use crate::particle::{
    add_particle, CreationObservers, CreationTally, MacroWeight, NewParticle,
};
use crate::surface::Surfaces;
use nalgebra::Vector3;

/// Converts a real expected count into an integer, preserving the
/// expectation exactly over repeated draws.
pub fn stochastic_round<R: Rng + ?Sized>(expected: f64, rng: &mut R) -> usize {
    if expected <= 0.0 {
        return 0;
    }
    (expected + rng.gen::<f64>()) as usize
}

/// Draws a position uniformly over a task's clipped geometry.
///
/// 2-D tasks sample along the clipped segment. 3-D tasks select a fan
/// triangle from the cumulative area fractions, then fold two uniform draws
/// back into the unit simplex, which samples the triangle uniformly without
/// rejection.
pub fn sample_position<R: Rng + ?Sized>(
    task: &EmissionTask,
    dimension: usize,
    rng: &mut R,
) -> Vector3<f64> {
    if dimension == 2 {
        let t = rng.gen::<f64>();
        task.path[0] + t * (task.path[1] - task.path[0])
    } else {
        let luck = rng.gen::<f64>();
        let mut n = task.path.len() - 3;
        for (m, &frac) in task.frac_area.iter().enumerate() {
            if luck < frac {
                n = m;
                break;
            }
        }
        let p1 = task.path[0];
        let e1 = task.path[n + 1] - p1;
        let e2 = task.path[n + 2] - p1;
        let mut alpha = rng.gen::<f64>();
        let mut beta = rng.gen::<f64>();
        if alpha + beta > 1.0 {
            alpha = 1.0 - alpha;
            beta = 1.0 - beta;
        }
        p1 + alpha * e1 + beta * e2
    }
}

/// Draws the normal thermal velocity component, in units of the thermal
/// scale, from the flux-weighted half-Maxwellian shifted by the normal speed
/// ratio `scosine`.
///
/// The draw is a bounded accept/reject loop over `[-3, 3]`: candidates whose
/// total normal speed would point out of the gas are filtered, and survivors
/// are accepted against the normalised flux-weighted density. Both the
/// filter and the acceptance test re-roll together on rejection.
pub fn sample_normal_speed_ratio<R: Rng + ?Sized>(scosine: f64, rng: &mut R) -> f64 {
    loop {
        let beta_un = loop {
            let draw = 6.0 * rng.gen::<f64>() - 3.0;
            if draw + scosine >= 0.0 {
                break draw;
            }
        };
        let root = (scosine * scosine + 2.0).sqrt();
        let normalized_distbn_fn = 2.0 * (beta_un + scosine) / (scosine + root)
            * (0.5 + 0.5 * scosine * (scosine - root) - beta_un * beta_un).exp();
        if normalized_distbn_fn > rng.gen::<f64>() {
            return beta_un;
        }
    }
}

/// Draws a full particle velocity in the task's surface frame.
///
/// The normal component comes from [sample_normal_speed_ratio] scaled back to
/// m/s and offset by the stream's normal component (`indot`). The tangential
/// pair is an independent 2-D Gaussian drawn by a polar transform; unless
/// `normal_flag` redirects the whole stream along the normal, each axis is
/// offset by the stream's tangential projection.
pub fn sample_velocity<R: Rng + ?Sized>(
    task: &EmissionTask,
    normal: &Vector3<f64>,
    vscale: f64,
    indot: f64,
    normal_flag: bool,
    rng: &mut R,
) -> Vector3<f64> {
    let scosine = indot / vscale;
    let beta_un = sample_normal_speed_ratio(scosine, rng);
    let vnmag = beta_un * vscale + indot;

    let theta = 2.0 * PI * rng.gen::<f64>();
    let energy_draw: f64 = rng.sample(Exp1);
    let vr = vscale * energy_draw.sqrt();
    let (vamag, vbmag) = if normal_flag {
        (vr * theta.sin(), vr * theta.cos())
    } else {
        (
            vr * theta.sin() + task.vstream.dot(&task.tan1),
            vr * theta.cos() + task.vstream.dot(&task.tan2),
        )
    };

    vnmag * normal + vamag * task.tan1 + vbmag * task.tan2
}

#[allow(clippy::too_many_arguments)]
fn create_particle<R: Rng + ?Sized>(
    entities: &EntitiesRes,
    updater: &LazyUpdate,
    task: &EmissionTask,
    normal: &Vector3<f64>,
    dimension: usize,
    species: &Species,
    species_index: usize,
    vscale: f64,
    indot: f64,
    normal_flag: bool,
    dt: f64,
    tally: &mut CreationTally,
    observers: &mut CreationObservers,
    rng: &mut R,
) {
    let new = NewParticle {
        id: rng.gen_range(1..u32::MAX),
        species: species_index,
        cell: task.sub_cell,
        position: sample_position(task, dimension, rng),
        velocity: sample_velocity(task, normal, vscale, indot, normal_flag, rng),
        rot_energy: rotational_energy(species, task.temp_rot, rng),
        vib_energy: vibrational_energy(species, task.temp_vib, rng),
    };
    // Particles born mid-step only fly the remainder of the step.
    let dt_remain = dt * rng.gen::<f64>();
    add_particle(entities, updater, &new, dt_remain);

    for observer in &mut observers.observers {
        observer.particle_created(
            &new,
            task.temp_thermal,
            task.temp_rot,
            task.temp_vib,
            &task.vstream,
        );
    }
    tally.nsingle += 1;
    tally.ntotal += 1;
}

/// Inserts particles for every emission task. Runs at the start of each
/// step.
pub struct EmitSurfaceParticlesSystem;

impl<'a> System<'a> for EmitSurfaceParticlesSystem {
    type SystemData = (
        Entities<'a>,
        Read<'a, LazyUpdate>,
        Option<Write<'a, SurfaceEmission>>,
        ReadExpect<'a, Domain>,
        ReadExpect<'a, Grid>,
        WriteExpect<'a, Surfaces>,
        ReadExpect<'a, MixtureTable>,
        ReadExpect<'a, TaskStore>,
        WriteExpect<'a, ChemistryTable>,
        ReadExpect<'a, Timestep>,
        ReadExpect<'a, Step>,
        ReadExpect<'a, MacroWeight>,
        WriteExpect<'a, CreationTally>,
        WriteExpect<'a, CreationObservers>,
    );

    fn run(
        &mut self,
        (
            entities,
            updater,
            engine,
            domain,
            grid,
            mut surfs,
            mixtures,
            store,
            mut chemistry,
            timestep,
            step,
            macro_weight,
            mut tally,
            mut observers,
        ): Self::SystemData,
    ) {
        let mut engine = match engine {
            Some(engine) => engine,
            None => return,
        };
        let engine = &mut *engine;
        let mut rng = rand::thread_rng();

        tally.nsingle = 0;
        let dt = timestep.delta;
        let dimension = domain.dimension();
        let normal_flag = engine.options.normal_flag;
        let mixture = &mixtures.mixtures[engine.imix];

        for itask in 0..store.len() {
            let task = store.get(itask);
            let normal = surfs.normal(task.surf, dimension);

            // Thermal scales follow the task's (possibly refreshed)
            // translational temperature.
            engine.vscale.clear();
            for &isp in &mixture.species {
                engine
                    .vscale
                    .push(thermal_scale(mixtures.species[isp].mass, task.temp_thermal));
            }

            let indot = if normal_flag {
                task.vstream.norm()
            } else {
                task.vstream.dot(&normal)
            };

            if let Some(inet) = engine.net {
                // Chemistry events decide the insertions. The face's working
                // state is restored, consumed, and checkpointed as one unit.
                let face = surfs
                    .face_state_mut(task.surf, dimension)
                    .expect("Reactive surface lost its chemistry state");
                let net = chemistry.get_mut(inet);
                net.set_state(face, step.n, dt);

                for ichannel in 0..face.channels.len() {
                    let channel = &face.channels[ichannel];
                    let expected = if channel.area > 0.0 {
                        channel.avg_events * task.area / channel.area
                    } else {
                        0.0
                    };
                    let nevents = stochastic_round(expected, &mut rng);

                    for _ in 0..nevents {
                        if !net.execute_event(channel, macro_weight.fnum, task.temp_thermal) {
                            // The roll came up empty; an expected outcome.
                            continue;
                        }
                        for &(kgas, stoich) in &channel.products {
                            let species_index =
                                *engine.sim_species.get(&kgas).unwrap_or_else(|| {
                                    panic!("Chemistry species {} maps to no gas species", kgas)
                                });
                            let slot = mixture
                                .species
                                .iter()
                                .position(|&s| s == species_index)
                                .unwrap_or_else(|| {
                                    panic!(
                                        "Product species {} is not in the emission mixture",
                                        species_index
                                    )
                                });
                            for _ in 0..stoich {
                                create_particle(
                                    &entities,
                                    &updater,
                                    task,
                                    &normal,
                                    dimension,
                                    &mixtures.species[species_index],
                                    species_index,
                                    engine.vscale[slot],
                                    indot,
                                    normal_flag,
                                    dt,
                                    &mut tally,
                                    &mut observers,
                                    &mut rng,
                                );
                            }
                        }
                    }
                }
                net.save_state(face);
            } else if let Some(quota) = engine.quota {
                // Fixed global count, split exactly over the task set.
                for _ in 0..quota.count_for(itask) {
                    let slot = mixture.pick_slot(&mut rng);
                    let species_index = mixture.species[slot];
                    create_particle(
                        &entities,
                        &updater,
                        task,
                        &normal,
                        dimension,
                        &mixtures.species[species_index],
                        species_index,
                        engine.vscale[slot],
                        indot,
                        normal_flag,
                        dt,
                        &mut tally,
                        &mut observers,
                        &mut rng,
                    );
                }
            } else {
                // Kinetic-theory flux target.
                let weight = grid.cells[task.cell].weight;
                let prefactor = task.nrho * task.area * dt / macro_weight.fnum / weight;

                if engine.options.per_species {
                    for (slot, &isp) in mixture.species.iter().enumerate() {
                        let flux =
                            inflow_number_flux(indot, engine.vscale[slot], mixture.fraction[slot]);
                        let ninsert = stochastic_round(flux * prefactor, &mut rng);
                        for _ in 0..ninsert {
                            create_particle(
                                &entities,
                                &updater,
                                task,
                                &normal,
                                dimension,
                                &mixtures.species[isp],
                                isp,
                                engine.vscale[slot],
                                indot,
                                normal_flag,
                                dt,
                                &mut tally,
                                &mut observers,
                                &mut rng,
                            );
                        }
                    }
                } else {
                    let mut ntarget = 0.0;
                    for (slot, _) in mixture.species.iter().enumerate() {
                        ntarget +=
                            inflow_number_flux(indot, engine.vscale[slot], mixture.fraction[slot])
                                * prefactor;
                    }
                    let ninsert = stochastic_round(ntarget, &mut rng);
                    for _ in 0..ninsert {
                        let slot = mixture.pick_slot(&mut rng);
                        let species_index = mixture.species[slot];
                        create_particle(
                            &entities,
                            &updater,
                            task,
                            &normal,
                            dimension,
                            &mixtures.species[species_index],
                            species_index,
                            engine.vscale[slot],
                            indot,
                            normal_flag,
                            dt,
                            &mut tally,
                            &mut observers,
                            &mut rng,
                        );
                    }
                }
            }
        }
    }
}

/// Restores each reactive face and finalises the network's per-step arrays
/// once all of the step's events have been executed. Runs at the end of each
/// step; the accumulated event count is published for the results log.
pub struct CheckpointChemistrySystem;

impl<'a> System<'a> for CheckpointChemistrySystem {
    type SystemData = (
        Option<Write<'a, SurfaceEmission>>,
        ReadExpect<'a, Domain>,
        ReadExpect<'a, TaskStore>,
        WriteExpect<'a, Surfaces>,
        WriteExpect<'a, ChemistryTable>,
        ReadExpect<'a, Timestep>,
        ReadExpect<'a, Step>,
        WriteExpect<'a, StepEvents>,
    );

    fn run(
        &mut self,
        (engine, domain, store, mut surfs, mut chemistry, timestep, step, mut events): Self::SystemData,
    ) {
        let engine = match engine {
            Some(engine) => engine,
            None => return,
        };
        let inet = match engine.net {
            Some(inet) => inet,
            None => return,
        };

        let dimension = domain.dimension();
        let net = chemistry.get_mut(inet);
        events.count = 0;

        for task in store.iter() {
            let face = surfs
                .face_state_mut(task.surf, dimension)
                .expect("Reactive surface lost its chemistry state");
            events.count += face.total_events();
            net.set_state(face, step.n, timestep.delta);
            net.finalize_step(timestep.delta);
        }
    }
}
