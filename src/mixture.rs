//! Gas species and mixtures.
//!
//! A mixture is a named subset of the species table together with the
//! macroscopic state emitted gas is drawn from: number density, translational
//! and internal temperatures, and the stream velocity. The emission engine
//! snapshots this state into its tasks at build time.

use rand::Rng;
use rand_distr::Exp1;
use serde::{Deserialize, Serialize};

use crate::constant::BOLTZCONST;
use nalgebra::Vector3;

/// One gas species.
#[derive(Serialize, Deserialize, Clone)]
pub struct Species {
    pub name: String,
    /// Particle mass, in SI units of kg.
    pub mass: f64,
    /// Rotational degrees of freedom.
    pub rot_dof: u32,
    /// Vibrational degrees of freedom.
    pub vib_dof: u32,
    /// Characteristic vibrational temperature, in Kelvin.
    pub vib_temp: f64,
}

/// A named mixture of species and its macroscopic emission state.
#[derive(Serialize, Deserialize, Clone)]
pub struct Mixture {
    pub name: String,
    /// Indices into the species table.
    pub species: Vec<usize>,
    /// Mole fractions, normalised to sum to one.
    pub fraction: Vec<f64>,
    /// Inclusive cumulative mole fractions; final entry is 1.0.
    pub cumulative: Vec<f64>,
    /// Number density, in 1/m^3.
    pub nrho: f64,
    /// Translational temperature, in Kelvin.
    pub temp_thermal: f64,
    /// Rotational temperature, in Kelvin.
    pub temp_rot: f64,
    /// Vibrational temperature, in Kelvin.
    pub temp_vib: f64,
    /// Stream velocity, in m/s.
    pub vstream: Vector3<f64>,
}

impl Mixture {
    /// Normalises the mole fractions and rebuilds the cumulative table.
    pub fn normalise(&mut self) {
        let total: f64 = self.fraction.iter().sum();
        assert!(
            total > 0.0,
            "Mixture {} has no positive mole fractions",
            self.name
        );
        let mut running = 0.0;
        self.cumulative.clear();
        for f in &mut self.fraction {
            *f /= total;
            running += *f;
            self.cumulative.push(running);
        }
        if let Some(last) = self.cumulative.last_mut() {
            *last = 1.0;
        }
    }

    /// Draws a mixture slot from the mole fractions. Returns a position in
    /// [Mixture::species].
    pub fn pick_slot<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let luck = rng.gen::<f64>();
        for (m, &cumulative) in self.cumulative.iter().enumerate() {
            if luck < cumulative {
                return m;
            }
        }
        self.species.len() - 1
    }

    /// Draws a species from the mixture's mole fractions. Returns an index
    /// into the species table.
    pub fn pick_species<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        self.species[self.pick_slot(rng)]
    }
}

/// The species table plus all defined mixtures.
#[derive(Default, Serialize, Deserialize)]
pub struct MixtureTable {
    pub species: Vec<Species>,
    pub mixtures: Vec<Mixture>,
}

impl MixtureTable {
    /// Index of a named mixture.
    pub fn find_mixture(&self, name: &str) -> Option<usize> {
        self.mixtures.iter().position(|m| m.name == name)
    }

    /// Index of a named species.
    pub fn find_species(&self, name: &str) -> Option<usize> {
        self.species.iter().position(|s| s.name == name)
    }

    /// Loads a species/mixture table from a YAML file. Failure to open or
    /// parse the file is fatal.
    pub fn from_yaml_file(path: &str) -> MixtureTable {
        let file = std::fs::File::open(path)
            .unwrap_or_else(|e| panic!("Unable to open mixture file {}: {}", path, e));
        let mut table: MixtureTable = serde_yaml::from_reader(file)
            .unwrap_or_else(|e| panic!("Unable to parse mixture file {}: {}", path, e));
        for mixture in &mut table.mixtures {
            mixture.normalise();
        }
        table
    }
}

/// Most probable thermal speed `sqrt(2 k T / m)` of a species at temperature
/// `temp`.
pub fn thermal_scale(mass: f64, temp: f64) -> f64 {
    (2.0 * BOLTZCONST * temp / mass).sqrt()
}

/// Draws a rotational energy from the equilibrium distribution at `temp`.
///
/// Two rotational degrees of freedom give the exponential distribution; more
/// need an accept/reject pass over the Boltzmann energy distribution, with
/// the draw bounded at ten characteristic energies.
pub fn rotational_energy<R: Rng + ?Sized>(species: &Species, temp: f64, rng: &mut R) -> f64 {
    if species.rot_dof < 2 || temp <= 0.0 {
        return 0.0;
    }
    if species.rot_dof == 2 {
        let x: f64 = rng.sample(Exp1);
        return BOLTZCONST * temp * x;
    }

    let a = 0.5 * species.rot_dof as f64 - 1.0;
    loop {
        let erm = 10.0 * rng.gen::<f64>();
        let prob = (erm / a).powf(a) * (a - erm).exp();
        if prob > rng.gen::<f64>() {
            return erm * BOLTZCONST * temp;
        }
    }
}

/// Draws a vibrational energy from the quantised harmonic-oscillator levels
/// at `temp`.
pub fn vibrational_energy<R: Rng + ?Sized>(species: &Species, temp: f64, rng: &mut R) -> f64 {
    if species.vib_dof < 2 || temp <= 0.0 || species.vib_temp <= 0.0 {
        return 0.0;
    }
    let x: f64 = rng.sample(Exp1);
    let level = (x * temp / species.vib_temp).floor();
    level * BOLTZCONST * species.vib_temp
}
