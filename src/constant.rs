/// Mathematical constant exp(1)
pub const EXP: f64 = std::f64::consts::E;

/// Mathematical constant pi
pub const PI: f64 = std::f64::consts::PI;

/// Boltzmann constant in SI units
pub const BOLTZCONST: f64 = 1.38e-23;

/// The value of 1 Atomic Mass Unit (amu) in SI units of kg.
pub const AMU: f64 = 1.6605e-27;

/// Avogadro constant, in 1/mol.
pub const AVOGADRO: f64 = 6.02214076e23;
