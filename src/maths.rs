//! Mathematical utilities

use crate::constant::PI;

/// The error function, evaluated with the Abramowitz and Stegun 7.1.26
/// rational approximation (absolute error below 1.5e-7).
pub fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + 0.3275911 * x);
    let poly = t
        * (0.254829592
            + t * (-0.284496736 + t * (1.421413741 + t * (-1.453152027 + t * 1.061405429))));
    sign * (1.0 - poly * (-x * x).exp())
}

/// Inward number flux through a unit area, per unit number density, for a
/// Maxwellian gas drifting towards the surface.
///
/// # Arguments
///
/// `indot`: stream velocity component along the inward surface normal, m/s.
///
/// `vscale`: most probable thermal speed `sqrt(2 k T / m)` of the species, m/s.
///
/// `fraction`: mole fraction of the species in the mixture.
///
/// Multiply by number density to obtain molecules per area per time. The
/// expression is the standard kinetic-theory surface flux integral; it tends
/// to `fraction * indot` for a strongly drifting gas and to the effusion flux
/// `fraction * vscale / (2 sqrt(pi))` for a stationary one.
pub fn inflow_number_flux(indot: f64, vscale: f64, fraction: f64) -> f64 {
    let s = indot / vscale;
    let flux = fraction * vscale * ((-s * s).exp() + PI.sqrt() * s * (1.0 + erf(s)))
        / (2.0 * PI.sqrt());
    flux.max(0.0)
}
