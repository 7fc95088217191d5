//! Surface-chemistry networks.
//!
//! A chemistry network turns the state of a reactive face into expected
//! gas-producing event rates and executes discrete reaction events. The
//! network implementation itself (kinetics, coverages, thermodynamics) lives
//! outside this crate behind the [SurfaceChemistry] trait; this module owns
//! the per-face state that the emission engine reads and writes, the network
//! registry, and the species-name mapping between the gas mixture and the
//! network's species set.

use hashbrown::HashMap;

use crate::mixture::Species;

/// Index of a registered chemistry network.
pub type NetId = usize;

/// One gas-producing pathway of a face: a reaction direction together with
/// its expected events per step and the gas products each event creates.
///
/// `avg_events` and `area` are refreshed by [SurfaceChemistry::set_state];
/// the emission engine rescales the rate by the ratio of a task's overlap
/// area to `area` so that a face shared by several cells emits in proportion.
pub struct EmissionChannel {
    /// Reaction index within the owning network.
    pub reaction: usize,
    /// Forward or reverse direction of the reaction.
    pub forward: bool,
    /// Expected number of events per timestep over the whole face.
    pub avg_events: f64,
    /// Face area the rate was computed for.
    pub area: f64,
    /// Gas products per event: (network species index, stoichiometry).
    pub products: Vec<(usize, u32)>,
}

/// Chemistry state attached to one reactive face.
pub struct FaceState {
    /// The network this face is bound to.
    pub net: NetId,
    /// Emitting area of the face, recorded by the task builder.
    pub area: f64,
    /// Gas-producing pathways currently active on the face.
    pub channels: Vec<EmissionChannel>,
    /// Cumulative forward reaction events, per reaction.
    pub events_forward: Vec<u64>,
    /// Cumulative reverse reaction events, per reaction.
    pub events_reverse: Vec<u64>,
}

impl FaceState {
    pub fn new(net: NetId, n_reactions: usize) -> FaceState {
        FaceState {
            net,
            area: 0.0,
            channels: Vec::new(),
            events_forward: vec![0; n_reactions],
            events_reverse: vec![0; n_reactions],
        }
    }

    /// Total reaction events recorded on this face so far.
    pub fn total_events(&self) -> u64 {
        self.events_forward.iter().sum::<u64>() + self.events_reverse.iter().sum::<u64>()
    }
}

/// A surface-reaction network bound to one or more faces.
///
/// The working state of a network is per-face: callers must bracket all
/// sampling of one face between `set_state` and `save_state`, and must not
/// interleave two faces inside that bracket.
pub trait SurfaceChemistry {
    /// Number of reactions in the network.
    fn n_reactions(&self) -> usize;

    /// Map a gas-species name to the network's species index.
    fn species_index(&self, name: &str) -> Option<usize>;

    /// Restore the network's working state from a face before sampling it.
    fn set_state(&mut self, face: &FaceState, step: u64, dt: f64);

    /// Write the network's working state back onto the face.
    fn save_state(&self, face: &mut FaceState);

    /// Attempt one discrete event on a channel. Returns `false` when the
    /// event does not occur; that outcome is expected, not an error.
    fn execute_event(
        &mut self,
        channel: &EmissionChannel,
        macro_weight: f64,
        temp_thermal: f64,
    ) -> bool;

    /// Zero per-step accumulation arrays once a step's sampling completes.
    fn finalize_step(&mut self, dt: f64);
}

/// Registry of chemistry networks, keyed by the surface-collide id they were
/// configured under.
#[derive(Default)]
pub struct ChemistryTable {
    nets: Vec<(String, Box<dyn SurfaceChemistry + Send + Sync>)>,
}

impl ChemistryTable {
    pub fn add(&mut self, id: &str, net: Box<dyn SurfaceChemistry + Send + Sync>) -> NetId {
        self.nets.push((id.to_string(), net));
        self.nets.len() - 1
    }

    pub fn find(&self, id: &str) -> Option<NetId> {
        self.nets.iter().position(|(name, _)| name == id)
    }

    pub fn get(&self, net: NetId) -> &dyn SurfaceChemistry {
        self.nets[net].1.as_ref()
    }

    pub fn get_mut(&mut self, net: NetId) -> &mut (dyn SurfaceChemistry + Send + Sync) {
        self.nets[net].1.as_mut()
    }

    pub fn len(&self) -> usize {
        self.nets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nets.is_empty()
    }
}

/// Reaction events accumulated over the current step, for the results log.
#[derive(Default)]
pub struct StepEvents {
    pub count: u64,
}

/// Resolve every gas species to the network's species set.
///
/// Returns the forward map (gas species index to network species index). A
/// gas species the network does not know is a configuration error and fatal.
pub fn map_species(species: &[Species], net: &dyn SurfaceChemistry) -> Vec<usize> {
    species
        .iter()
        .map(|sp| {
            net.species_index(&sp.name).unwrap_or_else(|| {
                panic!(
                    "No chemistry network species corresponds to gas species {}",
                    sp.name
                )
            })
        })
        .collect()
}

/// Invert a species map produced by [map_species].
pub fn invert_species_map(forward: &[usize]) -> HashMap<usize, usize> {
    forward
        .iter()
        .enumerate()
        .map(|(sim, &net)| (net, sim))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NamedNet {
        names: Vec<&'static str>,
    }

    impl SurfaceChemistry for NamedNet {
        fn n_reactions(&self) -> usize {
            0
        }
        fn species_index(&self, name: &str) -> Option<usize> {
            self.names.iter().position(|&n| n == name)
        }
        fn set_state(&mut self, _face: &FaceState, _step: u64, _dt: f64) {}
        fn save_state(&self, _face: &mut FaceState) {}
        fn execute_event(
            &mut self,
            _channel: &EmissionChannel,
            _macro_weight: f64,
            _temp_thermal: f64,
        ) -> bool {
            false
        }
        fn finalize_step(&mut self, _dt: f64) {}
    }

    fn species(name: &str) -> Species {
        Species {
            name: name.to_string(),
            mass: 1.0,
            rot_dof: 0,
            vib_dof: 0,
            vib_temp: 0.0,
        }
    }

    #[test]
    fn test_species_map_resolves_by_name() {
        let net = NamedNet {
            names: vec!["O2", "N2", "O"],
        };
        let gas = vec![species("N2"), species("O2")];
        let map = map_species(&gas, &net);
        assert_eq!(map, vec![1, 0]);

        let inverse = invert_species_map(&map);
        assert_eq!(inverse[&1], 0);
        assert_eq!(inverse[&0], 1);
    }

    #[test]
    #[should_panic(expected = "No chemistry network species")]
    fn test_unknown_species_is_fatal() {
        let net = NamedNet { names: vec!["O2"] };
        let gas = vec![species("Ar")];
        map_species(&gas, &net);
    }

    #[test]
    fn test_chemistry_table_lookup() {
        let mut table = ChemistryTable::default();
        let id = table.add("wall", Box::new(NamedNet { names: vec![] }));
        assert_eq!(table.find("wall"), Some(id));
        assert_eq!(table.find("inlet"), None);
    }

    #[test]
    fn test_face_state_event_totals() {
        let mut face = FaceState::new(0, 2);
        face.events_forward[0] = 3;
        face.events_reverse[1] = 4;
        assert_eq!(face.total_events(), 7);
    }
}
