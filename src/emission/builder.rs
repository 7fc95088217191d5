//! Builds emission tasks from the grid, the surface list, and the gas state.
//!
//! Task building runs once per grid (re)initialisation: every cell is walked,
//! each surface in the cell matching the configured group is clipped against
//! the cell bounds, and a task is appended carrying the clipped geometry, the
//! overlap area, an orthonormal tangent frame, and a snapshot of the mixture
//! state. Configuration problems are fatal here; a clip without true overlap
//! just drops the candidate.

use hashbrown::HashMap;
use rand::Rng;
use serde::{Deserialize, Serialize};
use specs::{Read, ReadExpect, System, Write, WriteExpect};

use crate::chemistry::{invert_species_map, map_species, ChemistryTable, NetId};
use crate::clip::{Clipper, ClipperRes};
use crate::constant::PI;
use crate::emission::quota::{split_insertions, QuotaSplit, RankScan};
use crate::emission::task::{EmissionTask, TaskStore};
use crate::grid::{CellId, Domain, Grid};
use crate::mixture::{Mixture, MixtureTable};
use crate::surface::Surfaces;
use nalgebra::Vector3;

fn default_true() -> bool {
    true
}

/// User-facing configuration of one surface-emission engine.
#[derive(Serialize, Deserialize, Clone)]
pub struct EmissionOptions {
    /// Mixture the emitted gas is drawn from.
    pub mixture: String,
    /// Surface group the engine emits from.
    pub group: String,
    /// Fixed global number of insertions per step. Mutually exclusive with
    /// per-species accounting.
    #[serde(default)]
    pub total_per_step: Option<usize>,
    /// Apply the stream speed along each surface normal instead of
    /// projecting the stream vector.
    #[serde(default)]
    pub normal_flag: bool,
    /// Chemistry network binding, keyed by surface-collide id.
    #[serde(default)]
    pub chemistry: Option<String>,
    /// Track emission targets per species rather than for the mixture as a
    /// whole.
    #[serde(default = "default_true")]
    pub per_species: bool,
}

impl EmissionOptions {
    /// Loads emission options from a YAML file. Failure to open or parse the
    /// file is fatal.
    pub fn from_yaml_file(path: &str) -> EmissionOptions {
        let file = std::fs::File::open(path)
            .unwrap_or_else(|e| panic!("Unable to open emission options file {}: {}", path, e));
        serde_yaml::from_reader(file)
            .unwrap_or_else(|e| panic!("Unable to parse emission options file {}: {}", path, e))
    }
}

/// The surface-emission engine: resolved configuration plus per-build state.
///
/// Constructing the engine validates the whole configuration; any
/// inconsistency is fatal, matching the abort-style error model of the
/// surrounding run.
pub struct SurfaceEmission {
    pub options: EmissionOptions,
    /// Resolved mixture index.
    pub imix: usize,
    /// Bitmask of the emitting surface group.
    pub groupbit: u32,
    /// Chemistry network all emitting surfaces must share, when bound.
    pub net: Option<NetId>,
    /// Gas species index to network species index.
    pub net_species: Vec<usize>,
    /// Network species index to gas species index.
    pub sim_species: HashMap<usize, usize>,
    /// This rank's share of a fixed global insertion count.
    pub quota: Option<QuotaSplit>,
    /// Per-task scratch: thermal speed scale of each mixture species.
    pub vscale: Vec<f64>,
}

impl SurfaceEmission {
    pub fn new(
        options: EmissionOptions,
        mixtures: &MixtureTable,
        surfaces: &Surfaces,
        chemistry: &ChemistryTable,
    ) -> SurfaceEmission {
        let imix = mixtures
            .find_mixture(&options.mixture)
            .unwrap_or_else(|| panic!("Emission mixture ID {} does not exist", options.mixture));

        if options.per_species && options.mixture != "all" {
            panic!("Per-species emission accounting requires the mixture \"all\"");
        }
        if options.total_per_step.is_some() && options.per_species {
            panic!("A fixed insertion count cannot be combined with per-species accounting");
        }
        if options.chemistry.is_some() && options.mixture != "all" {
            panic!("Chemistry-driven emission requires the mixture \"all\"");
        }

        let groupbit = surfaces
            .find_group(&options.group)
            .unwrap_or_else(|| panic!("Emission surface group ID {} does not exist", options.group));

        let net = options.chemistry.as_ref().map(|id| {
            chemistry
                .find(id)
                .unwrap_or_else(|| panic!("Surface chemistry ID {} does not exist", id))
        });

        let (net_species, sim_species) = match net {
            Some(inet) => {
                let forward = map_species(&mixtures.species, chemistry.get(inet));
                let inverse = invert_species_map(&forward);
                (forward, inverse)
            }
            None => (Vec::new(), HashMap::new()),
        };

        SurfaceEmission {
            options,
            imix,
            groupbit,
            net,
            net_species,
            sim_species,
            quota: None,
            vscale: Vec::new(),
        }
    }

    /// Builds the tasks of one grid cell.
    ///
    /// Surfaces outside the configured group and clips without true overlap
    /// are skipped. For reactive runs, every emitting surface must carry a
    /// chemistry state bound to the engine's network, and the state's
    /// recorded area is refreshed with the overlap area.
    #[allow(clippy::too_many_arguments)]
    pub fn create_tasks_for_cell<R: Rng + ?Sized>(
        &mut self,
        icell: CellId,
        domain: &Domain,
        grid: &Grid,
        surfs: &mut Surfaces,
        mixture: &Mixture,
        clipper: &dyn Clipper,
        store: &mut TaskStore,
        rng: &mut R,
    ) {
        let cell = &grid.cells[icell];
        if cell.surfs.is_empty() {
            return;
        }

        let dimension = domain.dimension();

        for (slot, &isurf) in cell.surfs.iter().enumerate() {
            let mask = if dimension == 2 {
                surfs.lines[isurf].mask
            } else {
                surfs.tris[isurf].mask
            };
            if mask & self.groupbit == 0 {
                continue;
            }

            let geometry = if dimension == 2 {
                let line = &surfs.lines[isurf];
                let path = clipper.clip_line(&line.p1, &line.p2, &cell.lo, &cell.hi);
                if path.len() < 2 {
                    continue;
                }
                let area = segment_area(&path, domain.axisymmetric());
                let (tan1, tan2) = segment_tangent_frame(&line.norm);
                (path, Vec::new(), area, tan1, tan2)
            } else {
                let tri = &surfs.tris[isurf];
                let path = clipper.clip_tri(&tri.p1, &tri.p2, &tri.p3, &cell.lo, &cell.hi);
                if path.len() < 3 {
                    continue;
                }
                let (frac_area, area) = fan_areas(&path);
                if area <= 0.0 {
                    continue;
                }
                let (tan1, tan2) = polygon_tangent_frame(&tri.norm, rng);
                (path, frac_area, area, tan1, tan2)
            };
            let (path, frac_area, area, tan1, tan2) = geometry;

            if let Some(inet) = self.net {
                let state = surfs.face_state_mut(isurf, dimension).unwrap_or_else(|| {
                    panic!("Surface {} has no chemistry state attached", isurf)
                });
                if state.net != inet {
                    panic!(
                        "Chemistry network on surface {} differs from the engine's network",
                        isurf
                    );
                }
                state.area = area;
            }

            store.append(EmissionTask {
                cell: icell,
                sub_cell: grid.sub_cell_for_slot(icell, slot),
                surf: isurf,
                path,
                frac_area,
                area,
                tan1,
                tan2,
                nrho: mixture.nrho,
                temp_thermal: mixture.temp_thermal,
                temp_rot: mixture.temp_rot,
                temp_vib: mixture.temp_vib,
                vstream: mixture.vstream,
            });
        }
    }
}

/// Overlap "area" of a clipped segment: its length, or in axisymmetric mode
/// the surface of the truncated cone the segment sweeps about the axis,
/// `pi (y1 + y2) sqrt((y1 - y2)^2 + (x1 - x2)^2)`.
pub fn segment_area(path: &[Vector3<f64>], axisymmetric: bool) -> f64 {
    let (p1, p2) = (&path[0], &path[1]);
    if axisymmetric {
        let slant = ((p1[1] - p2[1]).powi(2) + (p1[0] - p2[0]).powi(2)).sqrt();
        PI * (p1[1] + p2[1]) * slant
    } else {
        (p2 - p1).norm()
    }
}

/// Fan-triangulates a convex polygon from vertex 0 and returns the
/// cumulative area fractions (normalised, final entry 1.0) and the total
/// area.
pub fn fan_areas(path: &[Vector3<f64>]) -> (Vec<f64>, f64) {
    let p1 = path[0];
    let mut area = 0.0;
    let mut frac_area = Vec::with_capacity(path.len() - 2);
    for m in 0..path.len() - 2 {
        let e1 = path[m + 1] - p1;
        let e2 = path[m + 2] - p1;
        area += 0.5 * e1.cross(&e2).norm();
        frac_area.push(area);
    }
    if area > 0.0 {
        for frac in &mut frac_area {
            *frac /= area;
        }
    }
    (frac_area, area)
}

/// Tangent frame of a 2-D surface: the in-plane perpendicular of the normal
/// plus the out-of-plane axis.
pub fn segment_tangent_frame(norm: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    (
        Vector3::new(norm[1], -norm[0], 0.0),
        Vector3::new(0.0, 0.0, 1.0),
    )
}

/// Tangent frame of a 3-D surface: two unit vectors orthogonal to the normal
/// and to each other, seeded by a random in-plane direction.
pub fn polygon_tangent_frame<R: Rng + ?Sized>(
    norm: &Vector3<f64>,
    rng: &mut R,
) -> (Vector3<f64>, Vector3<f64>) {
    let seed = Vector3::new(rng.gen::<f64>(), rng.gen::<f64>(), rng.gen::<f64>());
    let tan1 = norm.cross(&seed).normalize();
    let tan2 = norm.cross(&tan1).normalize();
    (tan1, tan2)
}

/// Rebuilds the task store from the current grid, then computes this rank's
/// quota split when a fixed insertion count is configured.
///
/// Runs whenever the grid is (re)initialised, via
/// [SurfaceEmissionHooks::init](crate::emission::SurfaceEmissionHooks). On a
/// multi-rank run the driver inserts a [RankScan] resource first; without
/// one the rank is treated as the whole run.
pub struct BuildEmissionTasksSystem;

impl<'a> System<'a> for BuildEmissionTasksSystem {
    type SystemData = (
        Option<Write<'a, SurfaceEmission>>,
        ReadExpect<'a, Domain>,
        ReadExpect<'a, Grid>,
        WriteExpect<'a, Surfaces>,
        ReadExpect<'a, MixtureTable>,
        ReadExpect<'a, ClipperRes>,
        WriteExpect<'a, TaskStore>,
        Option<Read<'a, RankScan>>,
    );

    fn run(
        &mut self,
        (engine, domain, grid, mut surfs, mixtures, clipper, mut store, scan): Self::SystemData,
    ) {
        let mut engine = match engine {
            Some(engine) => engine,
            None => return,
        };
        let mut rng = rand::thread_rng();

        store.clear();
        let mixture = &mixtures.mixtures[engine.imix];
        for icell in 0..grid.cells.len() {
            engine.create_tasks_for_cell(
                icell,
                &domain,
                &grid,
                &mut surfs,
                mixture,
                clipper.0.as_ref(),
                &mut store,
                &mut rng,
            );
        }

        let local = store.len();
        let (total, upto) = match scan {
            Some(scan) => (scan.total, scan.upto),
            None => (local, local),
        };
        engine.quota = engine
            .options
            .total_per_step
            .map(|target| split_insertions(local, total, upto, target));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chemistry::FaceState;
    use crate::grid::{Cell, DomainKind, SplitInfo};
    use crate::mixture::Species;
    use crate::surface::{Line, Tri};
    use assert_approx_eq::assert_approx_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    pub fn test_mixtures() -> MixtureTable {
        let mut mixture = Mixture {
            name: "all".to_string(),
            species: vec![0],
            fraction: vec![1.0],
            cumulative: Vec::new(),
            nrho: 1e20,
            temp_thermal: 300.0,
            temp_rot: 300.0,
            temp_vib: 300.0,
            vstream: Vector3::new(0.0, 0.0, 0.0),
        };
        mixture.normalise();
        MixtureTable {
            species: vec![Species {
                name: "N2".to_string(),
                mass: 4.65e-26,
                rot_dof: 2,
                vib_dof: 2,
                vib_temp: 3371.0,
            }],
            mixtures: vec![mixture],
        }
    }

    pub fn default_options() -> EmissionOptions {
        EmissionOptions {
            mixture: "all".to_string(),
            group: "all".to_string(),
            total_per_step: None,
            normal_flag: false,
            chemistry: None,
            per_species: true,
        }
    }

    fn unit_cell() -> Cell {
        Cell::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0))
    }

    fn engine(options: EmissionOptions) -> SurfaceEmission {
        SurfaceEmission::new(
            options,
            &test_mixtures(),
            &Surfaces::default(),
            &ChemistryTable::default(),
        )
    }

    #[test]
    fn test_options_load_from_yaml_with_defaults() {
        let path = std::env::temp_dir().join("raregas_emission_options.yaml");
        std::fs::write(&path, "mixture: all\ngroup: inlet\ntotal_per_step: 500\nper_species: false\n")
            .unwrap();

        let options = EmissionOptions::from_yaml_file(path.to_str().unwrap());
        assert_eq!(options.mixture, "all");
        assert_eq!(options.group, "inlet");
        assert_eq!(options.total_per_step, Some(500));
        assert!(!options.per_species);
        // Omitted keys fall back to their defaults.
        assert!(!options.normal_flag);
        assert!(options.chemistry.is_none());

        let minimal: EmissionOptions =
            serde_yaml::from_str("mixture: all\ngroup: all\n").unwrap();
        assert!(minimal.per_species);
        assert!(minimal.total_per_step.is_none());
    }

    #[test]
    #[should_panic(expected = "mixture ID")]
    fn test_unknown_mixture_is_fatal() {
        let mut options = default_options();
        options.mixture = "argon".to_string();
        options.per_species = false;
        engine(options);
    }

    #[test]
    #[should_panic(expected = "group ID")]
    fn test_unknown_group_is_fatal() {
        let mut options = default_options();
        options.group = "inlet".to_string();
        engine(options);
    }

    #[test]
    #[should_panic(expected = "cannot be combined")]
    fn test_fixed_count_with_per_species_is_fatal() {
        let mut options = default_options();
        options.total_per_step = Some(100);
        engine(options);
    }

    #[test]
    #[should_panic(expected = "chemistry ID")]
    fn test_unknown_chemistry_is_fatal() {
        let mut options = default_options();
        options.chemistry = Some("wall".to_string());
        engine(options);
    }

    fn build_tasks(
        domain: Domain,
        grid: &Grid,
        surfs: &mut Surfaces,
        engine: &mut SurfaceEmission,
    ) -> TaskStore {
        let mut store = TaskStore::new();
        let mixtures = test_mixtures();
        let mut rng = StdRng::seed_from_u64(5);
        for icell in 0..grid.cells.len() {
            engine.create_tasks_for_cell(
                icell,
                &domain,
                grid,
                surfs,
                &mixtures.mixtures[0],
                &crate::clip::AxisBoxClipper,
                &mut store,
                &mut rng,
            );
        }
        store
    }

    #[test]
    fn test_planar_segment_task() {
        let domain = Domain {
            kind: DomainKind::Planar2d,
        };
        let mut grid = Grid::default();
        let mut cell = unit_cell();
        cell.surfs = vec![0];
        grid.cells.push(cell);

        let mut surfs = Surfaces::default();
        surfs.lines.push(Line::new(
            Vector3::new(-0.5, 0.5, 0.0),
            Vector3::new(1.5, 0.5, 0.0),
        ));

        let mut engine = engine(default_options());
        let store = build_tasks(domain, &grid, &mut surfs, &mut engine);

        assert_eq!(store.len(), 1);
        let task = store.get(0);
        assert_eq!(task.path.len(), 2);
        assert_approx_eq!(task.area, 1.0, 1e-12);
        assert!(task.frac_area.is_empty());
        // Orthonormal frame.
        assert_approx_eq!(task.tan1.norm(), 1.0, 1e-12);
        assert_approx_eq!(task.tan1.dot(&surfs.lines[0].norm), 0.0, 1e-12);
        assert_approx_eq!(task.tan1.dot(&task.tan2), 0.0, 1e-12);
        // Snapshot copied from the mixture.
        assert_approx_eq!(task.nrho, 1e20, 1e8);
        assert_approx_eq!(task.temp_thermal, 300.0, 1e-9);
    }

    #[test]
    fn test_axisymmetric_segment_area_is_cone_surface() {
        let domain = Domain {
            kind: DomainKind::Axisymmetric2d,
        };
        let mut grid = Grid::default();
        let mut cell = Cell::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(2.0, 3.0, 0.0));
        cell.surfs = vec![0];
        grid.cells.push(cell);

        let mut surfs = Surfaces::default();
        surfs.lines.push(Line::new(
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(1.0, 2.0, 0.0),
        ));

        let mut engine = engine(default_options());
        let store = build_tasks(domain, &grid, &mut surfs, &mut engine);
        assert_eq!(store.len(), 1);
        assert_approx_eq!(store.get(0).area, PI * 3.0 * 2.0_f64.sqrt(), 1e-9);
    }

    #[test]
    fn test_surface_outside_group_is_skipped() {
        let domain = Domain {
            kind: DomainKind::Planar2d,
        };
        let mut grid = Grid::default();
        let mut cell = unit_cell();
        cell.surfs = vec![0];
        grid.cells.push(cell);

        let mut surfs = Surfaces::default();
        let inlet = surfs.add_group("inlet");
        surfs.add_group("outlet");
        let mut line = Line::new(Vector3::new(0.2, 0.5, 0.0), Vector3::new(0.8, 0.5, 0.0));
        line.mask |= inlet;
        surfs.lines.push(line);

        // Engine emits from a different group.
        let mut options = default_options();
        options.group = "outlet".to_string();
        let mut engine = SurfaceEmission::new(
            options,
            &test_mixtures(),
            &surfs,
            &ChemistryTable::default(),
        );
        let store = build_tasks(domain, &grid, &mut surfs, &mut engine);
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_clip_without_overlap_drops_candidate() {
        let domain = Domain {
            kind: DomainKind::Planar2d,
        };
        let mut grid = Grid::default();
        let mut cell = unit_cell();
        cell.surfs = vec![0];
        grid.cells.push(cell);

        let mut surfs = Surfaces::default();
        surfs.lines.push(Line::new(
            Vector3::new(-2.0, 5.0, 0.0),
            Vector3::new(3.0, 5.0, 0.0),
        ));

        let mut engine = engine(default_options());
        let store = build_tasks(domain, &grid, &mut surfs, &mut engine);
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_polygon_fan_fractions_are_normalised() {
        let domain = Domain {
            kind: DomainKind::ThreeD,
        };
        let mut grid = Grid::default();
        let mut cell = unit_cell();
        cell.surfs = vec![0];
        grid.cells.push(cell);

        let mut surfs = Surfaces::default();
        // Apex pokes out through x = 1; the clip is a quad, so the fan has
        // two triangles.
        surfs.tris.push(Tri::new(
            Vector3::new(0.5, 0.2, 0.5),
            Vector3::new(1.5, 0.5, 0.5),
            Vector3::new(0.5, 0.8, 0.5),
        ));

        let mut engine = engine(default_options());
        let store = build_tasks(domain, &grid, &mut surfs, &mut engine);

        assert_eq!(store.len(), 1);
        let task = store.get(0);
        assert_eq!(task.path.len(), 4);
        assert_eq!(task.frac_area.len(), 2);
        assert!(task.frac_area[0] <= task.frac_area[1]);
        assert_approx_eq!(*task.frac_area.last().unwrap(), 1.0, 1e-12);

        // Sum of the fan triangle areas equals the stored area.
        let (_, total) = fan_areas(&task.path);
        assert_approx_eq!(total, task.area, 1e-12);

        // Frame is orthonormal and tangent to the surface.
        assert_approx_eq!(task.tan1.norm(), 1.0, 1e-12);
        assert_approx_eq!(task.tan2.norm(), 1.0, 1e-12);
        assert_approx_eq!(task.tan1.dot(&task.tan2), 0.0, 1e-12);
        assert_approx_eq!(task.tan1.dot(&surfs.tris[0].norm), 0.0, 1e-12);
    }

    #[test]
    fn test_split_cell_task_gets_sub_cell() {
        let domain = Domain {
            kind: DomainKind::Planar2d,
        };
        let mut grid = Grid::default();
        let mut cell = unit_cell();
        cell.surfs = vec![0];
        cell.split = Some(0);
        grid.cells.push(cell);
        grid.cells.push(unit_cell());
        grid.splits.push(SplitInfo {
            sub_of_surf: vec![0],
            sub_cells: vec![1],
        });

        let mut surfs = Surfaces::default();
        surfs.lines.push(Line::new(
            Vector3::new(0.2, 0.5, 0.0),
            Vector3::new(0.8, 0.5, 0.0),
        ));

        let mut engine = engine(default_options());
        let store = build_tasks(domain, &grid, &mut surfs, &mut engine);
        assert_eq!(store.get(0).cell, 0);
        assert_eq!(store.get(0).sub_cell, 1);
    }

    mod chemistry_binding {
        use super::*;
        use crate::chemistry::{EmissionChannel, SurfaceChemistry};

        pub struct InertNet;
        impl SurfaceChemistry for InertNet {
            fn n_reactions(&self) -> usize {
                1
            }
            fn species_index(&self, _name: &str) -> Option<usize> {
                Some(0)
            }
            fn set_state(&mut self, _face: &FaceState, _step: u64, _dt: f64) {}
            fn save_state(&self, _face: &mut FaceState) {}
            fn execute_event(
                &mut self,
                _channel: &EmissionChannel,
                _macro_weight: f64,
                _temp_thermal: f64,
            ) -> bool {
                true
            }
            fn finalize_step(&mut self, _dt: f64) {}
        }

        fn reactive_setup() -> (ChemistryTable, SurfaceEmission) {
            let mut chemistry = ChemistryTable::default();
            chemistry.add("wall", Box::new(InertNet));
            let mut options = default_options();
            options.chemistry = Some("wall".to_string());
            options.per_species = false;
            let engine = SurfaceEmission::new(
                options,
                &test_mixtures(),
                &Surfaces::default(),
                &chemistry,
            );
            (chemistry, engine)
        }

        #[test]
        fn test_overlap_area_recorded_on_face() {
            let (_, mut engine) = reactive_setup();

            let domain = Domain {
                kind: DomainKind::Planar2d,
            };
            let mut grid = Grid::default();
            let mut cell = unit_cell();
            cell.surfs = vec![0];
            grid.cells.push(cell);

            let mut surfs = Surfaces::default();
            let mut line = Line::new(Vector3::new(0.25, 0.5, 0.0), Vector3::new(0.75, 0.5, 0.0));
            line.state = Some(FaceState::new(0, 1));
            surfs.lines.push(line);

            let store = build_tasks(domain, &grid, &mut surfs, &mut engine);
            assert_eq!(store.len(), 1);
            assert_approx_eq!(surfs.lines[0].state.as_ref().unwrap().area, 0.5, 1e-12);
        }

        #[test]
        #[should_panic(expected = "no chemistry state")]
        fn test_missing_face_state_is_fatal() {
            let (_, mut engine) = reactive_setup();

            let domain = Domain {
                kind: DomainKind::Planar2d,
            };
            let mut grid = Grid::default();
            let mut cell = unit_cell();
            cell.surfs = vec![0];
            grid.cells.push(cell);

            let mut surfs = Surfaces::default();
            surfs.lines.push(Line::new(
                Vector3::new(0.25, 0.5, 0.0),
                Vector3::new(0.75, 0.5, 0.0),
            ));

            build_tasks(domain, &grid, &mut surfs, &mut engine);
        }

        #[test]
        #[should_panic(expected = "differs from the engine")]
        fn test_mismatched_network_is_fatal() {
            let (_, mut engine) = reactive_setup();

            let domain = Domain {
                kind: DomainKind::Planar2d,
            };
            let mut grid = Grid::default();
            let mut cell = unit_cell();
            cell.surfs = vec![0];
            grid.cells.push(cell);

            let mut surfs = Surfaces::default();
            let mut line = Line::new(Vector3::new(0.25, 0.5, 0.0), Vector3::new(0.75, 0.5, 0.0));
            // Bound to a different network than the engine's.
            line.state = Some(FaceState::new(3, 1));
            surfs.lines.push(line);

            build_tasks(domain, &grid, &mut surfs, &mut engine);
        }
    }
}
