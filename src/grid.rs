//! The simulation grid consumed by the emission engine.
//!
//! The adaptive-mesh machinery itself (refinement, coarsening, migration)
//! lives outside this crate; what the emission engine needs is the cell
//! geometry, each cell's surface list, and the split-cell bookkeeping that
//! maps a surface back to the sub-volume it borders when a cell is cut into
//! several disjoint pieces.

use crate::surface::SurfId;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Index of a grid cell (or sub-cell) in the local cell list.
pub type CellId = usize;

/// Dimensionality of the simulation domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DomainKind {
    /// Planar 2-D: surface elements are line segments, overlap "area" is a length.
    Planar2d,
    /// Axisymmetric 2-D: y is the radial coordinate, overlap area is the
    /// surface of the truncated cone swept by the clipped segment.
    Axisymmetric2d,
    /// Full 3-D: surface elements are triangles.
    ThreeD,
}

/// The simulation domain.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Domain {
    pub kind: DomainKind,
}

impl Default for Domain {
    fn default() -> Self {
        Domain {
            kind: DomainKind::ThreeD,
        }
    }
}

impl Domain {
    pub fn dimension(&self) -> usize {
        match self.kind {
            DomainKind::Planar2d | DomainKind::Axisymmetric2d => 2,
            DomainKind::ThreeD => 3,
        }
    }

    pub fn axisymmetric(&self) -> bool {
        self.kind == DomainKind::Axisymmetric2d
    }
}

/// One grid cell.
pub struct Cell {
    /// Lower corner of the cell bounding box.
    pub lo: Vector3<f64>,
    /// Upper corner of the cell bounding box.
    pub hi: Vector3<f64>,
    /// Surface elements intersecting this cell.
    pub surfs: Vec<SurfId>,
    /// Statistical weight of particles in this cell.
    pub weight: f64,
    /// Index into [Grid::splits] when the cell is cut into sub-volumes.
    pub split: Option<usize>,
}

impl Cell {
    pub fn new(lo: Vector3<f64>, hi: Vector3<f64>) -> Cell {
        Cell {
            lo,
            hi,
            surfs: Vec::new(),
            weight: 1.0,
            split: None,
        }
    }
}

/// Sub-volume bookkeeping for a split cell.
pub struct SplitInfo {
    /// For each slot in the owning cell's surface list, the sub-volume that
    /// surface borders.
    pub sub_of_surf: Vec<usize>,
    /// Cell id used for particle bookkeeping in each sub-volume.
    pub sub_cells: Vec<CellId>,
}

/// The local grid: cells plus split-cell tables.
#[derive(Default)]
pub struct Grid {
    pub cells: Vec<Cell>,
    pub splits: Vec<SplitInfo>,
}

impl Grid {
    /// Sub-cell a surface resolves to, given its slot in the cell's surface
    /// list. Unsplit cells resolve to themselves.
    pub fn sub_cell_for_slot(&self, icell: CellId, slot: usize) -> CellId {
        match self.cells[icell].split {
            None => icell,
            Some(isplit) => {
                let split = &self.splits[isplit];
                split.sub_cells[split.sub_of_surf[slot]]
            }
        }
    }

    /// Sub-cell a surface resolves to, located by scanning the cell's surface
    /// list. Sub-cell identity is only meaningful in the local mesh state, so
    /// this is how tasks arriving from another rank are re-resolved.
    pub fn sub_cell_for_surf(&self, icell: CellId, isurf: SurfId) -> CellId {
        let slot = self.cells[icell]
            .surfs
            .iter()
            .position(|&s| s == isurf)
            .unwrap_or_else(|| panic!("Surface {} is not listed in cell {}", isurf, icell));
        self.sub_cell_for_slot(icell, slot)
    }
}
