//! The emission task store.
//!
//! One task is one emission opportunity: a (grid cell, surface element) pair
//! together with the clipped overlap geometry and a snapshot of the gas state
//! the particles are drawn from. The store is a relocatable-by-value array of
//! variable-length records. Mesh adaptation may redistribute cells across
//! ranks, so tasks can be packed into a flat byte buffer, shipped, and
//! unpacked on the receiving rank; the sub-cell id is never transmitted
//! because split-cell identity only exists in the local mesh state.

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use nalgebra::Vector3;

use crate::grid::{CellId, Grid};
use crate::surface::SurfId;

type Endianness = LittleEndian;

/// Number of task slots added per growth increment.
pub const TASK_BLOCK: usize = 256;

/// Alignment boundary of the packed header.
const ALIGN: usize = 8;

/// Bytes of the fixed packed header: three u64 ids plus fourteen f64 fields.
const HEADER_BYTES: usize = 3 * 8 + 14 * 8;

fn align_up(n: usize) -> usize {
    (n + ALIGN - 1) / ALIGN * ALIGN
}

/// One emission opportunity for a (cell, surface) pair.
#[derive(Clone, Debug)]
pub struct EmissionTask {
    /// Owning grid cell.
    pub cell: CellId,
    /// Sub-cell particles are assigned to; equals `cell` unless split.
    pub sub_cell: CellId,
    /// Emitting surface element.
    pub surf: SurfId,
    /// Clipped overlap path: 2 points in 2-D, >= 3 in 3-D. Exclusively owned.
    pub path: Vec<Vector3<f64>>,
    /// Cumulative triangle-fan area fractions, length `path.len() - 2`;
    /// non-decreasing with final entry 1.0. Empty for 2-D tasks.
    pub frac_area: Vec<f64>,
    /// Overlap area (a length in planar 2-D, a truncated-cone surface in
    /// axisymmetric 2-D).
    pub area: f64,
    /// First tangent vector of the surface frame.
    pub tan1: Vector3<f64>,
    /// Second tangent vector of the surface frame.
    pub tan2: Vector3<f64>,
    /// Number density snapshot, 1/m^3.
    pub nrho: f64,
    /// Translational temperature snapshot, K.
    pub temp_thermal: f64,
    /// Rotational temperature snapshot, K.
    pub temp_rot: f64,
    /// Vibrational temperature snapshot, K.
    pub temp_vib: f64,
    /// Stream velocity snapshot, m/s.
    pub vstream: Vector3<f64>,
}

impl Default for EmissionTask {
    fn default() -> Self {
        EmissionTask {
            cell: 0,
            sub_cell: 0,
            surf: 0,
            path: Vec::new(),
            frac_area: Vec::new(),
            area: 0.0,
            tan1: Vector3::zeros(),
            tan2: Vector3::zeros(),
            nrho: 0.0,
            temp_thermal: 0.0,
            temp_rot: 0.0,
            temp_vib: 0.0,
            vstream: Vector3::zeros(),
        }
    }
}

/// The resizable task store.
///
/// Storage grows in [TASK_BLOCK] increments and is never shrunk; only the
/// first `len()` slots are live. Slots beyond the live range hold zeroed
/// fields and empty geometry buffers so diagnostics stay deterministic.
#[derive(Default)]
pub struct TaskStore {
    tasks: Vec<EmissionTask>,
    ntask: usize,
}

impl TaskStore {
    pub fn new() -> TaskStore {
        TaskStore::default()
    }

    /// Number of live tasks.
    pub fn len(&self) -> usize {
        self.ntask
    }

    pub fn is_empty(&self) -> bool {
        self.ntask == 0
    }

    /// Number of allocated slots.
    pub fn capacity(&self) -> usize {
        self.tasks.len()
    }

    /// Drops all live tasks, keeping allocated slots for reuse.
    pub fn clear(&mut self) {
        self.ntask = 0;
    }

    /// Extends backing storage by one fixed increment of zeroed slots.
    pub fn grow(&mut self) {
        self.tasks
            .resize_with(self.tasks.len() + TASK_BLOCK, EmissionTask::default);
    }

    /// Appends a task, replacing whatever buffers the receiving slot held.
    pub fn append(&mut self, task: EmissionTask) {
        if self.ntask == self.tasks.len() {
            self.grow();
        }
        self.tasks[self.ntask] = task;
        self.ntask += 1;
    }

    pub fn get(&self, itask: usize) -> &EmissionTask {
        assert!(itask < self.ntask, "Task index {} beyond live range", itask);
        &self.tasks[itask]
    }

    pub fn get_mut(&mut self, itask: usize) -> &mut EmissionTask {
        assert!(itask < self.ntask, "Task index {} beyond live range", itask);
        &mut self.tasks[itask]
    }

    /// Iterates over the live tasks.
    pub fn iter(&self) -> impl Iterator<Item = &EmissionTask> {
        self.tasks[..self.ntask].iter()
    }

    /// Relocates `n` contiguous tasks from `oldfirst` to `first`, reassigning
    /// their owning cell. Identical ranges only rewrite the cell id; disjoint
    /// ranges deep-copy each task so the copies own fresh geometry buffers.
    /// The ranges must be identical or disjoint. Extends the live range by
    /// `n`.
    pub fn copy(&mut self, icell: CellId, n: usize, first: usize, oldfirst: usize) {
        while first + n > self.tasks.len() {
            self.grow();
        }

        if first == oldfirst {
            for task in &mut self.tasks[first..first + n] {
                task.cell = icell;
            }
        } else {
            for i in 0..n {
                let mut task = self.tasks[oldfirst + i].clone();
                task.cell = icell;
                self.tasks[first + i] = task;
            }
        }

        self.ntask += n;
    }

    /// Bytes one task occupies in packed form.
    pub fn packed_size(&self, itask: usize) -> usize {
        let npoint = self.tasks[itask].path.len();
        align_up(HEADER_BYTES) + npoint * 3 * 8 + npoint.saturating_sub(2) * 8
    }

    /// Serialises one task into `buf` and returns the bytes written. The
    /// count equals [TaskStore::packed_size] for the same task.
    pub fn pack(&self, itask: usize, buf: &mut Vec<u8>) -> usize {
        let task = &self.tasks[itask];
        let start = buf.len();

        buf.write_u64::<Endianness>(task.cell as u64)
            .expect("Could not write to task buffer.");
        buf.write_u64::<Endianness>(task.surf as u64)
            .expect("Could not write to task buffer.");
        buf.write_u64::<Endianness>(task.path.len() as u64)
            .expect("Could not write to task buffer.");
        let scalars = [
            task.area,
            task.tan1[0],
            task.tan1[1],
            task.tan1[2],
            task.tan2[0],
            task.tan2[1],
            task.tan2[2],
            task.nrho,
            task.temp_thermal,
            task.temp_rot,
            task.temp_vib,
            task.vstream[0],
            task.vstream[1],
            task.vstream[2],
        ];
        for value in &scalars {
            buf.write_f64::<Endianness>(*value)
                .expect("Could not write to task buffer.");
        }
        buf.resize(start + align_up(HEADER_BYTES), 0);

        for point in &task.path {
            for k in 0..3 {
                buf.write_f64::<Endianness>(point[k])
                    .expect("Could not write to task buffer.");
            }
        }
        for frac in &task.frac_area {
            buf.write_f64::<Endianness>(*frac)
                .expect("Could not write to task buffer.");
        }

        buf.len() - start
    }

    /// Appends a task deserialised from `buf`, which must start at a record
    /// written by [TaskStore::pack]. The task is reassigned to `icell` and
    /// its sub-cell is re-resolved from the local grid by surface id.
    /// Returns the bytes consumed.
    pub fn unpack(&mut self, buf: &[u8], icell: CellId, grid: &Grid) -> usize {
        let mut cursor = Cursor::new(buf);

        let _cell = cursor
            .read_u64::<Endianness>()
            .expect("Could not read from task buffer.");
        let surf = cursor
            .read_u64::<Endianness>()
            .expect("Could not read from task buffer.") as SurfId;
        let npoint = cursor
            .read_u64::<Endianness>()
            .expect("Could not read from task buffer.") as usize;
        let mut scalars = [0.0f64; 14];
        for value in scalars.iter_mut() {
            *value = cursor
                .read_f64::<Endianness>()
                .expect("Could not read from task buffer.");
        }
        cursor.set_position(align_up(HEADER_BYTES) as u64);

        let mut path = Vec::with_capacity(npoint);
        for _ in 0..npoint {
            let mut point = Vector3::zeros();
            for k in 0..3 {
                point[k] = cursor
                    .read_f64::<Endianness>()
                    .expect("Could not read from task buffer.");
            }
            path.push(point);
        }
        let mut frac_area = Vec::with_capacity(npoint.saturating_sub(2));
        for _ in 0..npoint.saturating_sub(2) {
            frac_area.push(
                cursor
                    .read_f64::<Endianness>()
                    .expect("Could not read from task buffer."),
            );
        }

        self.append(EmissionTask {
            cell: icell,
            sub_cell: grid.sub_cell_for_surf(icell, surf),
            surf,
            path,
            frac_area,
            area: scalars[0],
            tan1: Vector3::new(scalars[1], scalars[2], scalars[3]),
            tan2: Vector3::new(scalars[4], scalars[5], scalars[6]),
            nrho: scalars[7],
            temp_thermal: scalars[8],
            temp_rot: scalars[9],
            temp_vib: scalars[10],
            vstream: Vector3::new(scalars[11], scalars[12], scalars[13]),
        });

        cursor.position() as usize
    }

    /// Re-resolves every task's sub-cell after grid compression or
    /// adaptation renumbered cells and rebuilt the split tables.
    pub fn fixup_sub_cells(&mut self, grid: &Grid) {
        for task in self.tasks[..self.ntask].iter_mut() {
            task.sub_cell = grid.sub_cell_for_surf(task.cell, task.surf);
        }
    }
}
