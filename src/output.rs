//! Writes per-step emission results to file.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use specs::{ReadExpect, System};

use crate::chemistry::StepEvents;
use crate::emission::task::TaskStore;
use crate::integrator::{Step, Timestep};
use crate::particle::CreationTally;

/// One row of the emission results log.
#[derive(Serialize)]
struct EmissionRecord {
    step: u64,
    time: f64,
    tasks: usize,
    created: u64,
    total: u64,
    reaction_events: u64,
}

/// A system that appends a CSV row of emission results at a defined interval.
pub struct EmissionLogSystem<W: Write + Send> {
    /// Number of steps between rows.
    interval: u64,
    writer: csv::Writer<W>,
}

impl EmissionLogSystem<File> {
    /// Creates a log writing to `file_name` every `interval` steps. Failure
    /// to create the file is fatal.
    pub fn to_file(file_name: &str, interval: u64) -> Self {
        let path = Path::new(file_name);
        let writer = csv::Writer::from_path(path)
            .unwrap_or_else(|e| panic!("Couldn't open {}: {}", path.display(), e));
        EmissionLogSystem { interval, writer }
    }
}

impl<W: Write + Send> EmissionLogSystem<W> {
    /// Creates a log writing to an arbitrary stream.
    pub fn from_writer(stream: W, interval: u64) -> Self {
        EmissionLogSystem {
            interval,
            writer: csv::Writer::from_writer(stream),
        }
    }
}

impl<'a, W: Write + Send> System<'a> for EmissionLogSystem<W> {
    type SystemData = (
        ReadExpect<'a, Step>,
        ReadExpect<'a, Timestep>,
        ReadExpect<'a, TaskStore>,
        ReadExpect<'a, CreationTally>,
        ReadExpect<'a, StepEvents>,
    );

    fn run(&mut self, (step, timestep, store, tally, events): Self::SystemData) {
        if step.n % self.interval != 0 {
            return;
        }
        self.writer
            .serialize(EmissionRecord {
                step: step.n,
                time: step.n as f64 * timestep.delta,
                tasks: store.len(),
                created: tally.nsingle,
                total: tally.ntotal,
                reaction_events: events.count,
            })
            .expect("Could not write emission record.");
        self.writer.flush().expect("Could not flush emission log.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use specs::{RunNow, World, WorldExt};

    #[test]
    fn test_log_row_contents() {
        let mut world = World::new();
        crate::ecs::register_resources(&mut world);
        world.insert(Step { n: 10 });
        world.insert(Timestep { delta: 1.0e-3 });
        world.insert(CreationTally {
            nsingle: 7,
            ntotal: 70,
        });
        world.insert(StepEvents { count: 3 });

        let mut system = EmissionLogSystem::from_writer(Vec::new(), 5);
        system.run_now(&world);

        let bytes = system.writer.into_inner().expect("Could not finish log.");
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "step,time,tasks,created,total,reaction_events"
        );
        assert_eq!(lines.next().unwrap(), "10,0.01,0,7,70,3");
    }

    #[test]
    fn test_log_respects_interval() {
        let mut world = World::new();
        crate::ecs::register_resources(&mut world);
        world.insert(Step { n: 3 });

        let mut system = EmissionLogSystem::from_writer(Vec::new(), 5);
        system.run_now(&world);
        let bytes = system.writer.into_inner().expect("Could not finish log.");
        assert!(bytes.is_empty());
    }
}
