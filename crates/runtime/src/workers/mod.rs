//! Worker tasks that back the runtime orchestration.

mod simulation;

pub(crate) use simulation::{Command, SimulationWorker, WorkerConfig};
