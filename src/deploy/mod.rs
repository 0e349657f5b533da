// ABOUTME: The deploy sequencer and the report it produces.
// ABOUTME: Exports the fixed pipeline from source update to health diagnosis.

mod report;
mod sequencer;
mod step;

pub use report::{
    ContainerFinding, ContainerReport, HealthReport, PortReport, PortStatus, RunReport,
};
pub use sequencer::Sequencer;
pub use step::Step;
