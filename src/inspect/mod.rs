// ABOUTME: Parsers for the output of runtime and host inspection tools.
// ABOUTME: Turns docker inspect JSON and socket listings into typed findings.

mod container;
mod ports;

pub use container::{ContainerState, HealthState, InspectError, parse_inspect};
pub use ports::listening_ports;
