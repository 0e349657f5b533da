// ABOUTME: Names of the pipeline steps whose failure aborts a run.
// ABOUTME: Carried in errors so the user sees which stage failed.

use std::fmt;

/// Fatal steps of the deployment pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    SourceUpdate,
    CacheMaintenance,
    ConfigValidation,
    Build,
    Start,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::SourceUpdate => "source update",
            Step::CacheMaintenance => "cache maintenance",
            Step::ConfigValidation => "compose validation",
            Step::Build => "image build",
            Step::Start => "container start",
        };
        f.write_str(name)
    }
}
