pub mod baseline;
pub mod commands;
pub mod dispatcher;
pub mod orchestrator;
pub mod report;
mod types;

pub use baseline::BaselineState;
pub use commands::Environment;
pub use dispatcher::{Dispatcher, SandboxDispatcher};
pub use orchestrator::{Aggregator, run_check, run_pipeline};
pub use types::{
    CheckResult, Failure, Outcome, Overall, PipelineInput, RunReport, Summary, Task,
};
