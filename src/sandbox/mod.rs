// Process execution: container engine probe, spawning, streaming output.

pub mod engine;
pub mod run;
pub mod types;

pub use engine::{ensure_available, user_args};
pub use run::{run, spawn};
pub use types::{OutputLine, ToolCommand, ToolResult};
