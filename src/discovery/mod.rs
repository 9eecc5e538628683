mod types;
mod walk;

pub use types::FileSet;
pub use walk::{discover, script_override};
