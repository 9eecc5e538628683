// Static language table: which files belong to which tools.

mod catalog;
mod types;

pub use catalog::{DEFAULT_EXCLUDES, language_names, resolve};
pub use types::{BASELINE_TOKEN, Check, FILES_TOKEN, LanguageProfile, Phase, Severity};
