mod loader;
mod types;

pub use loader::{CONFIG_FILE, load, load_file};
pub use types::{Config, Isolation, LanguageOverride};
