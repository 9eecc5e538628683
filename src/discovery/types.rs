use std::path::{Path, PathBuf};

/// Files matched for one language profile, relative to the scan root and
/// sorted. Empty means "no files of this type", which is not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    files: Vec<PathBuf>,
}

impl FileSet {
    pub fn new(mut files: Vec<PathBuf>) -> Self {
        files.sort();
        files.dedup();
        Self { files }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(PathBuf::as_path)
    }

    /// Paths as command-line arguments, always `/`-separated so they
    /// resolve identically inside a Linux container.
    pub fn to_args(&self) -> Vec<String> {
        self.files
            .iter()
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .collect()
    }
}
