use std::path::{Component, Path, PathBuf};

/// Answers whether an asset's file is present on its backing storage.
pub trait AssetStore {
    fn exists(&self, relative_path: &str) -> bool;
}

/// A directory on the local file system that asset paths are relative to.
#[derive(Debug, Clone)]
pub struct AssetRoot {
    root: PathBuf,
}

impl AssetRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        AssetRoot { root: root.into() }
    }

    /// Joins a stored relative path onto the root without letting it escape.
    pub fn resolve(&self, relative_path: &str) -> PathBuf {
        self.root.join(sanitize_relative_path(relative_path))
    }
}

impl AssetStore for AssetRoot {
    fn exists(&self, relative_path: &str) -> bool {
        self.resolve(relative_path).is_file()
    }
}

/// Drops root and prefix components; `..` pops instead of climbing.
pub fn sanitize_relative_path(p: &str) -> PathBuf {
    let mut result = PathBuf::new();
    for comp in Path::new(p).components() {
        match comp {
            Component::Normal(s) => result.push(s),
            Component::ParentDir => {
                result.pop();
            }
            _ => {}
        }
    }
    result
}
