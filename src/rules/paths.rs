//! Path Resolution
//!
//! Makes paths declared relative to a workflow absolute by prepending the
//! caller's root directory and, when the workflow declares one, its working
//! directory:
//!
//! - absolute paths are left unchanged
//! - `root/path` when the workflow has no working directory
//! - `root/workdir/path` otherwise
//!
//! e.g. `y_KCs_1/edgeR` with root `/Projects/SCS` and workdir
//! `results/20201118` becomes `/Projects/SCS/results/20201118/y_KCs_1/edgeR`.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::workflow::PathValue;

/// Resolves a single path against `root` and the workflow working directory.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use ruleargs::rules::paths::resolve;
///
/// let root = Path::new("/proj");
/// assert_eq!(resolve(Path::new("/abs/x"), root, None), Path::new("/abs/x"));
/// assert_eq!(resolve(Path::new("a/x"), root, None), Path::new("/proj/a/x"));
/// assert_eq!(
///     resolve(Path::new("a/x"), root, Some(Path::new("results"))),
///     Path::new("/proj/results/a/x")
/// );
/// ```
pub fn resolve(path: &Path, root: &Path, workdir: Option<&Path>) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }

    match workdir {
        None => root.join(path),
        Some(workdir) => root.join(workdir).join(path),
    }
}

/// Containers of paths that can be resolved element-wise.
///
/// Resolution keeps the container's shape: sequences keep their length and
/// order, mappings keep every key.
pub trait ResolvePaths {
    fn resolve_paths(&self, root: &Path, workdir: Option<&Path>) -> Self;
}

impl ResolvePaths for PathBuf {
    fn resolve_paths(&self, root: &Path, workdir: Option<&Path>) -> Self {
        resolve(self, root, workdir)
    }
}

impl ResolvePaths for Vec<PathBuf> {
    fn resolve_paths(&self, root: &Path, workdir: Option<&Path>) -> Self {
        self.iter().map(|path| resolve(path, root, workdir)).collect()
    }
}

impl ResolvePaths for PathValue {
    fn resolve_paths(&self, root: &Path, workdir: Option<&Path>) -> Self {
        match self {
            Self::Single(path) => Self::Single(path.resolve_paths(root, workdir)),
            Self::Many(paths) => Self::Many(paths.resolve_paths(root, workdir)),
        }
    }
}

impl<V: ResolvePaths> ResolvePaths for IndexMap<String, V> {
    fn resolve_paths(&self, root: &Path, workdir: Option<&Path>) -> Self {
        self.iter()
            .map(|(name, value)| (name.clone(), value.resolve_paths(root, workdir)))
            .collect()
    }
}

/// Resolves every path in a sequence, path value or named mapping.
pub fn resolve_many<T: ResolvePaths>(paths: &T, root: &Path, workdir: Option<&Path>) -> T {
    paths.resolve_paths(root, workdir)
}

/// Anchors `root` at `base` and drops `.` components, so the default root
/// `.` becomes `base` itself.
pub fn anchor_root(base: &Path, root: &Path) -> PathBuf {
    base.join(root).components().collect()
}
