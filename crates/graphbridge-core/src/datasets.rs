//! Test Dataset Manifest
//!
//! Keeps the CMake manifest that registers RDG test datasets in sync with
//! the dataset directories present on disk. Every top-level directory under
//! the dataset root gets one `rdg_dataset(<VAR> "<dir>")` line.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Banner written at the top of the generated manifest
pub const DEFAULT_BANNER: &str = "### Generated by scripts/check_test_datasets.py --fix";

/// Dataset root, relative to the repository root
pub const DEFAULT_DATASET_ROOT: &str = "external/test-datasets/rdg_datasets";

/// Manifest path, relative to the repository root
pub const DEFAULT_MANIFEST: &str = "cmake/Modules/TestDatasetsRDGs.cmake";

/// Errors from dataset discovery and manifest checking
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Dataset root does not exist: {}", .0.display())]
    DatasetRootNotFound(PathBuf),

    #[error("Error walking dataset root: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Failed to read manifest {}: {source}", .path.display())]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write manifest {}: {source}", .path.display())]
    ManifestWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Dataset directory has no valid UTF-8 name: {}", .0.display())]
    InvalidName(PathBuf),

    #[error("No repository root (a directory containing .git) above {}", .0.display())]
    RepoRootNotFound(PathBuf),

    #[error(
        "Manifest {} is out of date (missing: {missing:?}, unexpected: {unexpected:?}); rerun with --fix",
        .path.display()
    )]
    OutOfDate {
        path: PathBuf,
        /// Expected lines absent from the manifest
        missing: Vec<String>,
        /// Manifest lines that should not be there
        unexpected: Vec<String>,
    },
}

pub type Result<T> = std::result::Result<T, DatasetError>;

// ============================================================================
// Dataset Directories
// ============================================================================

/// A dataset directory under the dataset root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetDir {
    path: PathBuf,
    name: String,
}

impl DatasetDir {
    /// Fails if the final path component is missing or not valid UTF-8,
    /// since it is written verbatim into the manifest.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let name = match path.file_name().map(|n| n.to_str()) {
            Some(Some(name)) => name.to_string(),
            _ => return Err(DatasetError::InvalidName(path)),
        };
        Ok(Self { path, name })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Final path component
    pub fn dir_name(&self) -> &str {
        &self.name
    }

    /// CMake variable name: `RDG_` plus the upper-cased name with `=` replaced by `_`
    pub fn var_name(&self) -> String {
        format!("RDG_{}", self.dir_name().replace('=', "_").to_uppercase())
    }

    /// Manifest line registering this dataset
    pub fn definition(&self) -> String {
        format!("rdg_dataset({} \"{}\")", self.var_name(), self.dir_name())
    }
}

/// List the immediate subdirectories of `root` in filesystem order.
///
/// Symlinks are not followed, so a link to a directory is not a dataset.
pub fn discover_datasets(root: &Path) -> Result<Vec<DatasetDir>> {
    if !root.is_dir() {
        return Err(DatasetError::DatasetRootNotFound(root.to_path_buf()));
    }

    let mut datasets = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
    {
        let entry = entry?;
        if entry.file_type().is_dir() {
            datasets.push(DatasetDir::new(entry.into_path())?);
        }
    }

    debug!("Found {} datasets under {}", datasets.len(), root.display());
    Ok(datasets)
}

/// Render the manifest for `datasets`, in the given order.
pub fn render_manifest(datasets: &[DatasetDir]) -> String {
    let mut out = String::new();
    out.push_str(DEFAULT_BANNER);
    out.push_str("\n\n");
    for dataset in datasets {
        out.push_str(&dataset.definition());
        out.push('\n');
    }
    out
}

/// First ancestor of `start` (inclusive) that contains a `.git` entry
pub fn find_repo_root(start: &Path) -> Result<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
        .ok_or_else(|| DatasetError::RepoRootNotFound(start.to_path_buf()))
}

// ============================================================================
// Manifest Checker
// ============================================================================

/// Compares or regenerates the manifest for one repository
#[derive(Debug, Clone)]
pub struct ManifestChecker {
    dataset_root: PathBuf,
    manifest_path: PathBuf,
}

impl ManifestChecker {
    /// Checker using the default layout under `repo_root`
    pub fn new(repo_root: &Path) -> Self {
        Self {
            dataset_root: repo_root.join(DEFAULT_DATASET_ROOT),
            manifest_path: repo_root.join(DEFAULT_MANIFEST),
        }
    }

    /// Checker with explicit paths. Relative paths are resolved against `repo_root`.
    pub fn with_paths(repo_root: &Path, dataset_root: &Path, manifest_path: &Path) -> Self {
        Self {
            dataset_root: repo_root.join(dataset_root),
            manifest_path: repo_root.join(manifest_path),
        }
    }

    pub fn dataset_root(&self) -> &Path {
        &self.dataset_root
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// The manifest content the dataset root currently calls for
    pub fn expected(&self) -> Result<String> {
        Ok(render_manifest(&discover_datasets(&self.dataset_root)?))
    }

    /// Succeed only if the manifest on disk matches [`Self::expected`] byte for byte
    pub fn check(&self) -> Result<()> {
        let expected = self.expected()?;
        let actual = std::fs::read_to_string(&self.manifest_path).map_err(|source| {
            DatasetError::ManifestRead {
                path: self.manifest_path.clone(),
                source,
            }
        })?;

        if actual == expected {
            info!("{} is up to date", self.manifest_path.display());
            return Ok(());
        }

        let (missing, unexpected) = line_diff(&expected, &actual);
        Err(DatasetError::OutOfDate {
            path: self.manifest_path.clone(),
            missing,
            unexpected,
        })
    }

    /// Overwrite the manifest with [`Self::expected`]; returns whether the content changed
    pub fn fix(&self) -> Result<bool> {
        let expected = self.expected()?;
        let previous = std::fs::read_to_string(&self.manifest_path).ok();

        let write_err = |source: std::io::Error| DatasetError::ManifestWrite {
            path: self.manifest_path.clone(),
            source,
        };
        if let Some(parent) = self.manifest_path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        std::fs::write(&self.manifest_path, &expected).map_err(write_err)?;

        let changed = previous.as_deref() != Some(expected.as_str());
        debug!(
            "Wrote {} ({})",
            self.manifest_path.display(),
            if changed { "updated" } else { "unchanged" }
        );
        Ok(changed)
    }
}

/// Lines of `expected` absent from `actual`, and lines of `actual` absent from `expected`
fn line_diff(expected: &str, actual: &str) -> (Vec<String>, Vec<String>) {
    let expected_lines: HashSet<&str> = expected.lines().collect();
    let actual_lines: HashSet<&str> = actual.lines().collect();

    let missing = expected
        .lines()
        .filter(|l| !actual_lines.contains(l))
        .map(str::to_string)
        .collect();
    let unexpected = actual
        .lines()
        .filter(|l| !expected_lines.contains(l))
        .map(str::to_string)
        .collect();
    (missing, unexpected)
}
