//! Asset copying for CSS, JavaScript, and images.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::builder::BuildError;

/// Name of the directory under the output root that holds all assets.
pub const ASSETS_DIR: &str = "assets";

/// The asset groups relocated under `assets/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Css,
    Js,
    Images,
}

impl AssetKind {
    /// All asset groups, in the order they are copied.
    pub const ALL: [AssetKind; 3] = [AssetKind::Css, AssetKind::Js, AssetKind::Images];

    /// Directory name, shared by the source tree and `assets/`.
    pub fn dir_name(self) -> &'static str {
        match self {
            AssetKind::Css => "css",
            AssetKind::Js => "js",
            AssetKind::Images => "images",
        }
    }

    /// Destination directory for this group under `output_dir`.
    pub fn dest_dir(self, output_dir: &Path) -> PathBuf {
        output_dir.join(ASSETS_DIR).join(self.dir_name())
    }
}

/// A single file copied into the output tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopiedFile {
    pub source: PathBuf,
    pub dest: PathBuf,
}

/// Copy one file, creating the destination's parent directories.
///
/// The destination keeps the source's modification time.
pub fn copy_file(source: &Path, dest: &Path) -> Result<CopiedFile, BuildError> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| BuildError::WriteError(e.to_string()))?;
    }

    let copy_error = |e: std::io::Error| BuildError::CopyError {
        from: source.display().to_string(),
        to: dest.display().to_string(),
        message: e.to_string(),
    };

    fs::copy(source, dest).map_err(copy_error)?;

    let modified = fs::metadata(source)
        .and_then(|m| m.modified())
        .map_err(copy_error)?;
    fs::OpenOptions::new()
        .write(true)
        .open(dest)
        .and_then(|f| f.set_modified(modified))
        .map_err(copy_error)?;

    Ok(CopiedFile {
        source: source.to_path_buf(),
        dest: dest.to_path_buf(),
    })
}

/// Copy every file under `src_dir` into `dest_dir` by file name only.
///
/// Subdirectories are walked but not recreated, so `deep/nested.css` lands
/// at `dest_dir/nested.css`. Dot-files and dot-directories are skipped.
/// A missing `src_dir` copies nothing.
pub fn copy_flattened(src_dir: &Path, dest_dir: &Path) -> Result<Vec<CopiedFile>, BuildError> {
    let mut copied = Vec::new();

    for path in walk_files(src_dir, None, true)? {
        let Some(name) = path.file_name() else {
            continue;
        };
        copied.push(copy_file(&path, &dest_dir.join(name))?);
    }

    Ok(copied)
}

/// Copy every file under `src_dir` ending in `.{extension}`, keeping its
/// path relative to `src_dir`. Other files are ignored.
pub fn copy_tree(
    src_dir: &Path,
    dest_dir: &Path,
    extension: &str,
) -> Result<Vec<CopiedFile>, BuildError> {
    let suffix = format!(".{}", extension);
    let mut copied = Vec::new();

    for path in walk_files(src_dir, None, false)? {
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(&suffix));
        if !matches {
            continue;
        }

        let relative = path.strip_prefix(src_dir).unwrap_or(&path);
        copied.push(copy_file(&path, &dest_dir.join(relative))?);
    }

    Ok(copied)
}

/// Copy the files directly inside `src_dir`; subdirectories and dot-files
/// are skipped.
pub fn copy_shallow(src_dir: &Path, dest_dir: &Path) -> Result<Vec<CopiedFile>, BuildError> {
    let mut copied = Vec::new();

    for path in walk_files(src_dir, Some(1), true)? {
        let Some(name) = path.file_name() else {
            continue;
        };
        copied.push(copy_file(&path, &dest_dir.join(name))?);
    }

    Ok(copied)
}

/// Files under `dir`, sorted by name within each directory.
///
/// Symlinks to files are included; symlinked directories are not entered.
fn walk_files(
    dir: &Path,
    max_depth: Option<usize>,
    skip_hidden: bool,
) -> Result<Vec<PathBuf>, BuildError> {
    if !dir.is_dir() {
        tracing::debug!("Skipping missing directory {}", dir.display());
        return Ok(Vec::new());
    }

    let mut walker = WalkDir::new(dir).min_depth(1).sort_by_file_name();
    if let Some(depth) = max_depth {
        walker = walker.max_depth(depth);
    }

    let mut files = Vec::new();
    for entry in walker
        .into_iter()
        .filter_entry(|e| !(skip_hidden && is_hidden(e)))
    {
        let entry = entry.map_err(|e| BuildError::ReadError(format!("{}: {}", dir.display(), e)))?;
        let is_file = entry.file_type().is_file()
            || (entry.path_is_symlink() && entry.path().is_file());
        if is_file {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}
