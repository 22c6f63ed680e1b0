//! Relocation of asset path prefixes inside copied HTML pages.

use std::fs;
use std::path::Path;

use crate::builder::BuildError;

/// A literal find-and-replace applied to page text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRewrite {
    pub from: String,
    pub to: String,
}

impl PathRewrite {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// `css/`, `js/` and `images/` moved under `assets/`, in that order.
pub fn default_rewrites() -> Vec<PathRewrite> {
    ["css/", "js/", "images/"]
        .into_iter()
        .map(|prefix| PathRewrite::new(prefix, format!("assets/{}", prefix)))
        .collect()
}

/// Apply each rewrite to the whole text, one after another.
///
/// Matching is unscoped: every occurrence is replaced, whether it sits in an
/// attribute, a comment, or body text.
pub fn rewrite_paths(content: &str, rewrites: &[PathRewrite]) -> String {
    let mut output = content.to_string();
    for rewrite in rewrites {
        if rewrite.from.is_empty() {
            continue;
        }
        output = output.replace(&rewrite.from, &rewrite.to);
    }
    output
}

/// Rewrite a page in place.
pub fn rewrite_file(path: &Path, rewrites: &[PathRewrite]) -> Result<(), BuildError> {
    let content = fs::read_to_string(path)
        .map_err(|e| BuildError::ReadError(format!("{}: {}", path.display(), e)))?;

    let updated = rewrite_paths(&content, rewrites);

    fs::write(path, updated)
        .map_err(|e| BuildError::WriteError(format!("{}: {}", path.display(), e)))?;

    Ok(())
}
