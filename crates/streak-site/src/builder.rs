//! Static site builder.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use crate::assets::{self, AssetKind, CopiedFile};
use crate::rewrite::{default_rewrites, rewrite_file, PathRewrite};

/// Pages copied to the output root and rewritten afterwards.
pub const DEFAULT_PAGES: [&str; 4] = ["index.html", "start.html", "stop.html", "leaderboard.html"];

/// Deployment config copied verbatim next to the pages.
pub const DEFAULT_CONFIG_FILES: [&str; 2] = ["netlify.toml", "_redirects"];

/// Configuration for assembling the site.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Source tree root
    pub source_dir: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    /// Files copied from the source root into the output root, if present
    pub files: Vec<String>,

    /// Pages in the output root whose asset paths get rewritten
    pub pages: Vec<String>,

    /// Extension of files picked up from the JavaScript tree
    pub js_extension: String,

    /// Literal substitutions applied to each page, in order
    pub rewrites: Vec<PathRewrite>,

    /// Remove the output directory before building
    pub clean: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("src"),
            output_dir: PathBuf::from("dist"),
            files: DEFAULT_PAGES
                .iter()
                .chain(DEFAULT_CONFIG_FILES.iter())
                .map(|f| f.to_string())
                .collect(),
            pages: DEFAULT_PAGES.iter().map(|p| p.to_string()).collect(),
            js_extension: "js".to_string(),
            rewrites: default_rewrites(),
            clean: false,
        }
    }
}

/// Result of a build operation.
#[derive(Debug, Default)]
pub struct BuildResult {
    /// Top-level pages and config files copied
    pub files: usize,

    /// Stylesheets copied
    pub css: usize,

    /// Scripts copied
    pub js: usize,

    /// Images copied
    pub images: usize,

    /// Pages whose paths were rewritten
    pub pages_rewritten: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

impl BuildResult {
    /// Total number of files written to the output tree.
    pub fn total_copied(&self) -> usize {
        self.files + self.css + self.js + self.images
    }
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to read source: {0}")]
    ReadError(String),

    #[error("Failed to copy {from} -> {to}: {message}")]
    CopyError {
        from: String,
        to: String,
        message: String,
    },

    #[error("Failed to write output: {0}")]
    WriteError(String),
}

/// Assembles the deployable site from the source tree.
pub struct StaticBuilder {
    config: BuildConfig,
}

impl StaticBuilder {
    /// Create a new static builder.
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Build the site.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();
        let output_dir = &self.config.output_dir;

        tracing::info!("Building Stair Streak site...");

        self.prepare_output()?;

        let files = self.copy_top_level_files()?;

        for kind in AssetKind::ALL {
            let dir = kind.dest_dir(output_dir);
            fs::create_dir_all(&dir)
                .map_err(|e| BuildError::WriteError(format!("{}: {}", dir.display(), e)))?;
        }

        let css = self.copy_css()?;
        let js = self.copy_js()?;
        let images = self.copy_images()?;
        let pages_rewritten = self.rewrite_pages()?;

        let result = BuildResult {
            files: files.len(),
            css: css.len(),
            js: js.len(),
            images: images.len(),
            pages_rewritten,
            duration_ms: start.elapsed().as_millis() as u64,
            output_dir: output_dir.clone(),
        };

        tracing::info!("Build complete! Ready for deployment.");
        tracing::info!("Output directory: {}", output_dir.display());
        tracing::info!(
            "To deploy: upload the {}/ folder to Netlify",
            output_dir.display()
        );

        Ok(result)
    }

    /// Create the output root, clearing it first when asked to.
    fn prepare_output(&self) -> Result<(), BuildError> {
        let output_dir = &self.config.output_dir;

        if self.config.clean && output_dir.exists() {
            fs::remove_dir_all(output_dir)
                .map_err(|e| BuildError::WriteError(format!("{}: {}", output_dir.display(), e)))?;
            tracing::info!("Cleaned {}", output_dir.display());
        }

        fs::create_dir_all(output_dir)
            .map_err(|e| BuildError::WriteError(format!("{}: {}", output_dir.display(), e)))
    }

    /// Copy pages and deployment config into the output root.
    fn copy_top_level_files(&self) -> Result<Vec<CopiedFile>, BuildError> {
        let mut copied = Vec::new();

        for file in &self.config.files {
            let source = self.config.source_dir.join(file);
            if !source.is_file() {
                tracing::debug!("Skipping missing file {}", source.display());
                continue;
            }

            let Some(name) = source.file_name() else {
                continue;
            };
            let copy = assets::copy_file(&source, &self.config.output_dir.join(name))?;
            log_copy("Copied", &copy);
            copied.push(copy);
        }

        Ok(copied)
    }

    fn copy_css(&self) -> Result<Vec<CopiedFile>, BuildError> {
        let copied = assets::copy_flattened(
            &self.source_for(AssetKind::Css),
            &AssetKind::Css.dest_dir(&self.config.output_dir),
        )?;
        copied.iter().for_each(|c| log_copy("Copied stylesheet", c));
        Ok(copied)
    }

    fn copy_js(&self) -> Result<Vec<CopiedFile>, BuildError> {
        let copied = assets::copy_tree(
            &self.source_for(AssetKind::Js),
            &AssetKind::Js.dest_dir(&self.config.output_dir),
            &self.config.js_extension,
        )?;
        copied.iter().for_each(|c| log_copy("Copied script", c));
        Ok(copied)
    }

    fn copy_images(&self) -> Result<Vec<CopiedFile>, BuildError> {
        let copied = assets::copy_shallow(
            &self.source_for(AssetKind::Images),
            &AssetKind::Images.dest_dir(&self.config.output_dir),
        )?;
        copied.iter().for_each(|c| log_copy("Copied image", c));
        Ok(copied)
    }

    /// Rewrite asset paths in every configured page present in the output.
    fn rewrite_pages(&self) -> Result<usize, BuildError> {
        let mut count = 0;

        for page in &self.config.pages {
            let path = self.config.output_dir.join(page);
            if !path.is_file() {
                continue;
            }

            rewrite_file(&path, &self.config.rewrites)?;
            tracing::info!("Updated paths in {}", page);
            count += 1;
        }

        Ok(count)
    }

    fn source_for(&self, kind: AssetKind) -> PathBuf {
        self.config.source_dir.join(kind.dir_name())
    }
}

fn log_copy(action: &str, copy: &CopiedFile) {
    tracing::info!(
        "{} {} -> {}",
        action,
        copy.source.display(),
        copy.dest.display()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ASSETS_DIR;
    use pretty_assertions::assert_eq;
    use std::path::Path;
    use tempfile::tempdir;

    fn touch(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    /// Relative paths of every file under `root`, sorted.
    fn tree(root: &Path) -> Vec<String> {
        let mut files: Vec<String> = walkdir::WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                e.path()
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        files.sort();
        files
    }

    fn sample_site(src: &Path) {
        touch(
            &src.join("index.html"),
            r#"<link href="css/style.css"><script src="js/app.js"></script><img src="images/logo.png">"#,
        );
        touch(&src.join("start.html"), r#"<script src="js/modules/start-station.js"></script>"#);
        touch(&src.join("netlify.toml"), "[build]\npublish = \"dist\"\n");
        touch(&src.join("_redirects"), "/*  /index.html  200\n");
        touch(&src.join("css").join("style.css"), "body {}");
        touch(&src.join("css").join("deep").join("nested.css"), ".n {}");
        touch(&src.join("js").join("app.js"), "console.log('app')");
        touch(&src.join("js").join("modules").join("start-station.js"), "// start");
        touch(&src.join("js").join("config").join("README.md"), "not copied");
        touch(&src.join("images").join("logo.png"), "png");
    }

    fn build(src: &Path, out: &Path) -> BuildResult {
        StaticBuilder::new(BuildConfig {
            source_dir: src.to_path_buf(),
            output_dir: out.to_path_buf(),
            ..Default::default()
        })
        .build()
        .unwrap()
    }

    #[test]
    fn default_config_matches_site_layout() {
        let config = BuildConfig::default();
        assert_eq!(config.source_dir, PathBuf::from("src"));
        assert_eq!(config.output_dir, PathBuf::from("dist"));
        assert_eq!(
            config.files,
            vec![
                "index.html",
                "start.html",
                "stop.html",
                "leaderboard.html",
                "netlify.toml",
                "_redirects"
            ]
        );
        assert_eq!(config.pages.len(), 4);
        assert_eq!(config.rewrites, default_rewrites());
        assert!(!config.clean);
    }

    #[test]
    fn builds_simple_site() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("src");
        let out = temp.path().join("dist");
        sample_site(&src);

        let result = build(&src, &out);

        assert_eq!(
            tree(&out),
            vec![
                "_redirects",
                "assets/css/nested.css",
                "assets/css/style.css",
                "assets/images/logo.png",
                "assets/js/app.js",
                "assets/js/modules/start-station.js",
                "index.html",
                "netlify.toml",
                "start.html",
            ]
        );
        assert_eq!(result.files, 4);
        assert_eq!(result.css, 2);
        assert_eq!(result.js, 2);
        assert_eq!(result.images, 1);
        assert_eq!(result.pages_rewritten, 2);
        assert_eq!(result.total_copied(), 9);
        assert_eq!(result.output_dir, out);
    }

    #[test]
    fn rewrites_asset_paths_in_pages() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("src");
        let out = temp.path().join("dist");
        sample_site(&src);

        build(&src, &out);

        assert_eq!(
            fs::read_to_string(out.join("index.html")).unwrap(),
            r#"<link href="assets/css/style.css"><script src="assets/js/app.js"></script><img src="assets/images/logo.png">"#
        );
        assert_eq!(
            fs::read_to_string(out.join("start.html")).unwrap(),
            r#"<script src="assets/js/modules/start-station.js"></script>"#
        );
        // Config files are copied verbatim.
        assert_eq!(
            fs::read_to_string(out.join("netlify.toml")).unwrap(),
            "[build]\npublish = \"dist\"\n"
        );
    }

    #[test]
    fn missing_images_dir_still_creates_assets_images() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("src");
        let out = temp.path().join("dist");
        touch(&src.join("index.html"), "<p>hi</p>");

        let result = build(&src, &out);

        let images = out.join("assets").join("images");
        assert!(images.is_dir());
        assert_eq!(fs::read_dir(&images).unwrap().count(), 0);
        assert!(out.join("assets").join("css").is_dir());
        assert!(out.join("assets").join("js").is_dir());
        assert_eq!(result.images, 0);
    }

    #[test]
    fn empty_source_builds_skeleton() {
        let temp = tempdir().unwrap();
        let out = temp.path().join("dist");

        let result = build(&temp.path().join("missing"), &out);

        assert_eq!(result.total_copied(), 0);
        assert_eq!(result.pages_rewritten, 0);
        assert!(tree(&out).is_empty());
        assert!(out.join(ASSETS_DIR).is_dir());
    }

    #[test]
    fn second_run_is_byte_identical() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("src");
        let out = temp.path().join("dist");
        sample_site(&src);

        build(&src, &out);
        let first: Vec<Vec<u8>> = tree(&out)
            .iter()
            .map(|f| fs::read(out.join(f)).unwrap())
            .collect();

        build(&src, &out);
        let second: Vec<Vec<u8>> = tree(&out)
            .iter()
            .map(|f| fs::read(out.join(f)).unwrap())
            .collect();

        assert_eq!(first, second);
    }

    #[test]
    fn stale_output_persists_without_clean() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("src");
        let out = temp.path().join("dist");
        sample_site(&src);
        touch(&out.join("old.html"), "stale");

        build(&src, &out);

        assert!(out.join("old.html").exists());
    }

    #[test]
    fn clean_removes_stale_output() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("src");
        let out = temp.path().join("dist");
        sample_site(&src);
        touch(&out.join("old.html"), "stale");

        StaticBuilder::new(BuildConfig {
            source_dir: src,
            output_dir: out.clone(),
            clean: true,
            ..Default::default()
        })
        .build()
        .unwrap();

        assert!(!out.join("old.html").exists());
        assert!(out.join("index.html").exists());
    }

    #[test]
    fn custom_page_list_limits_rewriting() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("src");
        let out = temp.path().join("dist");
        sample_site(&src);

        let result = StaticBuilder::new(BuildConfig {
            source_dir: src,
            output_dir: out.clone(),
            pages: vec!["start.html".to_string()],
            ..Default::default()
        })
        .build()
        .unwrap();

        assert_eq!(result.pages_rewritten, 1);
        assert!(fs::read_to_string(out.join("index.html"))
            .unwrap()
            .contains(r#"href="css/style.css""#));
    }
}
