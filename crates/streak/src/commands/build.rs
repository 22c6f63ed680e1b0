//! Static site build command.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use streak_site::{BuildConfig, StaticBuilder};

/// Configuration file structure (streak.toml).
#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    site: SiteConfig,
    #[serde(default)]
    build: BuildSettings,
}

#[derive(Debug, Deserialize)]
struct SiteConfig {
    #[serde(default = "default_source")]
    source: String,
    #[serde(default = "default_output")]
    output: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            output: default_output(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct BuildSettings {
    /// Top-level files to copy, replacing the built-in list
    files: Option<Vec<String>>,
    /// Pages to rewrite, replacing the built-in list
    pages: Option<Vec<String>>,
    js_extension: Option<String>,
    #[serde(default)]
    clean: bool,
}

fn default_source() -> String {
    "src".to_string()
}
fn default_output() -> String {
    "dist".to_string()
}

/// Values given on the command line; these win over the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub source: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub clean: bool,
}

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
fn load_config(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        return Ok(ConfigFile::default());
    }

    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    tracing::info!("Loaded config from {}", path.display());
    Ok(config)
}

fn resolve(file: ConfigFile, overrides: Overrides) -> BuildConfig {
    let defaults = BuildConfig::default();

    BuildConfig {
        source_dir: overrides
            .source
            .unwrap_or_else(|| PathBuf::from(&file.site.source)),
        output_dir: overrides
            .output
            .unwrap_or_else(|| PathBuf::from(&file.site.output)),
        files: file.build.files.unwrap_or(defaults.files),
        pages: file.build.pages.unwrap_or(defaults.pages),
        js_extension: file.build.js_extension.unwrap_or(defaults.js_extension),
        rewrites: defaults.rewrites,
        clean: overrides.clean || file.build.clean,
    }
}

/// Run the build command.
pub async fn run(config_path: &Path, overrides: Overrides) -> Result<()> {
    let file_config = load_config(config_path)?;
    let builder = StaticBuilder::new(resolve(file_config, overrides));

    tracing::debug!("Build config: {:?}", builder.config());

    let result = builder.build()?;

    tracing::info!(
        "Copied {} files ({} css, {} js, {} images) and updated {} pages in {}ms",
        result.total_copied(),
        result.css,
        result.js,
        result.images,
        result.pages_rewritten,
        result.duration_ms
    );

    Ok(())
}
