//! Preview server command.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use axum::Router;
use streak_site::builder::DEFAULT_PAGES;
use tower_http::services::ServeDir;

/// Site pages present in a built output directory, in navigation order.
fn built_pages(dir: &Path) -> Vec<&'static str> {
    DEFAULT_PAGES
        .into_iter()
        .filter(|page| dir.join(page).is_file())
        .collect()
}

/// Run the serve command.
pub async fn run(port: u16, dir: PathBuf, open_browser: bool) -> Result<()> {
    if !dir.is_dir() {
        anyhow::bail!(
            "Directory not found: {}. Run 'streak build' first.",
            dir.display()
        );
    }

    let pages = built_pages(&dir);
    if !pages.contains(&"index.html") {
        tracing::warn!(
            "No index.html in {}; the site root will return 404",
            dir.display()
        );
    }

    let addr: SocketAddr = format!("127.0.0.1:{}", port)
        .parse()
        .context("Invalid address")?;
    let url = format!("http://{}", addr);

    tracing::info!("Previewing {} at {}", dir.display(), url);
    for page in &pages {
        tracing::info!("  {}/{}", url, page);
    }

    let app = Router::new().fallback_service(ServeDir::new(&dir));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    if open_browser {
        if let Err(e) = open::that(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn lists_only_built_pages_in_order() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("stop.html"), "").unwrap();
        fs::write(temp.path().join("index.html"), "").unwrap();
        fs::write(temp.path().join("notes.html"), "").unwrap();

        assert_eq!(built_pages(temp.path()), vec!["index.html", "stop.html"]);
    }

    #[test]
    fn empty_directory_has_no_pages() {
        let temp = tempdir().unwrap();
        assert!(built_pages(temp.path()).is_empty());
    }
}
