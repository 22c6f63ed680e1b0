//! Static site assembler for the Stair Streak web app.
//!
//! Copies pages, deployment config, and assets from a source tree into a
//! deployable output directory with an `assets/{css,js,images}` layout.

pub mod assets;
pub mod builder;
pub mod rewrite;

pub use assets::{AssetKind, CopiedFile};
pub use builder::{BuildConfig, BuildError, BuildResult, StaticBuilder};
pub use rewrite::{default_rewrites, rewrite_file, rewrite_paths, PathRewrite};
