//! Content errors
//!
//! These never reach page rendering. The repository logs them and reports
//! the post as absent; the variants exist so the log says why.

use std::path::PathBuf;

/// Front-matter block that looked like YAML but did not parse
#[derive(Debug, thiserror::Error)]
#[error("invalid YAML front-matter: {0}")]
pub struct FrontMatterError(#[from] serde_yaml::Error);

/// Why a single post could not be loaded
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path:?}: {source}")]
    FrontMatter {
        path: PathBuf,
        #[source]
        source: FrontMatterError,
    },
}
